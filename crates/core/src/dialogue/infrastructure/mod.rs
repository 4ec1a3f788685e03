pub mod simulated_player;
