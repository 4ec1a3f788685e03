pub mod audio_player;
pub mod cue;
pub mod dialogue_tree;
pub mod script;
