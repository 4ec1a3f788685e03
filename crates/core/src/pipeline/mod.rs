pub mod game_session;
pub mod gesture_pipeline;
