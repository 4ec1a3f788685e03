pub mod constants;
pub mod frame;
pub mod gesture_config;
pub mod point;
pub mod region;
