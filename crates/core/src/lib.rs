pub mod dialogue;
pub mod gesture;
pub mod pipeline;
pub mod shared;
