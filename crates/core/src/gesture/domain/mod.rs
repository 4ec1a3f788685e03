pub mod axis_oscillation_counter;
pub mod face_detector;
pub mod feature_selector;
pub mod feature_tracker;
pub mod gesture_event;
pub mod track_state;
