use serde::Serialize;

/// The discrete outcome of one processed frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GestureEvent {
    None,
    /// Nod.
    Yes,
    /// Shake.
    No,
    /// Nod and shake crossed the threshold together; the signal is discarded.
    Ambiguous,
}

impl GestureEvent {
    /// Classifies a pair of axis readings.
    pub fn from_axes(shaking: bool, nodding: bool) -> Self {
        match (shaking, nodding) {
            (true, true) => GestureEvent::Ambiguous,
            (true, false) => GestureEvent::No,
            (false, true) => GestureEvent::Yes,
            (false, false) => GestureEvent::None,
        }
    }
}

impl std::fmt::Display for GestureEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GestureEvent::None => write!(f, "none"),
            GestureEvent::Yes => write!(f, "yes"),
            GestureEvent::No => write!(f, "no"),
            GestureEvent::Ambiguous => write!(f, "ambiguous"),
        }
    }
}
