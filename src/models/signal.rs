use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable short code identifying a signal along the route (e.g. "S1").
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SignalId(pub String);

impl SignalId {
    pub fn new(id: impl Into<String>) -> Self {
        SignalId(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SignalId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Signals only ever show red or a preempted green.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SignalState {
    Red,
    Green,
}

impl fmt::Display for SignalState {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            SignalState::Red => write!(f, "RED"),
            SignalState::Green => write!(f, "GREEN"),
        }
    }
}

/// A traffic signal on the ambulance route.
///
/// Position and identity are fixed once the route is built; only `state` changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub id: SignalId,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub state: SignalState,
}

impl Signal {
    /// Every signal starts out red.
    pub fn new(id: impl Into<String>, name: impl Into<String>, lat: f64, lng: f64) -> Self {
        Self {
            id: SignalId::new(id),
            name: name.into(),
            lat,
            lng,
            state: SignalState::Red,
        }
    }

    pub fn is_green(&self) -> bool {
        self.state == SignalState::Green
    }
}
