// src/shared_data.rs

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// One "nearest_signal" event as written to CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearestSignalRecord {
    pub timestamp: u64,
    pub id: String,
    pub distance_meters: u64,
    pub eta_seconds: u64,
}

/// One signal out of a "signal_update" event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalStateRecord {
    pub timestamp: u64,
    pub id: String,
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub state: String,
}

/// A relayed destination. The whole payload is kept as JSON since its shape is not enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DestinationRecord {
    pub timestamp: u64,
    pub hospital_name: String,
    pub payload: String,
}

pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
