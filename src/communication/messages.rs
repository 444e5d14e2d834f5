use crate::error::PreemptionError;
use crate::models::signal::{Signal, SignalId};
use serde::{Deserialize, Serialize};

/// One GPS fix from the ambulance. `speed` is carried on the wire but not used for the ETA.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionSample {
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f64>,
}

impl PositionSample {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            speed: None,
        }
    }

    pub fn with_speed(lat: f64, lng: f64, speed: f64) -> Self {
        Self {
            lat,
            lng,
            speed: Some(speed),
        }
    }
}

/// Hospital selection, relayed to subscribers exactly as received.
///
/// Normally `{ "hospital": ..., "hospitalName": ... }`, but no shape is enforced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DestinationPayload(pub serde_json::Value);

impl DestinationPayload {
    pub fn new(hospital: &str, hospital_name: &str) -> Self {
        DestinationPayload(serde_json::json!({
            "hospital": hospital,
            "hospitalName": hospital_name,
        }))
    }

    pub fn hospital_name(&self) -> Option<&str> {
        self.0.get("hospitalName").and_then(|v| v.as_str())
    }
}

/// Summary of the signal closest to the latest sample.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NearestSignal {
    pub id: SignalId,
    pub distance_meters: u64,
    pub eta_seconds: u64,
}

/// Events the ambulance side sends in.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum InboundMessage {
    #[serde(rename = "ambulance_location")]
    AmbulanceLocation(PositionSample),
    #[serde(rename = "hospital_destination")]
    HospitalDestination(DestinationPayload),
    ResetRoute,
}

#[derive(Deserialize)]
struct InboundEnvelope {
    event: String,
    #[serde(default)]
    data: serde_json::Value,
}

impl InboundMessage {
    /// Decodes `{ "event": ..., "data": ... }`.
    ///
    /// A location whose coordinates are missing or not numbers is an `InvalidSample`;
    /// anything that is not a known event is a `MalformedMessage`.
    pub fn from_json(bytes: &[u8]) -> Result<Self, PreemptionError> {
        let envelope: InboundEnvelope = serde_json::from_slice(bytes)
            .map_err(|e| PreemptionError::MalformedMessage(e.to_string()))?;

        match envelope.event.as_str() {
            "ambulance_location" => {
                let sample: PositionSample = serde_json::from_value(envelope.data)
                    .map_err(|e| PreemptionError::InvalidSample(e.to_string()))?;
                Ok(InboundMessage::AmbulanceLocation(sample))
            }
            "hospital_destination" => Ok(InboundMessage::HospitalDestination(
                DestinationPayload(envelope.data),
            )),
            "reset_route" => Ok(InboundMessage::ResetRoute),
            other => Err(PreemptionError::MalformedMessage(format!(
                "unknown event '{}'",
                other
            ))),
        }
    }

    pub fn to_json(&self) -> Result<String, PreemptionError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Events broadcast to every subscriber after each inbound event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum OutboundMessage {
    NearestSignal(NearestSignal),
    SignalUpdate(Vec<Signal>),
    DestinationUpdate(DestinationPayload),
}

impl OutboundMessage {
    pub fn event_name(&self) -> &'static str {
        match self {
            OutboundMessage::NearestSignal(_) => "nearest_signal",
            OutboundMessage::SignalUpdate(_) => "signal_update",
            OutboundMessage::DestinationUpdate(_) => "destination_update",
        }
    }

    pub fn to_json(&self) -> Result<String, PreemptionError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(bytes: &[u8]) -> Result<Self, PreemptionError> {
        serde_json::from_slice(bytes).map_err(|e| PreemptionError::MalformedMessage(e.to_string()))
    }
}
