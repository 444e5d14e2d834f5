use thiserror::Error;

#[derive(Debug, Error)]
pub enum PreemptionError {
    /// Non-finite or missing coordinates on a position sample. State is left untouched.
    #[error("invalid position sample: {0}")]
    InvalidSample(String),
    #[error("unknown signal id: {0}")]
    UnknownSignal(String),
    #[error("malformed inbound message: {0}")]
    MalformedMessage(String),
    #[error("failed to encode outbound event: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to publish outbound event: {0}")]
    Publish(#[from] amiquip::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("could not parse config file: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
