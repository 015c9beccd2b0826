//! Error handling for the RF ring gateway

use thiserror::Error;

/// RF ring gateway error type
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RfRingError {
    /// Rack number outside 1..=4
    #[error("Unknown rack: {0}")]
    UnknownRack(u8),

    /// No PV registered for the (rack, slot, reading) coordinate
    #[error("Unknown PV: rack {rack}, slot {slot}, reading {reading}")]
    UnknownPv { rack: u8, slot: u8, reading: u8 },

    /// Semantic key not present in the alarm/offset dictionaries
    #[error("Unknown parameter key: {0}")]
    UnknownParameter(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type alias for the RF ring gateway
pub type Result<T> = std::result::Result<T, RfRingError>;

impl RfRingError {
    pub fn config(msg: impl Into<String>) -> Self {
        RfRingError::ConfigError(msg.into())
    }
}

impl From<figment::Error> for RfRingError {
    fn from(err: figment::Error) -> Self {
        RfRingError::ConfigError(err.to_string())
    }
}
