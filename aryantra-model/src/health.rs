#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Body returned by the relay liveness probe.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HealthStatus {
    pub status: String,
    pub message: String,
}

impl HealthStatus {
    pub const OK: &'static str = "OK";
    pub const RELAY_RUNNING: &'static str = "Proxy server is running";

    /// The canonical healthy response.
    pub fn relay_running() -> Self {
        Self {
            status: Self::OK.to_string(),
            message: Self::RELAY_RUNNING.to_string(),
        }
    }
}

/// Flat error body the relay answers with when it cannot reach upstream.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RelayErrorBody {
    pub error: String,
}

impl RelayErrorBody {
    pub const GENERIC: &'static str = "Failed to process request";

    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }

    pub fn generic() -> Self {
        Self::new(Self::GENERIC)
    }
}
