//! Error types and handling for the `Clima` forecast service

use thiserror::Error;

/// Main error type for the `Clima` service
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClimaError {
    /// Transport-level failures talking to the upstream feed
    #[error("Network error: {message}")]
    Network { message: String },

    /// Upstream payload is missing fields or is internally inconsistent
    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    /// Configuration-related errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// Lookup of a location id that is not in the registry
    #[error("Unknown location: {id}")]
    UnknownLocation { id: String },

    /// A full refresh could not produce a complete snapshot
    #[error("Refresh failed for {}", .failed.join(", "))]
    Refresh { failed: Vec<String> },
}

impl ClimaError {
    /// Create a new network error
    pub fn network<S: Into<String>>(message: S) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create a new malformed response error
    pub fn malformed<S: Into<String>>(message: S) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config {
            message: message.into(),
        }
    }

    /// Create a new unknown location error
    pub fn unknown_location<S: Into<String>>(id: S) -> Self {
        Self::UnknownLocation { id: id.into() }
    }

    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    #[must_use]
    pub fn is_malformed(&self) -> bool {
        matches!(self, Self::MalformedResponse { .. })
    }

    /// Get a user-friendly error message
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            ClimaError::Network { .. } => {
                "Unable to reach the forecast service. Please check your internet connection."
                    .to_string()
            }
            ClimaError::MalformedResponse { .. } => {
                "The forecast service returned incomplete data.".to_string()
            }
            ClimaError::Config { message } => format!("Configuration error: {message}"),
            ClimaError::UnknownLocation { id } => format!("Unknown location '{id}'"),
            ClimaError::Refresh { .. } => "Forecast unavailable. Try again later.".to_string(),
        }
    }
}

impl From<reqwest_middleware::Error> for ClimaError {
    fn from(err: reqwest_middleware::Error) -> Self {
        Self::network(err.to_string())
    }
}

impl From<reqwest::Error> for ClimaError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            Self::malformed(err.to_string())
        } else {
            Self::network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ClimaError {
    fn from(err: serde_json::Error) -> Self {
        Self::malformed(err.to_string())
    }
}
