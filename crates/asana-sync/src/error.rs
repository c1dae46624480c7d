//! Error types for the sync run.

use thiserror::Error;

/// Failure of a single Asana API call.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Asana answered with a non-2xx status
    #[error("Asana API returned error status {status}: {body}")]
    Status { status: u16, body: String },

    /// Asana answered 2xx but the body was not a `{ "data": ... }` JSON envelope
    #[error("Failed to parse Asana API response (status {status}): {body}")]
    Parse { status: u16, body: String },

    /// The request never got a response (DNS, connection reset, timeout)
    #[error("Failed to send request to Asana API: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ApiError {
    /// HTTP status of the failed call, if a response was received.
    #[must_use]
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } | Self::Parse { status, .. } => Some(*status),
            Self::Transport(_) => None,
        }
    }

    /// Raw response body of the failed call, if a response was received.
    #[must_use]
    pub fn raw_body(&self) -> Option<&str> {
        match self {
            Self::Status { body, .. } | Self::Parse { body, .. } => Some(body),
            Self::Transport(_) => None,
        }
    }

    /// Whether the failure happened below HTTP.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport(_))
    }
}

/// Everything that can end a sync run.
#[derive(Debug, Error)]
pub enum SyncError {
    /// Required settings are absent or invalid
    #[error("Missing or invalid configuration: {}", missing.join(", "))]
    Config { missing: Vec<String> },

    /// The inbound event is missing a required field
    #[error("Invalid event payload: {0}")]
    Validation(String),

    /// The event file could not be read or parsed
    #[error("Failed to load event payload: {0}")]
    EventSource(String),

    /// An Asana call failed
    #[error(transparent)]
    Api(#[from] ApiError),

    /// The configured section does not exist in the project
    #[error("Section not found in project: {0}")]
    SectionNotFound(String),
}

impl SyncError {
    /// Process exit code for this failure.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Config { .. }
            | Self::Validation(_)
            | Self::EventSource(_)
            | Self::Api(_)
            | Self::SectionNotFound(_) => 1,
        }
    }
}
