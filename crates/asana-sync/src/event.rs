//! Inbound webhook event, as handed over by the GitHub Actions runner.

use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::error::SyncError;
use crate::models::{Comment, Issue};

/// One webhook delivery: event name, action, and the fields we act on.
#[derive(Debug, Clone)]
pub struct WebhookEvent {
    /// `X-GitHub-Event` name (`issues`, `issue_comment`, ...)
    pub event_type: String,
    /// Action within the event (`opened`, `closed`, ...)
    pub action: Option<String>,
    /// Payload fields relevant to the sync
    pub payload: EventPayload,
}

/// Fields of the webhook payload the router reads.
#[derive(Debug, Clone, Default)]
pub struct EventPayload {
    /// The issue the event is about
    pub issue: Option<Issue>,
    /// The comment, for `issue_comment` events
    pub comment: Option<Comment>,
}

/// Loosely typed view of the payload; `issue` / `comment` are decoded
/// separately so a malformed object is reported as a validation error.
#[derive(Debug, Default, Deserialize)]
struct RawPayload {
    #[serde(default)]
    action: Option<String>,
    #[serde(default)]
    issue: Option<Value>,
    #[serde(default)]
    comment: Option<Value>,
}

impl WebhookEvent {
    /// Build an event from an event name and a raw JSON payload.
    pub fn from_json(event_type: impl Into<String>, payload: Value) -> Result<Self, SyncError> {
        let raw: RawPayload = if payload.is_null() {
            RawPayload::default()
        } else {
            serde_json::from_value(payload)
                .map_err(|e| SyncError::Validation(format!("payload is not an object: {e}")))?
        };

        let issue = decode_field::<Issue>(raw.issue, "issue")?;
        let comment = decode_field::<Comment>(raw.comment, "comment")?;

        Ok(Self {
            event_type: event_type.into(),
            action: raw.action.filter(|a| !a.is_empty()),
            payload: EventPayload { issue, comment },
        })
    }

    /// Load the event the runner describes via `GITHUB_EVENT_NAME` and
    /// `GITHUB_EVENT_PATH`.
    ///
    /// A missing path or file yields an empty payload; an unreadable or
    /// non-JSON file is an error.
    pub fn load(event_type: &str, event_path: Option<&Path>) -> Result<Self, SyncError> {
        let payload = match event_path {
            Some(path) if path.exists() => {
                let contents = std::fs::read_to_string(path).map_err(|e| {
                    SyncError::EventSource(format!("failed to read {}: {e}", path.display()))
                })?;
                let value: Value = serde_json::from_str(&contents).map_err(|e| {
                    SyncError::EventSource(format!("failed to parse {}: {e}", path.display()))
                })?;
                info!(path = %path.display(), "Loaded event payload");
                value
            }
            Some(path) => {
                warn!(path = %path.display(), "Event payload file does not exist");
                Value::Null
            }
            None => {
                warn!("No event payload path provided");
                Value::Null
            }
        };

        debug!(event_type = %event_type, payload = %payload, "Event payload");
        Self::from_json(event_type, payload)
    }
}

fn decode_field<T: serde::de::DeserializeOwned>(
    value: Option<Value>,
    field: &str,
) -> Result<Option<T>, SyncError> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| SyncError::Validation(format!("malformed `{field}` object: {e}"))),
    }
}
