//! GitHub issue to Asana task synchronisation.
//!
//! This crate provides:
//! - A thin REST client for the Asana API behind the [`AsanaApi`] seam
//! - Task lookup by issue, using a correlation marker embedded in task notes
//! - Task creation, completion, commenting and section placement
//! - Routing of `issues` / `issue_comment` webhook events onto those calls
//!
//! Every run is stateless: the Asana project is the only durable store, and
//! the task for an issue is re-derived by scanning the project on each event.

#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)] // Every API-facing method can fail

pub mod client;
pub mod config;
pub mod error;
pub mod event;
pub mod locator;
pub mod models;
pub mod router;
pub mod telemetry;
pub mod writer;

#[cfg(test)]
pub(crate) mod fake;

pub use client::{AsanaApi, AsanaClient};
pub use config::Config;
pub use error::{ApiError, SyncError};
pub use event::WebhookEvent;
pub use locator::TaskLocator;
pub use models::{CorrelationMarker, Issue, Task};
pub use router::{EventRouter, SkipReason, SyncOutcome};
pub use writer::TaskWriter;
