//! Maps a webhook event onto locator / writer calls.
//!
//! | event           | action   | effect                                        |
//! |-----------------|----------|-----------------------------------------------|
//! | `issues`        | opened   | create task, place it in the configured section |
//! | `issues`        | closed   | locate task, mark completed                   |
//! | `issues`        | reopened | locate task, mark pending                     |
//! | `issue_comment` | created  | locate task, add the comment (issues only)    |
//!
//! Anything else is skipped. Required payload fields are validated before any
//! Asana call is made.

use tracing::{error, info, warn};

use crate::client::AsanaApi;
use crate::config::Config;
use crate::error::SyncError;
use crate::event::WebhookEvent;
use crate::locator::TaskLocator;
use crate::models::{self, Comment, Issue};
use crate::writer::TaskWriter;

const EVENT_ISSUES: &str = "issues";
const EVENT_ISSUE_COMMENT: &str = "issue_comment";

/// What a run did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncOutcome {
    /// A task was created; `placed` is false when the section could not be found.
    Created { task_id: String, placed: bool },
    /// The issue's task was marked completed.
    Completed { task_id: String },
    /// The issue's task was marked pending again.
    Reopened { task_id: String },
    /// A comment was mirrored onto the issue's task.
    Commented { task_id: String },
    /// The event needed an existing task and there was none.
    TaskNotFound { issue_number: u64 },
    /// Nothing to do for this event.
    Skipped(SkipReason),
}

/// Why an event was ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SkipReason {
    /// Event type other than `issues` / `issue_comment`
    UnhandledEvent(String),
    /// Known event type, action we do not act on
    UnhandledAction { event_type: String, action: Option<String> },
    /// Comment on a pull request
    PullRequestComment { number: u64 },
}

/// Dispatches events to the locator and writer.
pub struct EventRouter<'a> {
    config: &'a Config,
    locator: TaskLocator<'a>,
    writer: TaskWriter<'a>,
}

impl<'a> EventRouter<'a> {
    #[must_use]
    pub fn new(api: &'a dyn AsanaApi, config: &'a Config) -> Self {
        Self {
            config,
            locator: TaskLocator::new(api, config),
            writer: TaskWriter::new(api, config),
        }
    }

    /// Process one event.
    ///
    /// # Errors
    /// `SyncError::Validation` when a required field is missing (no Asana call
    /// is made), `SyncError::Api` when any Asana call fails.
    pub async fn route(&self, event: &WebhookEvent) -> Result<SyncOutcome, SyncError> {
        info!(event_type = %event.event_type, action = ?event.action, "Routing GitHub event");

        match event.event_type.as_str() {
            EVENT_ISSUES => self.route_issue_event(event).await,
            EVENT_ISSUE_COMMENT => self.route_comment_event(event).await,
            other => {
                warn!(
                    event_type = %other,
                    supported = "issues, issue_comment",
                    "Unhandled event type"
                );
                Ok(SyncOutcome::Skipped(SkipReason::UnhandledEvent(other.to_string())))
            }
        }
    }

    async fn route_issue_event(&self, event: &WebhookEvent) -> Result<SyncOutcome, SyncError> {
        let issue = require_issue(event)?;
        let action = event.action.as_deref().ok_or_else(|| {
            SyncError::Validation(format!("`{EVENT_ISSUES}` event without `action`"))
        })?;

        info!(issue_number = issue.number, title = %issue.title, action = %action, "Issue event");

        match action {
            "opened" => self.handle_opened(issue).await,
            "closed" => self.handle_completion(issue, true).await,
            "reopened" => self.handle_completion(issue, false).await,
            _ => Ok(skip_action(event)),
        }
    }

    async fn route_comment_event(&self, event: &WebhookEvent) -> Result<SyncOutcome, SyncError> {
        let issue = require_issue(event)?;
        let comment = event.payload.comment.as_ref().ok_or_else(|| {
            SyncError::Validation(format!("`{EVENT_ISSUE_COMMENT}` event without `comment`"))
        })?;

        if issue.is_pull_request() {
            info!(number = issue.number, "Skipping pull request comment");
            return Ok(SyncOutcome::Skipped(SkipReason::PullRequestComment {
                number: issue.number,
            }));
        }

        if event.action.as_deref() != Some("created") {
            return Ok(skip_action(event));
        }

        info!(issue_number = issue.number, author = %comment.user.login, "New issue comment");
        self.handle_comment(issue, comment).await
    }

    async fn handle_opened(&self, issue: &Issue) -> Result<SyncOutcome, SyncError> {
        let task = self.writer.create_task(issue).await?;

        let section = &self.config.section_name;
        info!(task_id = %task.gid, section = %section, "Placing task in section");

        let placed = match self.writer.move_to_section(&task.gid, section).await {
            Ok(()) => true,
            Err(SyncError::SectionNotFound(name)) => {
                error!(
                    task_id = %task.gid,
                    section = %name,
                    "Section not found; task left unplaced"
                );
                false
            }
            Err(e) => return Err(e),
        };

        Ok(SyncOutcome::Created {
            task_id: task.gid,
            placed,
        })
    }

    async fn handle_completion(
        &self,
        issue: &Issue,
        completed: bool,
    ) -> Result<SyncOutcome, SyncError> {
        let Some(task) = self.locator.find_task_by_issue(issue.number).await? else {
            return Ok(not_found(issue));
        };

        self.writer.set_completion(&task.gid, completed).await?;

        Ok(if completed {
            SyncOutcome::Completed { task_id: task.gid }
        } else {
            SyncOutcome::Reopened { task_id: task.gid }
        })
    }

    async fn handle_comment(
        &self,
        issue: &Issue,
        comment: &Comment,
    ) -> Result<SyncOutcome, SyncError> {
        let Some(task) = self.locator.find_task_by_issue(issue.number).await? else {
            return Ok(not_found(issue));
        };

        let text = models::comment_text(&self.config.repository_name, comment);
        self.writer.add_comment(&task.gid, &text).await?;

        Ok(SyncOutcome::Commented { task_id: task.gid })
    }
}

fn require_issue(event: &WebhookEvent) -> Result<&Issue, SyncError> {
    event.payload.issue.as_ref().ok_or_else(|| {
        SyncError::Validation(format!("`{}` event without `issue`", event.event_type))
    })
}

fn skip_action(event: &WebhookEvent) -> SyncOutcome {
    info!(event_type = %event.event_type, action = ?event.action, "Unhandled action");
    SyncOutcome::Skipped(SkipReason::UnhandledAction {
        event_type: event.event_type.clone(),
        action: event.action.clone(),
    })
}

fn not_found(issue: &Issue) -> SyncOutcome {
    info!(issue_number = issue.number, "No Asana task for issue; nothing to update");
    SyncOutcome::TaskNotFound {
        issue_number: issue.number,
    }
}
