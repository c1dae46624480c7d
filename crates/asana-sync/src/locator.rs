//! Finds the Asana task correlated with a GitHub issue.
//!
//! There is no index to query: the project's tasks are listed and each one is
//! fetched in full until one whose notes carry the issue's correlation text is
//! found. Every lookup is a fresh scan.

use regex::Regex;
use reqwest::Method;
use std::sync::LazyLock;
use tracing::{debug, info, instrument};

use crate::client::{decode, AsanaApi};
use crate::config::Config;
use crate::error::ApiError;
use crate::models::{CorrelationMarker, Task, TaskRef};

/// Scans a project for the task belonging to an issue.
pub struct TaskLocator<'a> {
    api: &'a dyn AsanaApi,
    config: &'a Config,
}

impl<'a> TaskLocator<'a> {
    #[must_use]
    pub fn new(api: &'a dyn AsanaApi, config: &'a Config) -> Self {
        Self { api, config }
    }

    /// Find the task for `issue_number` in the configured project.
    ///
    /// Tasks are tested in the order the project listing returns them and the
    /// first match wins; later tasks are not fetched. `Ok(None)` means no task
    /// in the project carries the issue's correlation text.
    #[instrument(skip(self), fields(project_id = %self.config.project_id))]
    pub async fn find_task_by_issue(&self, issue_number: u64) -> Result<Option<Task>, ApiError> {
        let marker = CorrelationMarker::new(&self.config.repository_name, issue_number);
        let matcher = NotesMatcher::new(&marker);

        let listing = self
            .api
            .request(
                Method::GET,
                &format!("/projects/{}/tasks", self.config.project_id),
                None,
            )
            .await?;
        let tasks: Vec<TaskRef> = decode(listing, "project task listing")?;

        debug!(task_count = tasks.len(), "Scanning project tasks");

        for task_ref in tasks {
            let detail = self
                .api
                .request(Method::GET, &format!("/tasks/{}", task_ref.gid), None)
                .await?;
            let task: Task = decode(detail, "task detail")?;

            if task.notes.as_deref().is_some_and(|notes| matcher.matches(notes)) {
                info!(task_id = %task.gid, marker = %marker, "Found correlated task");
                return Ok(Some(task));
            }
        }

        debug!(marker = %marker, "No correlated task in project");
        Ok(None)
    }
}

/// Issue URL at the very end of the notes; captures the issue number.
static ISSUE_URL_TAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/issues/(\d+)$").expect("issue URL pattern is valid"));

/// Decides whether a task's notes belong to a given issue.
struct NotesMatcher {
    repository_line: String,
    issue_number: String,
}

impl NotesMatcher {
    fn new(marker: &CorrelationMarker) -> Self {
        Self {
            repository_line: marker.repository_line(),
            issue_number: marker.issue_number().to_string(),
        }
    }

    /// The repository line must match a whole line of the notes, so `api`
    /// never claims a task written for `api-gateway`.
    fn matches(&self, notes: &str) -> bool {
        notes.lines().any(|line| line == self.repository_line)
            && ISSUE_URL_TAIL
                .captures(notes)
                .and_then(|caps| caps.get(1))
                .is_some_and(|number| number.as_str() == self.issue_number)
    }
}
