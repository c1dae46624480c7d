//! GitHub and Asana entity type definitions.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

// =========================================================================
// GitHub (read-only, from the webhook payload)
// =========================================================================

/// GitHub issue as delivered in `issues` / `issue_comment` payloads
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Issue {
    /// Issue number, unique per repository
    pub number: u64,
    /// Issue title
    pub title: String,
    /// Issue body (markdown)
    #[serde(default)]
    pub body: Option<String>,
    /// URL of the issue page
    pub html_url: String,
    /// Lifecycle state
    #[serde(default)]
    pub state: Option<IssueState>,
    /// Present when the "issue" is actually a pull request
    #[serde(default)]
    pub pull_request: Option<Value>,
}

impl Issue {
    /// Whether this issue object describes a pull request.
    #[must_use]
    pub fn is_pull_request(&self) -> bool {
        self.pull_request.is_some()
    }
}

/// GitHub issue lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    Open,
    Closed,
}

/// GitHub issue comment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Comment {
    /// Comment body (markdown)
    #[serde(default)]
    pub body: Option<String>,
    /// Comment author
    pub user: GitHubUser,
}

/// GitHub user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitHubUser {
    /// User login
    pub login: String,
}

// =========================================================================
// Asana
// =========================================================================

/// Compact task record as returned by `GET /projects/{id}/tasks`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRef {
    /// Global ID
    pub gid: String,
    /// Task name
    #[serde(default)]
    pub name: Option<String>,
}

/// Full task record as returned by `GET /tasks/{id}` and `POST /tasks`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Global ID
    pub gid: String,
    /// Task name
    #[serde(default)]
    pub name: Option<String>,
    /// Free-text notes, carrying the correlation text
    #[serde(default)]
    pub notes: Option<String>,
    /// Completion flag
    #[serde(default)]
    pub completed: bool,
}

/// Project section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Section {
    /// Global ID
    pub gid: String,
    /// Section name
    pub name: String,
}

/// External reference attached to a task at creation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ExternalRef {
    /// Correlation marker
    pub gid: String,
    /// Issue URL
    pub data: String,
}

// =========================================================================
// Correlation
// =========================================================================

/// Deterministic key tying an Asana task to one `(repository, issue)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CorrelationMarker {
    repository: String,
    issue_number: u64,
}

impl CorrelationMarker {
    #[must_use]
    pub fn new(repository: impl Into<String>, issue_number: u64) -> Self {
        Self {
            repository: repository.into(),
            issue_number,
        }
    }

    #[must_use]
    pub fn issue_number(&self) -> u64 {
        self.issue_number
    }

    /// Substring every correlated task's notes contain.
    #[must_use]
    pub fn repository_line(&self) -> String {
        format!("Repository: {}", self.repository)
    }
}

impl fmt::Display for CorrelationMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "github_issue_{}_{}", self.repository, self.issue_number)
    }
}

/// Task name for an issue: `[repo] title`.
#[must_use]
pub fn task_name(repository: &str, issue: &Issue) -> String {
    format!("[{repository}] {}", issue.title)
}

/// Task notes for an issue.
///
/// The issue URL is always the last line so the locator can anchor on it.
#[must_use]
pub fn task_notes(repository: &str, issue: &Issue) -> String {
    format!(
        "Repository: {repository}\nIssue #{}\n\n{}\n\nGitHub Issue: {}",
        issue.number,
        issue.body.as_deref().unwrap_or(""),
        issue.html_url
    )
}

/// Story text mirrored from a GitHub comment.
#[must_use]
pub fn comment_text(repository: &str, comment: &Comment) -> String {
    format!(
        "[{repository}] GitHub comment by {}:\n{}",
        comment.user.login,
        comment.body.as_deref().unwrap_or("")
    )
}
