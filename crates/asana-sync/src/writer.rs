//! Task mutations: create, complete/reopen, comment, and section placement.

use reqwest::Method;
use serde_json::json;
use tracing::{debug, info, instrument};

use crate::client::{decode, AsanaApi};
use crate::config::Config;
use crate::error::{ApiError, SyncError};
use crate::models::{self, CorrelationMarker, ExternalRef, Issue, Section, Task};

/// Writes issue state into Asana.
pub struct TaskWriter<'a> {
    api: &'a dyn AsanaApi,
    config: &'a Config,
}

impl<'a> TaskWriter<'a> {
    #[must_use]
    pub fn new(api: &'a dyn AsanaApi, config: &'a Config) -> Self {
        Self { api, config }
    }

    /// Create the task for a newly opened issue.
    ///
    /// The notes carry the human-readable correlation text the locator scans
    /// for; the marker is also attached as the task's `external.gid`.
    #[instrument(skip(self, issue), fields(issue_number = issue.number))]
    pub async fn create_task(&self, issue: &Issue) -> Result<Task, ApiError> {
        let repository = &self.config.repository_name;
        let external = ExternalRef {
            gid: CorrelationMarker::new(repository, issue.number).to_string(),
            data: issue.html_url.clone(),
        };

        let body = json!({
            "data": {
                "name": models::task_name(repository, issue),
                "notes": models::task_notes(repository, issue),
                "projects": [self.config.project_id],
                "workspace": self.config.workspace_id,
                "external": &external,
            }
        });

        let created = self.api.request(Method::POST, "/tasks", Some(body)).await?;
        let task: Task = decode(created, "created task")?;

        info!(task_id = %task.gid, marker = %external.gid, "Created Asana task");
        Ok(task)
    }

    /// Mark a task completed or pending.
    ///
    /// Writing the value the task already has is harmless.
    #[instrument(skip(self))]
    pub async fn set_completion(&self, task_id: &str, completed: bool) -> Result<(), ApiError> {
        self.api
            .request(
                Method::PUT,
                &format!("/tasks/{task_id}"),
                Some(json!({ "data": { "completed": completed } })),
            )
            .await?;

        info!(task_id = %task_id, completed, "Updated Asana task completion");
        Ok(())
    }

    /// Append a comment story. Not idempotent: every call adds a story.
    #[instrument(skip(self, text))]
    pub async fn add_comment(&self, task_id: &str, text: &str) -> Result<(), ApiError> {
        self.api
            .request(
                Method::POST,
                &format!("/tasks/{task_id}/stories"),
                Some(json!({ "data": { "text": text, "type": "comment" } })),
            )
            .await?;

        info!(task_id = %task_id, "Added comment to Asana task");
        Ok(())
    }

    /// Move a task into the project section named exactly `section_name`.
    ///
    /// # Errors
    /// `SyncError::SectionNotFound` when no section has that exact name,
    /// `SyncError::Api` when a call fails.
    #[instrument(skip(self))]
    pub async fn move_to_section(
        &self,
        task_id: &str,
        section_name: &str,
    ) -> Result<(), SyncError> {
        let section_id = self
            .find_section_id(section_name)
            .await?
            .ok_or_else(|| SyncError::SectionNotFound(section_name.to_string()))?;

        self.api
            .request(
                Method::POST,
                &format!("/sections/{section_id}/addTask"),
                Some(json!({ "data": { "task": task_id } })),
            )
            .await?;

        info!(task_id = %task_id, section_id = %section_id, "Moved task to section");
        Ok(())
    }

    /// Resolve a section name to its gid by exact match.
    pub async fn find_section_id(&self, section_name: &str) -> Result<Option<String>, ApiError> {
        let listing = self
            .api
            .request(
                Method::GET,
                &format!("/projects/{}/sections", self.config.project_id),
                None,
            )
            .await?;
        let sections: Vec<Section> = decode(listing, "project section listing")?;

        debug!(section_count = sections.len(), "Fetched project sections");

        Ok(sections
            .into_iter()
            .find(|s| s.name == section_name)
            .map(|s| s.gid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fake::FakeAsana;

    fn config() -> Config {
        Config::from_lookup(|key| {
            match key {
                "ASANA_PAT" => Some("pat"),
                "ASANA_WORKSPACE_ID" => Some("ws-1"),
                "ASANA_PROJECT_ID" => Some("proj-1"),
                "ASANA_SECTION" => Some("Backlog"),
                "GITHUB_REPOSITORY" => Some("org/repo"),
                _ => None,
            }
            .map(str::to_string)
        })
        .unwrap()
    }

    fn issue() -> Issue {
        serde_json::from_value(json!({
            "number": 42,
            "title": "Bug X",
            "body": "desc",
            "html_url": "https://github.com/org/repo/issues/42"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_create_task_embeds_correlation() {
        let config = config();
        let api = FakeAsana::new();

        let task = TaskWriter::new(&api, &config).create_task(&issue()).await.unwrap();

        let stored = api.tasks();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].gid, task.gid);
        assert_eq!(stored[0].name, "[repo] Bug X");
        assert!(stored[0].notes.contains("Repository: repo"));
        assert!(stored[0].notes.contains("Issue #42"));
        assert_eq!(stored[0].external_gid.as_deref(), Some("github_issue_repo_42"));
    }

    #[tokio::test]
    async fn test_set_completion_twice_is_stable() {
        let config = config();
        let api = FakeAsana::new().with_task("t1", "notes");
        let writer = TaskWriter::new(&api, &config);

        writer.set_completion("t1", true).await.unwrap();
        writer.set_completion("t1", true).await.unwrap();
        assert!(api.tasks()[0].completed);

        writer.set_completion("t1", false).await.unwrap();
        assert!(!api.tasks()[0].completed);
    }

    #[tokio::test]
    async fn test_add_comment_appends_each_time() {
        let config = config();
        let api = FakeAsana::new().with_task("t1", "notes");
        let writer = TaskWriter::new(&api, &config);

        writer.add_comment("t1", "hello").await.unwrap();
        writer.add_comment("t1", "hello").await.unwrap();

        assert_eq!(
            api.stories(),
            vec![
                ("t1".to_string(), "hello".to_string()),
                ("t1".to_string(), "hello".to_string())
            ]
        );
    }

    #[tokio::test]
    async fn test_move_to_section_uses_exact_name() {
        let config = config();
        let api = FakeAsana::new()
            .with_section("s-back", "Backlog (old)")
            .with_section("s-1", "Backlog")
            .with_task("t1", "notes");

        TaskWriter::new(&api, &config)
            .move_to_section("t1", "Backlog")
            .await
            .unwrap();

        assert_eq!(api.tasks()[0].section.as_deref(), Some("s-1"));
    }

    #[tokio::test]
    async fn test_move_to_missing_section() {
        let config = config();
        let api = FakeAsana::new()
            .with_section("s-1", "backlog")
            .with_task("t1", "notes");

        let err = TaskWriter::new(&api, &config)
            .move_to_section("t1", "Backlog")
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::SectionNotFound(ref name) if name == "Backlog"));
        assert_eq!(api.write_calls(), 0);
    }

    #[tokio::test]
    async fn test_write_failure_propagates() {
        let config = config();
        let api = FakeAsana::new().with_task("t1", "notes").failing_on("/tasks/t1");

        let err = TaskWriter::new(&api, &config)
            .set_completion("t1", true)
            .await
            .unwrap_err();

        assert_eq!(err.status_code(), Some(500));
    }
}
