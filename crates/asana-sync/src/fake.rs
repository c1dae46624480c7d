//! In-memory Asana project used by unit tests.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::{json, Value};
use std::sync::Mutex;

use crate::client::AsanaApi;
use crate::error::ApiError;

#[derive(Debug, Clone)]
pub struct FakeTask {
    pub gid: String,
    pub name: String,
    pub notes: String,
    pub completed: bool,
    pub section: Option<String>,
    pub external_gid: Option<String>,
}

#[derive(Debug, Default)]
struct State {
    tasks: Vec<FakeTask>,
    sections: Vec<(String, String)>,
    stories: Vec<(String, String)>,
    calls: Vec<(Method, String)>,
    fail_path: Option<String>,
    next_gid: u64,
}

/// Asana stand-in that serves the handful of endpoints the sync uses.
#[derive(Debug, Default)]
pub struct FakeAsana {
    state: Mutex<State>,
}

impl FakeAsana {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_section(self, gid: &str, name: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .sections
            .push((gid.to_string(), name.to_string()));
        self
    }

    /// Seed a task directly, bypassing the call log.
    pub fn with_task(self, gid: &str, notes: &str) -> Self {
        self.state.lock().unwrap().tasks.push(FakeTask {
            gid: gid.to_string(),
            name: gid.to_string(),
            notes: notes.to_string(),
            completed: false,
            section: None,
            external_gid: None,
        });
        self
    }

    /// Make every call whose path starts with `prefix` fail with a 500.
    pub fn failing_on(self, prefix: &str) -> Self {
        self.state.lock().unwrap().fail_path = Some(prefix.to_string());
        self
    }

    pub fn tasks(&self) -> Vec<FakeTask> {
        self.state.lock().unwrap().tasks.clone()
    }

    pub fn stories(&self) -> Vec<(String, String)> {
        self.state.lock().unwrap().stories.clone()
    }

    pub fn calls(&self) -> Vec<(Method, String)> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Number of calls that would change state on the Asana side.
    pub fn write_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|(method, _)| *method != Method::GET)
            .count()
    }
}

fn not_found(path: &str) -> ApiError {
    ApiError::Status {
        status: 404,
        body: format!("{{\"errors\":[{{\"message\":\"{path} not found\"}}]}}"),
    }
}

fn task_json(task: &FakeTask) -> Value {
    json!({
        "gid": task.gid,
        "name": task.name,
        "notes": task.notes,
        "completed": task.completed,
    })
}

#[async_trait]
impl AsanaApi for FakeAsana {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push((method.clone(), path.to_string()));

        if state
            .fail_path
            .as_deref()
            .is_some_and(|prefix| path.starts_with(prefix))
        {
            return Err(ApiError::Status {
                status: 500,
                body: "{\"errors\":[{\"message\":\"Server Error\"}]}".to_string(),
            });
        }

        let data = body.as_ref().and_then(|b| b.get("data")).cloned();
        let segments: Vec<&str> = path.trim_start_matches('/').split('/').collect();

        match (method.as_str(), segments.as_slice()) {
            ("POST", ["tasks"]) => {
                let data = data.unwrap_or_default();
                state.next_gid += 1;
                let task = FakeTask {
                    gid: format!("task-{}", state.next_gid),
                    name: data["name"].as_str().unwrap_or_default().to_string(),
                    notes: data["notes"].as_str().unwrap_or_default().to_string(),
                    completed: false,
                    section: None,
                    external_gid: data["external"]["gid"].as_str().map(str::to_string),
                };
                let json = task_json(&task);
                state.tasks.push(task);
                Ok(json)
            }
            ("PUT", ["tasks", gid]) => {
                let completed = data
                    .as_ref()
                    .and_then(|d| d["completed"].as_bool())
                    .unwrap_or_default();
                let task = state
                    .tasks
                    .iter_mut()
                    .find(|t| t.gid == *gid)
                    .ok_or_else(|| not_found(path))?;
                task.completed = completed;
                Ok(task_json(task))
            }
            ("GET", ["tasks", gid]) => state
                .tasks
                .iter()
                .find(|t| t.gid == *gid)
                .map(task_json)
                .ok_or_else(|| not_found(path)),
            ("GET", ["projects", _, "tasks"]) => Ok(Value::Array(
                state
                    .tasks
                    .iter()
                    .map(|t| json!({ "gid": t.gid, "name": t.name }))
                    .collect(),
            )),
            ("POST", ["tasks", gid, "stories"]) => {
                if !state.tasks.iter().any(|t| t.gid == *gid) {
                    return Err(not_found(path));
                }
                let text = data
                    .as_ref()
                    .and_then(|d| d["text"].as_str())
                    .unwrap_or_default()
                    .to_string();
                state.stories.push(((*gid).to_string(), text.clone()));
                Ok(json!({ "gid": format!("story-{}", state.stories.len()), "text": text }))
            }
            ("GET", ["projects", _, "sections"]) => Ok(Value::Array(
                state
                    .sections
                    .iter()
                    .map(|(gid, name)| json!({ "gid": gid, "name": name }))
                    .collect(),
            )),
            ("POST", ["sections", section, "addTask"]) => {
                let task_gid = data
                    .as_ref()
                    .and_then(|d| d["task"].as_str())
                    .unwrap_or_default()
                    .to_string();
                let section = (*section).to_string();
                let task = state
                    .tasks
                    .iter_mut()
                    .find(|t| t.gid == task_gid)
                    .ok_or_else(|| not_found(path))?;
                task.section = Some(section);
                Ok(json!({}))
            }
            _ => Err(not_found(path)),
        }
    }
}
