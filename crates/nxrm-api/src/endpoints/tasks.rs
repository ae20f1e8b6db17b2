// Scheduled task endpoints

use tracing::debug;

use crate::client::{NexusClient, segment};
use crate::error::Error;
use crate::response::ApiResponse;
use crate::types::{Page, TaskRequest, TaskSummary};

impl NexusClient {
    /// `POST /v1/tasks` -- answers `201 {"id": "…"}`.
    pub async fn create_task(&self, body: &TaskRequest) -> Result<ApiResponse, Error> {
        debug!(type_id = %body.type_id, name = %body.name, "creating task");
        self.post("v1/tasks", body).await
    }

    /// `GET /v1/tasks/{id}`
    pub async fn get_task(&self, id: &str) -> Result<ApiResponse, Error> {
        self.get(&format!("v1/tasks/{}", segment(id))).await
    }

    /// `PUT /v1/tasks/{id}`
    pub async fn update_task(&self, id: &str, body: &TaskRequest) -> Result<ApiResponse, Error> {
        debug!(id, "updating task");
        self.put(&format!("v1/tasks/{}", segment(id)), body).await
    }

    /// `DELETE /v1/tasks/{id}`
    pub async fn delete_task(&self, id: &str) -> Result<ApiResponse, Error> {
        debug!(id, "deleting task");
        self.delete(&format!("v1/tasks/{}", segment(id))).await
    }

    /// `GET /v1/tasks`, following continuation tokens until exhausted.
    pub async fn list_tasks(&self) -> Result<Vec<TaskSummary>, Error> {
        let mut items = Vec::new();
        let mut token: Option<String> = None;
        loop {
            let resp = match token.as_deref() {
                Some(t) => {
                    self.get_with_params("v1/tasks", &[("continuationToken", t)])
                        .await?
                }
                None => self.get("v1/tasks").await?,
            };
            let page: Page<TaskSummary> = resp.expect(&[200])?.json()?;
            items.extend(page.items);
            match page.continuation_token {
                Some(next) if !next.is_empty() => token = Some(next),
                _ => break,
            }
        }
        Ok(items)
    }
}
