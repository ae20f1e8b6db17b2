// Repository endpoints
//
// Create/read/update are addressed by `{format}/{type}`; delete and the
// listing are format-agnostic.

use serde::Serialize;
use tracing::debug;

use crate::client::{NexusClient, segment};
use crate::error::Error;
use crate::response::ApiResponse;
use crate::types::RepositorySummary;

impl NexusClient {
    /// `POST /v1/repositories/{format}/{type}`
    pub async fn create_repository<B: Serialize + Sync>(
        &self,
        format: &str,
        repository_type: &str,
        body: &B,
    ) -> Result<ApiResponse, Error> {
        debug!(format, repository_type, "creating repository");
        self.post(&format!("v1/repositories/{format}/{repository_type}"), body)
            .await
    }

    /// `GET /v1/repositories/{format}/{type}/{name}`
    pub async fn get_repository(
        &self,
        format: &str,
        repository_type: &str,
        name: &str,
    ) -> Result<ApiResponse, Error> {
        self.get(&format!(
            "v1/repositories/{format}/{repository_type}/{}",
            segment(name)
        ))
        .await
    }

    /// `PUT /v1/repositories/{format}/{type}/{name}`
    pub async fn update_repository<B: Serialize + Sync>(
        &self,
        format: &str,
        repository_type: &str,
        name: &str,
        body: &B,
    ) -> Result<ApiResponse, Error> {
        debug!(format, repository_type, name, "updating repository");
        self.put(
            &format!("v1/repositories/{format}/{repository_type}/{}", segment(name)),
            body,
        )
        .await
    }

    /// `DELETE /v1/repositories/{name}`
    pub async fn delete_repository(&self, name: &str) -> Result<ApiResponse, Error> {
        debug!(name, "deleting repository");
        self.delete(&format!("v1/repositories/{}", segment(name)))
            .await
    }

    /// `GET /v1/repositories`
    pub async fn list_repositories(&self) -> Result<Vec<RepositorySummary>, Error> {
        self.get("v1/repositories").await?.expect(&[200])?.json()
    }
}
