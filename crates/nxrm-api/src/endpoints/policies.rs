// Cleanup policy and routing rule endpoints

use tracing::debug;

use crate::client::{NexusClient, segment};
use crate::error::Error;
use crate::response::ApiResponse;
use crate::types::{CleanupPolicy, RoutingRule};

impl NexusClient {
    // ── Cleanup policies ─────────────────────────────────────────────

    /// `POST /v1/cleanup-policies`
    pub async fn create_cleanup_policy(&self, body: &CleanupPolicy) -> Result<ApiResponse, Error> {
        debug!(name = %body.name, "creating cleanup policy");
        self.post("v1/cleanup-policies", body).await
    }

    /// `GET /v1/cleanup-policies/{name}`
    pub async fn get_cleanup_policy(&self, name: &str) -> Result<ApiResponse, Error> {
        self.get(&format!("v1/cleanup-policies/{}", segment(name)))
            .await
    }

    /// `PUT /v1/cleanup-policies/{name}`
    pub async fn update_cleanup_policy(
        &self,
        name: &str,
        body: &CleanupPolicy,
    ) -> Result<ApiResponse, Error> {
        debug!(name, "updating cleanup policy");
        self.put(&format!("v1/cleanup-policies/{}", segment(name)), body)
            .await
    }

    /// `DELETE /v1/cleanup-policies/{name}`
    pub async fn delete_cleanup_policy(&self, name: &str) -> Result<ApiResponse, Error> {
        debug!(name, "deleting cleanup policy");
        self.delete(&format!("v1/cleanup-policies/{}", segment(name)))
            .await
    }

    /// `GET /v1/cleanup-policies`
    pub async fn list_cleanup_policies(&self) -> Result<Vec<CleanupPolicy>, Error> {
        self.get("v1/cleanup-policies").await?.expect(&[200])?.json()
    }

    // ── Routing rules ────────────────────────────────────────────────

    /// `POST /v1/routing-rules`
    pub async fn create_routing_rule(&self, body: &RoutingRule) -> Result<ApiResponse, Error> {
        debug!(name = %body.name, "creating routing rule");
        self.post("v1/routing-rules", body).await
    }

    /// `GET /v1/routing-rules/{name}`
    pub async fn get_routing_rule(&self, name: &str) -> Result<ApiResponse, Error> {
        self.get(&format!("v1/routing-rules/{}", segment(name)))
            .await
    }

    /// `PUT /v1/routing-rules/{name}`
    pub async fn update_routing_rule(
        &self,
        name: &str,
        body: &RoutingRule,
    ) -> Result<ApiResponse, Error> {
        debug!(name, "updating routing rule");
        self.put(&format!("v1/routing-rules/{}", segment(name)), body)
            .await
    }

    /// `DELETE /v1/routing-rules/{name}`
    pub async fn delete_routing_rule(&self, name: &str) -> Result<ApiResponse, Error> {
        debug!(name, "deleting routing rule");
        self.delete(&format!("v1/routing-rules/{}", segment(name)))
            .await
    }

    /// `GET /v1/routing-rules`
    pub async fn list_routing_rules(&self) -> Result<Vec<RoutingRule>, Error> {
        self.get("v1/routing-rules").await?.expect(&[200])?.json()
    }
}
