// Capability endpoints
//
// There is no single-capability GET: reads list everything and filter
// by id on the caller side.

use tracing::debug;

use crate::client::{NexusClient, segment};
use crate::error::Error;
use crate::response::ApiResponse;
use crate::types::{CapabilityRequest, CapabilityResponse};

impl NexusClient {
    /// `POST /v1/capabilities`
    pub async fn create_capability(&self, body: &CapabilityRequest) -> Result<ApiResponse, Error> {
        debug!(type_id = %body.type_id, "creating capability");
        self.post("v1/capabilities", body).await
    }

    /// `GET /v1/capabilities` as a raw envelope, for the lifecycle layer.
    pub async fn get_capabilities(&self) -> Result<ApiResponse, Error> {
        self.get("v1/capabilities").await
    }

    /// `PUT /v1/capabilities/{id}`
    pub async fn update_capability(
        &self,
        id: &str,
        body: &CapabilityRequest,
    ) -> Result<ApiResponse, Error> {
        debug!(id, type_id = %body.type_id, "updating capability");
        self.put(&format!("v1/capabilities/{}", segment(id)), body)
            .await
    }

    /// `DELETE /v1/capabilities/{id}`
    pub async fn delete_capability(&self, id: &str) -> Result<ApiResponse, Error> {
        debug!(id, "deleting capability");
        self.delete(&format!("v1/capabilities/{}", segment(id)))
            .await
    }

    /// `GET /v1/capabilities`, decoded.
    pub async fn list_capabilities(&self) -> Result<Vec<CapabilityResponse>, Error> {
        self.get_capabilities().await?.expect(&[200])?.json()
    }
}
