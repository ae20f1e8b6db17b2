// Blob store endpoints
//
// `kind` is the path segment for the store flavour: `file`, `group`,
// `s3` or `google`.

use serde::Serialize;
use tracing::debug;

use crate::client::{NexusClient, segment};
use crate::error::Error;
use crate::response::ApiResponse;
use crate::types::BlobStoreSummary;

impl NexusClient {
    /// `POST /v1/blobstores/{kind}`
    pub async fn create_blob_store<B: Serialize + Sync>(
        &self,
        kind: &str,
        body: &B,
    ) -> Result<ApiResponse, Error> {
        debug!(kind, "creating blob store");
        self.post(&format!("v1/blobstores/{kind}"), body).await
    }

    /// `GET /v1/blobstores/{kind}/{name}`
    pub async fn get_blob_store(&self, kind: &str, name: &str) -> Result<ApiResponse, Error> {
        self.get(&format!("v1/blobstores/{kind}/{}", segment(name)))
            .await
    }

    /// `PUT /v1/blobstores/{kind}/{name}`
    pub async fn update_blob_store<B: Serialize + Sync>(
        &self,
        kind: &str,
        name: &str,
        body: &B,
    ) -> Result<ApiResponse, Error> {
        debug!(kind, name, "updating blob store");
        self.put(&format!("v1/blobstores/{kind}/{}", segment(name)), body)
            .await
    }

    /// `DELETE /v1/blobstores/{name}`
    pub async fn delete_blob_store(&self, name: &str) -> Result<ApiResponse, Error> {
        debug!(name, "deleting blob store");
        self.delete(&format!("v1/blobstores/{}", segment(name)))
            .await
    }

    /// `GET /v1/blobstores`
    pub async fn list_blob_stores(&self) -> Result<Vec<BlobStoreSummary>, Error> {
        self.get("v1/blobstores").await?.expect(&[200])?.json()
    }
}
