// Repository and blob store listings.

use nxrm_api::NexusClient;
use nxrm_api::types::{BlobStoreSummary, RepositorySummary};
use serde::Serialize;
use serde_json::Value;

use crate::datasource::DataSource;
use crate::error::CoreError;
use crate::lifecycle::type_name;
use crate::resources::blob_store::{SoftQuotaModel, soft_quota_attribute};
use crate::schema::{Attribute, Schema, computed_view};

// ── Repositories ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepositoryItem {
    pub name: String,
    pub format: String,
    #[serde(rename = "type")]
    pub repository_type: String,
    pub url: Option<String>,
}

impl From<&RepositorySummary> for RepositoryItem {
    fn from(api: &RepositorySummary) -> Self {
        Self {
            name: api.name.clone(),
            format: api.format.clone(),
            repository_type: api.repository_type.clone(),
            url: api.url.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Repositories {
    pub repositories: Vec<RepositoryItem>,
}

pub struct RepositoriesDataSource;

impl DataSource for RepositoriesDataSource {
    type Output = Repositories;

    fn type_name(&self) -> String {
        type_name("repositories")
    }

    fn schema(&self) -> Schema {
        Schema::new("List every repository visible to the configured user.").attribute(
            Attribute::object_list(
                "repositories",
                computed_view(vec![
                    Attribute::string("name"),
                    Attribute::string("format"),
                    Attribute::string("type").description("hosted, proxy or group."),
                    Attribute::string("url"),
                ]),
            )
            .computed(),
        )
    }

    async fn read(&self, client: &NexusClient, _config: &Value) -> Result<Repositories, CoreError> {
        let rows = client.list_repositories().await?;
        Ok(Repositories {
            repositories: rows.iter().map(RepositoryItem::from).collect(),
        })
    }
}

// ── Blob stores ──────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlobStoreItem {
    pub name: String,
    #[serde(rename = "type")]
    pub store_type: String,
    pub available: bool,
    pub blob_count: i64,
    pub total_size_in_bytes: i64,
    pub available_space_in_bytes: i64,
    pub soft_quota: Option<SoftQuotaModel>,
}

impl From<&BlobStoreSummary> for BlobStoreItem {
    fn from(api: &BlobStoreSummary) -> Self {
        Self {
            name: api.name.clone(),
            store_type: api.store_type.clone(),
            available: api.available,
            blob_count: api.blob_count,
            total_size_in_bytes: api.total_size_in_bytes,
            available_space_in_bytes: api.available_space_in_bytes,
            soft_quota: api.soft_quota.as_ref().map(SoftQuotaModel::from),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BlobStores {
    pub blob_stores: Vec<BlobStoreItem>,
}

pub struct BlobStoresDataSource;

impl DataSource for BlobStoresDataSource {
    type Output = BlobStores;

    fn type_name(&self) -> String {
        type_name("blob_stores")
    }

    fn schema(&self) -> Schema {
        Schema::new("List every blob store with its usage figures.").attribute(
            Attribute::object_list(
                "blob_stores",
                computed_view(vec![
                    Attribute::string("name"),
                    Attribute::string("type").description("File, Group, S3 or Google Cloud Storage."),
                    Attribute::bool("available"),
                    Attribute::int64("blob_count"),
                    Attribute::int64("total_size_in_bytes"),
                    Attribute::int64("available_space_in_bytes"),
                    soft_quota_attribute(),
                ]),
            )
            .computed(),
        )
    }

    async fn read(&self, client: &NexusClient, _config: &Value) -> Result<BlobStores, CoreError> {
        let rows = client.list_blob_stores().await?;
        Ok(BlobStores {
            blob_stores: rows.iter().map(BlobStoreItem::from).collect(),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn blob_store_rows_keep_the_quota() {
        let api: BlobStoreSummary = serde_json::from_value(json!({
            "name": "default",
            "type": "File",
            "available": true,
            "blobCount": 12,
            "totalSizeInBytes": 2048,
            "availableSpaceInBytes": 4096,
            "softQuota": { "type": "spaceUsedQuota", "limit": 1000 }
        }))
        .unwrap();
        let mut rendered = serde_json::to_value(BlobStores {
            blob_stores: vec![BlobStoreItem::from(&api)],
        })
        .unwrap();
        BlobStoresDataSource.schema().retain_known(&mut rendered);
        assert_eq!(
            rendered["blob_stores"][0],
            json!({
                "name": "default",
                "type": "File",
                "available": true,
                "blob_count": 12,
                "total_size_in_bytes": 2048,
                "available_space_in_bytes": 4096,
                "soft_quota": { "type": "spaceUsedQuota", "limit": 1000 }
            })
        );
    }
}
