//! Blob stores: file, group, S3 and Google Cloud.
//!
//! Every flavour is created under `v1/blobstores/{kind}` and deleted by
//! name. The GET responses omit `name`, so reads carry it over from state.

pub mod google;
pub mod s3;

use std::sync::Arc;

use nxrm_api::NexusClient;
use nxrm_api::types::{FileBlobStore, GroupBlobStore, SoftQuota};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::lifecycle::{Engine, Resource, ResourceHandler, stamped, type_name};
use crate::resources::found;
use crate::schema::{Attribute, Schema};

pub const SOFT_QUOTA_TYPES: &[&str] = &["spaceRemainingQuota", "spaceUsedQuota"];
pub const FILL_POLICIES: &[&str] = &["roundRobin", "writeToFirst"];

// ── Shared ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SoftQuotaModel {
    #[serde(rename = "type")]
    pub quota_type: String,
    pub limit: i64,
}

impl From<&SoftQuota> for SoftQuotaModel {
    fn from(api: &SoftQuota) -> Self {
        Self {
            quota_type: api.quota_type.clone(),
            limit: api.limit,
        }
    }
}

impl SoftQuotaModel {
    pub fn to_api(&self) -> SoftQuota {
        SoftQuota {
            quota_type: self.quota_type.clone(),
            limit: self.limit,
        }
    }
}

pub(crate) fn soft_quota_attribute() -> Attribute {
    Attribute::object(
        "soft_quota",
        vec![
            Attribute::string("type").required().one_of(SOFT_QUOTA_TYPES),
            Attribute::int64("limit")
                .required()
                .at_least(1)
                .description("Quota threshold in bytes."),
        ],
    )
    .description("Soft quota; exceeding it raises an alert but never blocks writes.")
}

pub(crate) fn name_attribute() -> Attribute {
    Attribute::string("name")
        .required()
        .min_length(1)
        .requires_replace()
        .description("Name of the blob store.")
}

async fn delete_by_name(client: &NexusClient, name: &str) -> Result<(), CoreError> {
    client.delete_blob_store(name).await?.expect(&[200, 204])?;
    Ok(())
}

// ── File ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBlobStoreModel {
    pub name: String,
    pub path: Option<String>,
    pub soft_quota: Option<SoftQuotaModel>,
    pub last_updated: Option<String>,
}

stamped!(FileBlobStoreModel);

impl FileBlobStoreModel {
    fn from_api(name: &str, api: &FileBlobStore) -> Self {
        Self {
            name: name.to_owned(),
            path: api.path.clone(),
            soft_quota: api.soft_quota.as_ref().map(SoftQuotaModel::from),
            last_updated: None,
        }
    }

    pub fn to_api(&self) -> FileBlobStore {
        FileBlobStore {
            name: Some(self.name.clone()),
            path: self.path.clone(),
            soft_quota: self.soft_quota.as_ref().map(SoftQuotaModel::to_api),
        }
    }
}

pub struct FileBlobStoreResource;

impl FileBlobStoreResource {
    async fn fetch(
        client: &NexusClient,
        name: &str,
    ) -> Result<Option<FileBlobStoreModel>, CoreError> {
        let api: Option<FileBlobStore> = found(client.get_blob_store("file", name).await?)?;
        Ok(api.map(|a| FileBlobStoreModel::from_api(name, &a)))
    }
}

impl Resource for FileBlobStoreResource {
    type Model = FileBlobStoreModel;

    fn type_name(&self) -> String {
        type_name("blob_store_file")
    }

    fn schema(&self) -> Schema {
        Schema::new("Manage a blob store on the server's file system.")
            .attributes([
                name_attribute(),
                Attribute::string("path")
                    .optional_computed()
                    .use_state_for_unknown()
                    .requires_replace()
                    .description("Absolute path, or one relative to the data directory. Defaults to the name."),
                soft_quota_attribute(),
            ])
            .with_last_updated()
    }

    fn key(&self, model: &Self::Model) -> String {
        model.name.clone()
    }

    async fn create(&self, client: &NexusClient, plan: &Self::Model) -> Result<Self::Model, CoreError> {
        client
            .create_blob_store("file", &plan.to_api())
            .await?
            .expect(&[200, 201, 204])?;
        if plan.path.is_some() {
            return Ok(plan.clone());
        }
        // The server derives the path; pick it up so state is complete.
        let fetched = Self::fetch(client, &plan.name).await?;
        Ok(Self::Model {
            path: fetched.and_then(|m| m.path),
            ..plan.clone()
        })
    }

    async fn read(
        &self,
        client: &NexusClient,
        state: &Self::Model,
    ) -> Result<Option<Self::Model>, CoreError> {
        Self::fetch(client, &state.name).await
    }

    async fn update(
        &self,
        client: &NexusClient,
        plan: &Self::Model,
        state: &Self::Model,
    ) -> Result<Self::Model, CoreError> {
        client
            .update_blob_store("file", &state.name, &plan.to_api())
            .await?
            .expect(&[200, 204])?;
        Ok(Self::Model {
            path: plan.path.clone().or_else(|| state.path.clone()),
            ..plan.clone()
        })
    }

    async fn delete(&self, client: &NexusClient, state: &Self::Model) -> Result<(), CoreError> {
        delete_by_name(client, &state.name).await
    }

    fn import_model(&self, id: &str) -> Result<Self::Model, CoreError> {
        Ok(FileBlobStoreModel {
            name: id.to_owned(),
            ..FileBlobStoreModel::default()
        })
    }
}

// ── Group ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupBlobStoreModel {
    pub name: String,
    pub members: Vec<String>,
    pub fill_policy: String,
    pub soft_quota: Option<SoftQuotaModel>,
    pub last_updated: Option<String>,
}

stamped!(GroupBlobStoreModel);

impl GroupBlobStoreModel {
    fn from_api(name: &str, api: &GroupBlobStore) -> Self {
        Self {
            name: name.to_owned(),
            members: api.members.clone(),
            fill_policy: api.fill_policy.clone().unwrap_or_default(),
            soft_quota: api.soft_quota.as_ref().map(SoftQuotaModel::from),
            last_updated: None,
        }
    }

    pub fn to_api(&self) -> GroupBlobStore {
        GroupBlobStore {
            name: Some(self.name.clone()),
            soft_quota: self.soft_quota.as_ref().map(SoftQuotaModel::to_api),
            members: self.members.clone(),
            fill_policy: Some(self.fill_policy.clone()),
        }
    }
}

pub struct GroupBlobStoreResource;

impl Resource for GroupBlobStoreResource {
    type Model = GroupBlobStoreModel;

    fn type_name(&self) -> String {
        type_name("blob_store_group")
    }

    fn schema(&self) -> Schema {
        Schema::new("Manage a blob store that spreads content over member stores.")
            .attributes([
                name_attribute(),
                Attribute::string_list("members")
                    .required()
                    .min_size(1)
                    .description("Member blob stores, in order."),
                Attribute::string("fill_policy")
                    .required()
                    .one_of(FILL_POLICIES),
                soft_quota_attribute(),
            ])
            .with_last_updated()
    }

    fn key(&self, model: &Self::Model) -> String {
        model.name.clone()
    }

    async fn create(&self, client: &NexusClient, plan: &Self::Model) -> Result<Self::Model, CoreError> {
        client
            .create_blob_store("group", &plan.to_api())
            .await?
            .expect(&[200, 201, 204])?;
        Ok(plan.clone())
    }

    async fn read(
        &self,
        client: &NexusClient,
        state: &Self::Model,
    ) -> Result<Option<Self::Model>, CoreError> {
        let api: Option<GroupBlobStore> = found(client.get_blob_store("group", &state.name).await?)?;
        Ok(api.map(|a| GroupBlobStoreModel::from_api(&state.name, &a)))
    }

    async fn update(
        &self,
        client: &NexusClient,
        plan: &Self::Model,
        state: &Self::Model,
    ) -> Result<Self::Model, CoreError> {
        client
            .update_blob_store("group", &state.name, &plan.to_api())
            .await?
            .expect(&[200, 204])?;
        Ok(plan.clone())
    }

    async fn delete(&self, client: &NexusClient, state: &Self::Model) -> Result<(), CoreError> {
        delete_by_name(client, &state.name).await
    }

    fn import_model(&self, id: &str) -> Result<Self::Model, CoreError> {
        Ok(GroupBlobStoreModel {
            name: id.to_owned(),
            ..GroupBlobStoreModel::default()
        })
    }
}

pub fn blob_store_handlers() -> Vec<Arc<dyn ResourceHandler>> {
    vec![
        Arc::new(Engine::new(FileBlobStoreResource)),
        Arc::new(Engine::new(GroupBlobStoreResource)),
        Arc::new(Engine::new(s3::S3BlobStoreResource)),
        Arc::new(Engine::new(google::GoogleBlobStoreResource)),
    ]
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn file_read_takes_name_from_state() {
        let api: FileBlobStore = serde_json::from_value(json!({
            "path": "/nexus-data/blobs/default",
            "softQuota": { "type": "spaceUsedQuota", "limit": 1_048_576 }
        }))
        .unwrap();
        let model = FileBlobStoreModel::from_api("default", &api);
        assert_eq!(model.name, "default");
        assert_eq!(model.soft_quota.unwrap().quota_type, "spaceUsedQuota");
    }

    #[test]
    fn group_members_keep_order_on_the_wire() {
        let model = GroupBlobStoreModel {
            name: "all".into(),
            members: vec!["b".into(), "a".into()],
            fill_policy: "writeToFirst".into(),
            ..GroupBlobStoreModel::default()
        };
        let body = serde_json::to_value(model.to_api()).unwrap();
        assert_eq!(body["members"], json!(["b", "a"]));
        assert_eq!(body["fillPolicy"], "writeToFirst");
        assert!(body.get("softQuota").is_none());
    }
}
