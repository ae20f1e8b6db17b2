// S3 blob stores.
//
// Schema version 1 nests the bucket settings under `bucket_configuration`,
// mirroring the API document. Version 0 state kept the bucket fields flat
// (`bucket_region`, `bucket_name`, ...) next to top-level `encryption`,
// `bucket_security` and `advanced_bucket_connection` blocks.

use nxrm_api::NexusClient;
use nxrm_api::types::{
    S3AdvancedBucketConnection, S3BlobStore, S3Bucket, S3BucketConfiguration, S3BucketSecurity,
    S3Encryption,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::info;

use super::{SoftQuotaModel, name_attribute, soft_quota_attribute};
use crate::error::CoreError;
use crate::lifecycle::{Resource, stamped, type_name};
use crate::resources::found;
use crate::schema::{Attribute, Schema};

pub const SCHEMA_VERSION: i64 = 1;
pub const ENCRYPTION_TYPES: &[&str] = &["s3ManagedEncryption", "kmsManagedEncryption"];
pub const SIGNER_TYPES: &[&str] = &["DEFAULT", "S3SignerType", "AWSS3V4SignerType"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct S3BucketModel {
    pub region: String,
    pub name: String,
    pub prefix: Option<String>,
    pub expiration: i64,
}

/// `encryption_key` is write-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct S3EncryptionModel {
    pub encryption_type: Option<String>,
    pub encryption_key: Option<String>,
}

/// `secret_access_key` and `session_token` are write-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct S3BucketSecurityModel {
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
    pub role: Option<String>,
    pub session_token: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct S3AdvancedConnectionModel {
    pub endpoint: Option<String>,
    pub signer_type: Option<String>,
    pub force_path_style: Option<bool>,
    pub max_connection_pool_size: Option<i64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct S3BucketConfigurationModel {
    pub bucket: S3BucketModel,
    pub encryption: Option<S3EncryptionModel>,
    pub bucket_security: Option<S3BucketSecurityModel>,
    pub advanced_bucket_connection: Option<S3AdvancedConnectionModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct S3BlobStoreModel {
    pub name: String,
    pub soft_quota: Option<SoftQuotaModel>,
    pub bucket_configuration: S3BucketConfigurationModel,
    pub last_updated: Option<String>,
}

stamped!(S3BlobStoreModel);

impl S3BlobStoreModel {
    fn from_api(name: &str, api: &S3BlobStore) -> Self {
        let cfg = &api.bucket_configuration;
        Self {
            name: name.to_owned(),
            soft_quota: api.soft_quota.as_ref().map(SoftQuotaModel::from),
            bucket_configuration: S3BucketConfigurationModel {
                bucket: S3BucketModel {
                    region: cfg.bucket.region.clone(),
                    name: cfg.bucket.name.clone(),
                    prefix: cfg.bucket.prefix.clone().filter(|p| !p.is_empty()),
                    expiration: cfg.bucket.expiration,
                },
                encryption: cfg.encryption.as_ref().map(|e| S3EncryptionModel {
                    encryption_type: e.encryption_type.clone(),
                    encryption_key: None,
                }),
                bucket_security: cfg.bucket_security.as_ref().map(|s| S3BucketSecurityModel {
                    access_key_id: s.access_key_id.clone(),
                    secret_access_key: None,
                    role: s.role.clone(),
                    session_token: None,
                }),
                advanced_bucket_connection: cfg.advanced_bucket_connection.as_ref().map(|a| {
                    S3AdvancedConnectionModel {
                        endpoint: a.endpoint.clone(),
                        signer_type: a.signer_type.clone(),
                        force_path_style: a.force_path_style,
                        max_connection_pool_size: a.max_connection_pool_size,
                    }
                }),
            },
            last_updated: None,
        }
    }

    pub fn to_api(&self) -> S3BlobStore {
        let cfg = &self.bucket_configuration;
        S3BlobStore {
            name: Some(self.name.clone()),
            soft_quota: self.soft_quota.as_ref().map(SoftQuotaModel::to_api),
            bucket_configuration: S3BucketConfiguration {
                bucket: S3Bucket {
                    region: cfg.bucket.region.clone(),
                    name: cfg.bucket.name.clone(),
                    prefix: cfg.bucket.prefix.clone(),
                    expiration: cfg.bucket.expiration,
                },
                encryption: cfg.encryption.as_ref().map(|e| S3Encryption {
                    encryption_type: e.encryption_type.clone(),
                    encryption_key: e.encryption_key.clone(),
                }),
                bucket_security: cfg.bucket_security.as_ref().map(|s| S3BucketSecurity {
                    access_key_id: s.access_key_id.clone(),
                    secret_access_key: s.secret_access_key.clone(),
                    role: s.role.clone(),
                    session_token: s.session_token.clone(),
                }),
                advanced_bucket_connection: cfg.advanced_bucket_connection.as_ref().map(|a| {
                    S3AdvancedBucketConnection {
                        endpoint: a.endpoint.clone(),
                        signer_type: a.signer_type.clone(),
                        force_path_style: a.force_path_style,
                        max_connection_pool_size: a.max_connection_pool_size,
                    }
                }),
            },
        }
    }
}

fn bucket_configuration_attribute() -> Attribute {
    Attribute::object(
        "bucket_configuration",
        vec![
            Attribute::object(
                "bucket",
                vec![
                    Attribute::string("region")
                        .required()
                        .description("AWS region, or DEFAULT for the SDK's choice."),
                    Attribute::string("name").required().min_length(3),
                    Attribute::string("prefix"),
                    Attribute::int64("expiration")
                        .default(3)
                        .at_least(-1)
                        .description("Days before soft-deleted blobs are purged; -1 disables."),
                ],
            )
            .required(),
            Attribute::object(
                "encryption",
                vec![
                    Attribute::string("encryption_type").one_of(ENCRYPTION_TYPES),
                    Attribute::string("encryption_key").write_only(),
                ],
            ),
            Attribute::object(
                "bucket_security",
                vec![
                    Attribute::string("access_key_id"),
                    Attribute::string("secret_access_key").write_only(),
                    Attribute::string("role"),
                    Attribute::string("session_token").write_only(),
                ],
            ),
            Attribute::object(
                "advanced_bucket_connection",
                vec![
                    Attribute::string("endpoint").description("Custom S3-compatible endpoint URL."),
                    Attribute::string("signer_type").one_of(SIGNER_TYPES),
                    Attribute::bool("force_path_style"),
                    Attribute::int64("max_connection_pool_size").at_least(1),
                ],
            ),
        ],
    )
    .required()
}

/// Move flat version-0 attributes into the nested version-1 layout.
pub fn upgrade_v0(state: Value) -> Result<Value, CoreError> {
    let Value::Object(mut flat) = state else {
        return Err(CoreError::ContractViolation(
            "S3 blob store state is not an object".to_owned(),
        ));
    };

    let mut bucket = Map::new();
    for (old, new) in [
        ("bucket_region", "region"),
        ("bucket_name", "name"),
        ("bucket_prefix", "prefix"),
        ("bucket_expiration", "expiration"),
    ] {
        if let Some(v) = flat.remove(old) {
            bucket.insert(new.to_owned(), v);
        }
    }

    let mut cfg = Map::new();
    cfg.insert("bucket".to_owned(), Value::Object(bucket));
    for block in ["encryption", "bucket_security", "advanced_bucket_connection"] {
        if let Some(v) = flat.remove(block) {
            cfg.insert(block.to_owned(), v);
        }
    }
    flat.insert("bucket_configuration".to_owned(), Value::Object(cfg));
    Ok(Value::Object(flat))
}

pub struct S3BlobStoreResource;

impl Resource for S3BlobStoreResource {
    type Model = S3BlobStoreModel;

    fn type_name(&self) -> String {
        type_name("blob_store_s3")
    }

    fn schema(&self) -> Schema {
        Schema::new("Manage a blob store backed by an Amazon S3 bucket.")
            .version(SCHEMA_VERSION)
            .attributes([
                name_attribute(),
                soft_quota_attribute(),
                bucket_configuration_attribute(),
            ])
            .with_last_updated()
    }

    fn key(&self, model: &Self::Model) -> String {
        model.name.clone()
    }

    async fn create(&self, client: &NexusClient, plan: &Self::Model) -> Result<Self::Model, CoreError> {
        client
            .create_blob_store("s3", &plan.to_api())
            .await?
            .expect(&[200, 201, 204])?;
        Ok(plan.clone())
    }

    async fn read(
        &self,
        client: &NexusClient,
        state: &Self::Model,
    ) -> Result<Option<Self::Model>, CoreError> {
        let api: Option<S3BlobStore> = found(client.get_blob_store("s3", &state.name).await?)?;
        Ok(api.map(|a| S3BlobStoreModel::from_api(&state.name, &a)))
    }

    async fn update(
        &self,
        client: &NexusClient,
        plan: &Self::Model,
        state: &Self::Model,
    ) -> Result<Self::Model, CoreError> {
        client
            .update_blob_store("s3", &state.name, &plan.to_api())
            .await?
            .expect(&[200, 204])?;
        Ok(plan.clone())
    }

    async fn delete(&self, client: &NexusClient, state: &Self::Model) -> Result<(), CoreError> {
        super::delete_by_name(client, &state.name).await
    }

    fn import_model(&self, id: &str) -> Result<Self::Model, CoreError> {
        Ok(S3BlobStoreModel {
            name: id.to_owned(),
            ..S3BlobStoreModel::default()
        })
    }

    fn upgrade_state(&self, from_version: i64, state: Value) -> Result<Value, CoreError> {
        match from_version {
            0 => {
                info!(resource = %self.type_name(), "upgrading state from schema version 0");
                upgrade_v0(state)
            }
            other => Err(CoreError::UnsupportedStateVersion {
                type_name: self.type_name(),
                from: other,
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[test]
    fn v0_state_is_nested() {
        let v0 = json!({
            "name": "s3-store",
            "bucket_region": "eu-west-1",
            "bucket_name": "artifacts",
            "bucket_prefix": "nexus",
            "bucket_expiration": 7,
            "bucket_security": { "access_key_id": "AKIA", "secret_access_key": "s3cr3t" },
            "last_updated": "Monday, 01-Jan-24 00:00:00 UTC"
        });
        let v1 = upgrade_v0(v0).unwrap();
        assert_eq!(
            v1,
            json!({
                "name": "s3-store",
                "bucket_configuration": {
                    "bucket": {
                        "region": "eu-west-1",
                        "name": "artifacts",
                        "prefix": "nexus",
                        "expiration": 7
                    },
                    "bucket_security": { "access_key_id": "AKIA", "secret_access_key": "s3cr3t" }
                },
                "last_updated": "Monday, 01-Jan-24 00:00:00 UTC"
            })
        );
        let model: S3BlobStoreModel = serde_json::from_value(v1).unwrap();
        assert_eq!(model.bucket_configuration.bucket.expiration, 7);
    }

    #[test]
    fn unknown_versions_are_rejected() {
        let err = S3BlobStoreResource.upgrade_state(5, json!({})).unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedStateVersion { from: 5, .. }));
    }

    #[test]
    fn secrets_are_not_read_back() {
        let api: S3BlobStore = serde_json::from_value(json!({
            "bucketConfiguration": {
                "bucket": { "region": "us-east-1", "name": "b", "expiration": 3 },
                "bucketSecurity": { "accessKeyId": "AKIA", "secretAccessKey": "" },
                "encryption": { "encryptionType": "kmsManagedEncryption", "encryptionKey": "k" }
            }
        }))
        .unwrap();
        let model = S3BlobStoreModel::from_api("s3", &api);
        let cfg = model.bucket_configuration;
        assert_eq!(cfg.bucket_security.unwrap().secret_access_key, None);
        assert_eq!(cfg.encryption.unwrap().encryption_key, None);
    }
}
