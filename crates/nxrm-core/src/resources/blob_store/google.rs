// Google Cloud Storage blob stores.

use nxrm_api::NexusClient;
use nxrm_api::types::{
    GoogleBlobStore, GoogleBucket, GoogleBucketConfiguration, GoogleBucketSecurity,
    GoogleEncryption,
};
use serde::{Deserialize, Serialize};

use super::{SoftQuotaModel, name_attribute, soft_quota_attribute};
use crate::error::CoreError;
use crate::lifecycle::{Resource, stamped, type_name};
use crate::resources::found;
use crate::schema::{Attribute, Schema};

pub const AUTHENTICATION_METHODS: &[&str] = &["applicationDefault", "accountKey"];
pub const ENCRYPTION_TYPES: &[&str] = &["default", "kmsManagedEncryption"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleBucketModel {
    pub name: String,
    pub prefix: Option<String>,
    pub region: String,
    pub project_id: Option<String>,
}

/// `account_key` is write-only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleBucketSecurityModel {
    pub authentication_method: String,
    pub account_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleEncryptionModel {
    pub encryption_type: Option<String>,
    pub encryption_key: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleBucketConfigurationModel {
    pub bucket: GoogleBucketModel,
    pub bucket_security: Option<GoogleBucketSecurityModel>,
    pub encryption: Option<GoogleEncryptionModel>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GoogleBlobStoreModel {
    pub name: String,
    pub soft_quota: Option<SoftQuotaModel>,
    pub bucket_configuration: GoogleBucketConfigurationModel,
    pub last_updated: Option<String>,
}

stamped!(GoogleBlobStoreModel);

impl GoogleBlobStoreModel {
    fn from_api(name: &str, api: &GoogleBlobStore) -> Self {
        let cfg = &api.bucket_configuration;
        Self {
            name: name.to_owned(),
            soft_quota: api.soft_quota.as_ref().map(SoftQuotaModel::from),
            bucket_configuration: GoogleBucketConfigurationModel {
                bucket: GoogleBucketModel {
                    name: cfg.bucket.name.clone(),
                    prefix: cfg.bucket.prefix.clone().filter(|p| !p.is_empty()),
                    region: cfg.bucket.region.clone(),
                    project_id: cfg.bucket.project_id.clone(),
                },
                bucket_security: cfg.bucket_security.as_ref().map(|s| {
                    GoogleBucketSecurityModel {
                        authentication_method: s.authentication_method.clone(),
                        account_key: None,
                    }
                }),
                encryption: cfg.encryption.as_ref().map(|e| GoogleEncryptionModel {
                    encryption_type: e.encryption_type.clone(),
                    encryption_key: e.encryption_key.clone(),
                }),
            },
            last_updated: None,
        }
    }

    pub fn to_api(&self) -> GoogleBlobStore {
        let cfg = &self.bucket_configuration;
        GoogleBlobStore {
            name: Some(self.name.clone()),
            soft_quota: self.soft_quota.as_ref().map(SoftQuotaModel::to_api),
            bucket_configuration: GoogleBucketConfiguration {
                bucket: GoogleBucket {
                    name: cfg.bucket.name.clone(),
                    prefix: cfg.bucket.prefix.clone(),
                    region: cfg.bucket.region.clone(),
                    project_id: cfg.bucket.project_id.clone(),
                },
                bucket_security: cfg.bucket_security.as_ref().map(|s| GoogleBucketSecurity {
                    authentication_method: s.authentication_method.clone(),
                    account_key: s.account_key.clone(),
                }),
                encryption: cfg.encryption.as_ref().map(|e| GoogleEncryption {
                    encryption_type: e.encryption_type.clone(),
                    encryption_key: e.encryption_key.clone(),
                }),
            },
        }
    }
}

pub struct GoogleBlobStoreResource;

impl Resource for GoogleBlobStoreResource {
    type Model = GoogleBlobStoreModel;

    fn type_name(&self) -> String {
        type_name("blob_store_google_cloud")
    }

    fn schema(&self) -> Schema {
        Schema::new("Manage a blob store backed by a Google Cloud Storage bucket.")
            .attributes([
                name_attribute(),
                soft_quota_attribute(),
                Attribute::object(
                    "bucket_configuration",
                    vec![
                        Attribute::object(
                            "bucket",
                            vec![
                                Attribute::string("name").required().min_length(3),
                                Attribute::string("prefix"),
                                Attribute::string("region").required(),
                                Attribute::string("project_id"),
                            ],
                        )
                        .required(),
                        Attribute::object(
                            "bucket_security",
                            vec![
                                Attribute::string("authentication_method")
                                    .required()
                                    .one_of(AUTHENTICATION_METHODS),
                                Attribute::string("account_key")
                                    .write_only()
                                    .description("Service account key JSON."),
                            ],
                        ),
                        Attribute::object(
                            "encryption",
                            vec![
                                Attribute::string("encryption_type").one_of(ENCRYPTION_TYPES),
                                Attribute::string("encryption_key")
                                    .description("KMS key name."),
                            ],
                        ),
                    ],
                )
                .required(),
            ])
            .with_last_updated()
    }

    fn key(&self, model: &Self::Model) -> String {
        model.name.clone()
    }

    fn validate(&self, plan: &Self::Model) -> Result<(), CoreError> {
        match &plan.bucket_configuration.bucket_security {
            Some(s) if s.authentication_method == "accountKey" && s.account_key.is_none() => {
                Err(CoreError::validation(
                    "bucket_configuration.bucket_security.account_key",
                    "account_key is required when authentication_method is \"accountKey\"",
                ))
            }
            _ => Ok(()),
        }
    }

    async fn create(&self, client: &NexusClient, plan: &Self::Model) -> Result<Self::Model, CoreError> {
        client
            .create_blob_store("google", &plan.to_api())
            .await?
            .expect(&[200, 201, 204])?;
        Ok(plan.clone())
    }

    async fn read(
        &self,
        client: &NexusClient,
        state: &Self::Model,
    ) -> Result<Option<Self::Model>, CoreError> {
        let api: Option<GoogleBlobStore> =
            found(client.get_blob_store("google", &state.name).await?)?;
        Ok(api.map(|a| GoogleBlobStoreModel::from_api(&state.name, &a)))
    }

    async fn update(
        &self,
        client: &NexusClient,
        plan: &Self::Model,
        state: &Self::Model,
    ) -> Result<Self::Model, CoreError> {
        client
            .update_blob_store("google", &state.name, &plan.to_api())
            .await?
            .expect(&[200, 204])?;
        Ok(plan.clone())
    }

    async fn delete(&self, client: &NexusClient, state: &Self::Model) -> Result<(), CoreError> {
        super::delete_by_name(client, &state.name).await
    }

    fn import_model(&self, id: &str) -> Result<Self::Model, CoreError> {
        Ok(GoogleBlobStoreModel {
            name: id.to_owned(),
            ..GoogleBlobStoreModel::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn account_key_auth_needs_a_key() {
        let mut plan = GoogleBlobStoreModel {
            name: "gcs".into(),
            ..GoogleBlobStoreModel::default()
        };
        plan.bucket_configuration.bucket_security = Some(GoogleBucketSecurityModel {
            authentication_method: "accountKey".into(),
            account_key: None,
        });
        assert!(GoogleBlobStoreResource.validate(&plan).is_err());

        plan.bucket_configuration.bucket_security = Some(GoogleBucketSecurityModel {
            authentication_method: "applicationDefault".into(),
            account_key: None,
        });
        assert!(GoogleBlobStoreResource.validate(&plan).is_ok());
    }
}
