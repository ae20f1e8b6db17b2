// Cleanup policies: age / usage / release-type criteria applied by the
// cleanup task to repositories that reference the policy.

use nxrm_api::NexusClient;
use nxrm_api::types::CleanupPolicy;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::lifecycle::{Resource, stamped, type_name};
use crate::resources::found;
use crate::schema::{Attribute, Schema};

pub const CLEANUP_FORMATS: &[&str] = &[
    "ALL_FORMATS",
    "apt",
    "cargo",
    "cocoapods",
    "conan",
    "docker",
    "gitlfs",
    "go",
    "helm",
    "huggingface",
    "maven2",
    "npm",
    "nuget",
    "pypi",
    "r",
    "raw",
    "rubygems",
    "swift",
    "terraform",
    "yum",
];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupCriteriaModel {
    pub last_blob_updated: Option<i64>,
    pub last_downloaded: Option<i64>,
    pub release_type: Option<String>,
    pub asset_regex: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CleanupPolicyModel {
    pub name: String,
    pub notes: Option<String>,
    pub format: String,
    pub criteria: Option<CleanupCriteriaModel>,
    pub retain: Option<i64>,
    pub last_updated: Option<String>,
}

stamped!(CleanupPolicyModel);

impl From<&CleanupPolicy> for CleanupPolicyModel {
    fn from(api: &CleanupPolicy) -> Self {
        let criteria = CleanupCriteriaModel {
            last_blob_updated: api.criteria_last_blob_updated,
            last_downloaded: api.criteria_last_downloaded,
            release_type: api.criteria_release_type.clone(),
            asset_regex: api.criteria_asset_regex.clone(),
        };
        Self {
            name: api.name.clone(),
            notes: api.notes.clone(),
            format: api.format.clone(),
            criteria: (criteria != CleanupCriteriaModel::default()).then_some(criteria),
            retain: api.retain,
            last_updated: None,
        }
    }
}

impl CleanupPolicyModel {
    pub fn to_api(&self) -> CleanupPolicy {
        let criteria = self.criteria.clone().unwrap_or_default();
        CleanupPolicy {
            name: self.name.clone(),
            notes: self.notes.clone(),
            format: self.format.clone(),
            criteria_last_blob_updated: criteria.last_blob_updated,
            criteria_last_downloaded: criteria.last_downloaded,
            criteria_release_type: criteria.release_type,
            criteria_asset_regex: criteria.asset_regex,
            retain: self.retain,
        }
    }
}

pub(crate) fn attributes() -> Vec<Attribute> {
    vec![
        Attribute::string("name").required().min_length(1).requires_replace(),
        Attribute::string("notes"),
        Attribute::string("format")
            .required()
            .one_of(CLEANUP_FORMATS)
            .description("Repository format this policy applies to, or ALL_FORMATS."),
        Attribute::object(
            "criteria",
            vec![
                Attribute::int64("last_blob_updated")
                    .at_least(1)
                    .description("Remove components published more than this many days ago."),
                Attribute::int64("last_downloaded")
                    .at_least(1)
                    .description("Remove components not downloaded in this many days."),
                Attribute::string("release_type").one_of(&["RELEASES", "PRERELEASES"]),
                Attribute::string("asset_regex"),
            ],
        ),
        Attribute::int64("retain")
            .at_least(1)
            .description("Number of versions to keep (Pro, maven2 and docker only)."),
    ]
}

pub struct CleanupPolicyResource;

impl Resource for CleanupPolicyResource {
    type Model = CleanupPolicyModel;

    fn type_name(&self) -> String {
        type_name("cleanup_policy")
    }

    fn schema(&self) -> Schema {
        Schema::new("Manage a cleanup policy.")
            .attributes(attributes())
            .with_last_updated()
    }

    fn key(&self, model: &Self::Model) -> String {
        model.name.clone()
    }

    async fn create(&self, client: &NexusClient, plan: &Self::Model) -> Result<Self::Model, CoreError> {
        client
            .create_cleanup_policy(&plan.to_api())
            .await?
            .expect(&[200, 201, 204])?;
        Ok(plan.clone())
    }

    async fn read(
        &self,
        client: &NexusClient,
        state: &Self::Model,
    ) -> Result<Option<Self::Model>, CoreError> {
        let api: Option<CleanupPolicy> = found(client.get_cleanup_policy(&state.name).await?)?;
        Ok(api.map(|api| {
            let mut fresh = CleanupPolicyModel::from(&api);
            // An explicitly empty criteria block is indistinguishable on the wire.
            if fresh.criteria.is_none() && state.criteria == Some(CleanupCriteriaModel::default()) {
                fresh.criteria = state.criteria.clone();
            }
            fresh
        }))
    }

    async fn update(
        &self,
        client: &NexusClient,
        plan: &Self::Model,
        state: &Self::Model,
    ) -> Result<Self::Model, CoreError> {
        client
            .update_cleanup_policy(&state.name, &plan.to_api())
            .await?
            .expect(&[200, 204])?;
        Ok(plan.clone())
    }

    async fn delete(&self, client: &NexusClient, state: &Self::Model) -> Result<(), CoreError> {
        client
            .delete_cleanup_policy(&state.name)
            .await?
            .expect(&[200, 204])?;
        Ok(())
    }

    fn import_model(&self, id: &str) -> Result<Self::Model, CoreError> {
        Ok(CleanupPolicyModel {
            name: id.to_owned(),
            ..CleanupPolicyModel::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn criteria_block_absent_when_server_has_none() {
        let api = CleanupPolicy {
            name: "p".into(),
            format: "npm".into(),
            ..CleanupPolicy::default()
        };
        assert_eq!(CleanupPolicyModel::from(&api).criteria, None);
    }

    #[test]
    fn criteria_flatten_onto_wire() {
        let model = CleanupPolicyModel {
            name: "p".into(),
            format: "maven2".into(),
            criteria: Some(CleanupCriteriaModel {
                last_downloaded: Some(30),
                release_type: Some("PRERELEASES".into()),
                ..CleanupCriteriaModel::default()
            }),
            ..CleanupPolicyModel::default()
        };
        let api = model.to_api();
        assert_eq!(api.criteria_last_downloaded, Some(30));
        assert_eq!(api.criteria_release_type.as_deref(), Some("PRERELEASES"));
        assert_eq!(CleanupPolicyModel::from(&api).criteria, model.criteria);
    }
}
