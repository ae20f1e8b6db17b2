//! Repositories: one resource type per supported `{format, kind}` pair.
//!
//! All of them share [`RepositoryModel`]; the schema built for each pair
//! decides which blocks exist. Proxy repositories additionally carry a
//! `repository_firewall` block that is backed by capabilities rather than
//! by the repository document itself.

pub mod firewall;
pub mod format;
pub mod model;
pub(crate) mod schema;

use std::sync::Arc;

use nxrm_api::{ApiResponse, NexusClient};
use nxrm_api::types::RepositoryResponse;

use crate::error::CoreError;
use crate::lifecycle::{Engine, Resource, ResourceHandler, type_name};
use crate::resources::found;
use crate::schema::Schema;

pub use format::{Format, FormatBlock, RepositoryKind, matrix};
pub use model::RepositoryModel;

pub struct RepositoryResource {
    format: Format,
    kind: RepositoryKind,
}

impl RepositoryResource {
    pub fn new(format: Format, kind: RepositoryKind) -> Self {
        Self { format, kind }
    }

    pub fn format(&self) -> Format {
        self.format
    }

    pub fn kind(&self) -> RepositoryKind {
        self.kind
    }

    async fn send(
        &self,
        client: &NexusClient,
        plan: &RepositoryModel,
        existing: Option<&str>,
    ) -> Result<ApiResponse, nxrm_api::Error> {
        let segment = self.format.path_segment();
        let kind = self.kind.as_ref();
        match (self.kind, existing) {
            (RepositoryKind::Hosted, None) => {
                client.create_repository(segment, kind, &plan.to_hosted(self.format)).await
            }
            (RepositoryKind::Hosted, Some(name)) => {
                client
                    .update_repository(segment, kind, name, &plan.to_hosted(self.format))
                    .await
            }
            (RepositoryKind::Proxy, None) => {
                client.create_repository(segment, kind, &plan.to_proxy(self.format)).await
            }
            (RepositoryKind::Proxy, Some(name)) => {
                client
                    .update_repository(segment, kind, name, &plan.to_proxy(self.format))
                    .await
            }
            (RepositoryKind::Group, None) => {
                client.create_repository(segment, kind, &plan.to_group(self.format)).await
            }
            (RepositoryKind::Group, Some(name)) => {
                client
                    .update_repository(segment, kind, name, &plan.to_group(self.format))
                    .await
            }
        }
    }

    fn check_authentication(plan: &RepositoryModel) -> Result<(), CoreError> {
        let Some(auth) = plan
            .http_client
            .as_ref()
            .and_then(|h| h.authentication.as_ref())
        else {
            return Ok(());
        };
        let attr = "http_client.authentication";
        match auth.auth_type.as_str() {
            "username" if auth.username.is_none() => Err(CoreError::validation(
                format!("{attr}.username"),
                "username is required when type is \"username\"",
            )),
            "ntlm" if auth.ntlm_host.is_none() || auth.ntlm_domain.is_none() => {
                Err(CoreError::validation(
                    attr,
                    "ntlm_host and ntlm_domain are required when type is \"ntlm\"",
                ))
            }
            "bearerToken" if auth.bearer_token.is_none() => Err(CoreError::validation(
                format!("{attr}.bearer_token"),
                "bearer_token is required when type is \"bearerToken\"",
            )),
            _ => Ok(()),
        }
    }
}

impl Resource for RepositoryResource {
    type Model = RepositoryModel;

    fn type_name(&self) -> String {
        type_name(&format!("repository_{}_{}", self.format.slug(), self.kind))
    }

    fn schema(&self) -> Schema {
        Schema::new(format!("Manage a {} {} repository.", self.format, self.kind))
            .attributes(schema::attributes(self.format, self.kind))
            .with_last_updated()
    }

    fn key(&self, model: &Self::Model) -> String {
        model.name.clone()
    }

    fn validate(&self, plan: &Self::Model) -> Result<(), CoreError> {
        if let Some(fw) = &plan.repository_firewall {
            fw.check()?;
        }
        if let Some(group) = &plan.group {
            if let Some(writable) = &group.writable_member {
                if !group.member_names.contains(writable) {
                    return Err(CoreError::validation(
                        "group.writable_member",
                        format!("{writable:?} is not one of member_names"),
                    ));
                }
            }
        }
        Self::check_authentication(plan)
    }

    async fn create(&self, client: &NexusClient, plan: &Self::Model) -> Result<Self::Model, CoreError> {
        self.send(client, plan, None).await?.expect(&[200, 201])?;
        if self.kind == RepositoryKind::Proxy && plan.repository_firewall.is_some() {
            firewall::apply(client, &plan.name, plan.repository_firewall.as_ref()).await?;
        }
        Ok(plan.clone())
    }

    async fn read(
        &self,
        client: &NexusClient,
        state: &Self::Model,
    ) -> Result<Option<Self::Model>, CoreError> {
        let api: Option<RepositoryResponse> = found(
            client
                .get_repository(self.format.path_segment(), self.kind.as_ref(), &state.name)
                .await?,
        )?;
        let Some(api) = api else {
            return Ok(None);
        };
        let mut fresh = RepositoryModel::from(&api);
        fresh.keep_empty_blocks(state);
        // The capability lookup is a second round trip; only pay for it when
        // the block is under management.
        if self.kind == RepositoryKind::Proxy && state.repository_firewall.is_some() {
            fresh.repository_firewall = Some(
                firewall::read(client, &fresh.name)
                    .await?
                    .unwrap_or_default(),
            );
        }
        Ok(Some(fresh))
    }

    async fn update(
        &self,
        client: &NexusClient,
        plan: &Self::Model,
        state: &Self::Model,
    ) -> Result<Self::Model, CoreError> {
        self.send(client, plan, Some(&state.name))
            .await?
            .expect(&[200, 204])?;
        if self.kind == RepositoryKind::Proxy && plan.repository_firewall != state.repository_firewall
        {
            firewall::apply(client, &plan.name, plan.repository_firewall.as_ref()).await?;
        }
        Ok(Self::Model {
            url: plan.url.clone().or_else(|| state.url.clone()),
            ..plan.clone()
        })
    }

    async fn delete(&self, client: &NexusClient, state: &Self::Model) -> Result<(), CoreError> {
        client
            .delete_repository(&state.name)
            .await?
            .expect(&[200, 204])?;
        if self.kind == RepositoryKind::Proxy
            && state.repository_firewall.as_ref().is_some_and(|f| f.enabled || f.pccs_enabled)
        {
            firewall::apply(client, &state.name, None).await?;
        }
        Ok(())
    }

    fn import_model(&self, id: &str) -> Result<Self::Model, CoreError> {
        Ok(RepositoryModel {
            name: id.to_owned(),
            ..RepositoryModel::default()
        })
    }
}

/// One handler per supported `{format, kind}` pair.
pub fn repository_handlers() -> Vec<Arc<dyn ResourceHandler>> {
    matrix()
        .into_iter()
        .map(|(format, kind)| {
            Arc::new(Engine::new(RepositoryResource::new(format, kind))) as Arc<dyn ResourceHandler>
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::resources::repository::model::{AuthenticationModel, GroupModel, HttpClientModel};

    #[test]
    fn type_names_follow_format_slug() {
        let r = RepositoryResource::new(Format::GitLfs, RepositoryKind::Hosted);
        assert_eq!(r.type_name(), "sonatyperepo_repository_git_lfs_hosted");
        let r = RepositoryResource::new(Format::Maven, RepositoryKind::Group);
        assert_eq!(r.type_name(), "sonatyperepo_repository_maven_group");
    }

    #[test]
    fn writable_member_must_be_a_member() {
        let r = RepositoryResource::new(Format::Npm, RepositoryKind::Group);
        let mut plan = RepositoryModel {
            name: "npm-all".into(),
            group: Some(GroupModel {
                member_names: vec!["npm-hosted".into()],
                writable_member: Some("npm-other".into()),
            }),
            ..RepositoryModel::default()
        };
        assert!(r.validate(&plan).is_err());
        plan.group.as_mut().unwrap().writable_member = Some("npm-hosted".into());
        assert!(r.validate(&plan).is_ok());
    }

    #[test]
    fn bearer_auth_needs_a_token() {
        let r = RepositoryResource::new(Format::Raw, RepositoryKind::Proxy);
        let plan = RepositoryModel {
            name: "raw-remote".into(),
            http_client: Some(HttpClientModel {
                authentication: Some(AuthenticationModel {
                    auth_type: "bearerToken".into(),
                    ..AuthenticationModel::default()
                }),
                ..HttpClientModel::default()
            }),
            ..RepositoryModel::default()
        };
        let err = r.validate(&plan).unwrap_err();
        assert!(err.to_string().contains("bearer_token"));
    }

    #[test]
    fn every_pair_gets_a_handler() {
        let handlers = repository_handlers();
        assert_eq!(handlers.len(), matrix().len());
        assert!(
            handlers
                .iter()
                .any(|h| h.type_name() == "sonatyperepo_repository_docker_proxy")
        );
    }
}
