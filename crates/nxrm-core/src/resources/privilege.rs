// Privileges: six types over one endpoint family.
//
// Every type shares `{name, description, type, read_only}`; the rest of
// the attribute set depends on the type. Create and update go to
// `v1/security/privileges/{type}`, read and delete address the privilege
// by name alone.

use nxrm_api::types::{PrivilegeRequest, PrivilegeResponse};
use nxrm_api::{ApiResponse, NexusClient, PrivilegeKind};
use serde::{Deserialize, Serialize};

use crate::dispatch::{Dispatcher, TypeDescriptor};
use crate::error::CoreError;
use crate::lifecycle::stamped;
use crate::resources::keep_set_order;
use crate::schema::Attribute;

pub const PRIVILEGE_ACTIONS: &[&str] = &["ADD", "ALL", "BROWSE", "DELETE", "EDIT", "READ"];
pub const SCRIPT_PRIVILEGE_ACTIONS: &[&str] = &["ADD", "BROWSE", "DELETE", "EDIT", "READ", "RUN"];

/// Formats accepted by repository-scoped privileges (`*` for all).
pub const PRIVILEGE_FORMATS: &[&str] = &[
    "*",
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

/// One state shape for every privilege type; keys a type does not own are
/// pruned from its state by the schema.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PrivilegeModel {
    pub name: String,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub privilege_type: Option<String>,
    pub read_only: Option<bool>,
    pub actions: Option<Vec<String>>,
    pub domain: Option<String>,
    pub format: Option<String>,
    pub repository: Option<String>,
    pub content_selector: Option<String>,
    pub script_name: Option<String>,
    pub pattern: Option<String>,
    pub last_updated: Option<String>,
}

stamped!(PrivilegeModel);

/// Type descriptor for one privilege type.
#[derive(Debug, Clone, Copy)]
pub struct PrivilegeDescriptor {
    kind: PrivilegeKind,
}

impl PrivilegeDescriptor {
    pub fn new(kind: PrivilegeKind) -> Self {
        Self { kind }
    }

    pub fn kind(&self) -> PrivilegeKind {
        self.kind
    }

    /// Body carrying only the fields this type owns.
    pub fn to_request(&self, model: &PrivilegeModel) -> PrivilegeRequest {
        let mut req = PrivilegeRequest {
            name: model.name.clone(),
            description: model.description.clone(),
            ..PrivilegeRequest::default()
        };
        match self.kind {
            PrivilegeKind::Application => {
                req.actions.clone_from(&model.actions);
                req.domain.clone_from(&model.domain);
            }
            PrivilegeKind::RepositoryAdmin | PrivilegeKind::RepositoryView => {
                req.actions.clone_from(&model.actions);
                req.format.clone_from(&model.format);
                req.repository.clone_from(&model.repository);
            }
            PrivilegeKind::RepositoryContentSelector => {
                req.actions.clone_from(&model.actions);
                req.format.clone_from(&model.format);
                req.repository.clone_from(&model.repository);
                req.content_selector.clone_from(&model.content_selector);
            }
            PrivilegeKind::Script => {
                req.actions.clone_from(&model.actions);
                req.script_name.clone_from(&model.script_name);
            }
            PrivilegeKind::Wildcard => {
                req.pattern.clone_from(&model.pattern);
            }
        }
        req
    }

    fn actions_attribute(&self) -> Attribute {
        let allowed = if self.kind == PrivilegeKind::Script {
            SCRIPT_PRIVILEGE_ACTIONS
        } else {
            PRIVILEGE_ACTIONS
        };
        Attribute::string_set("actions")
            .required()
            .min_size(1)
            .each_one_of(allowed)
            .description("Actions this privilege grants.")
    }

    fn repository_attributes() -> Vec<Attribute> {
        vec![
            Attribute::string("format")
                .required()
                .one_of(PRIVILEGE_FORMATS)
                .description("Repository format, or * for every format."),
            Attribute::string("repository")
                .required()
                .min_length(1)
                .description("Repository name, or * for every repository of the format."),
        ]
    }
}

impl TypeDescriptor for PrivilegeDescriptor {
    type Model = PrivilegeModel;
    type Api = PrivilegeResponse;

    fn resource_name(&self) -> String {
        format!("privilege_{}", self.kind.as_str().replace('-', "_"))
    }

    fn description(&self) -> String {
        format!("Manage a privilege of type {}.", self.kind)
    }

    fn base_attributes(&self) -> Vec<Attribute> {
        vec![
            Attribute::string("name")
                .required()
                .min_length(1)
                .requires_replace(),
            Attribute::string("description"),
            Attribute::string("type")
                .computed()
                .use_state_for_unknown()
                .description("Privilege type as reported by the server."),
            Attribute::bool("read_only").computed().use_state_for_unknown(),
        ]
    }

    fn schema_fragment(&self) -> Vec<Attribute> {
        match self.kind {
            PrivilegeKind::Application => vec![
                self.actions_attribute(),
                Attribute::string("domain")
                    .required()
                    .min_length(1)
                    .description("Application domain, e.g. users or blobstores."),
            ],
            PrivilegeKind::RepositoryAdmin | PrivilegeKind::RepositoryView => {
                let mut attrs = vec![self.actions_attribute()];
                attrs.extend(Self::repository_attributes());
                attrs
            }
            PrivilegeKind::RepositoryContentSelector => {
                let mut attrs = vec![self.actions_attribute()];
                attrs.extend(Self::repository_attributes());
                attrs.push(
                    Attribute::string("content_selector")
                        .required()
                        .min_length(1)
                        .description("Name of the content selector this privilege is scoped to."),
                );
                attrs
            }
            PrivilegeKind::Script => vec![
                self.actions_attribute(),
                Attribute::string("script_name").required().min_length(1),
            ],
            PrivilegeKind::Wildcard => vec![
                Attribute::string("pattern")
                    .required()
                    .min_length(1)
                    .description("Shiro permission string, e.g. nexus:*."),
            ],
        }
    }

    fn key(&self, model: &Self::Model) -> String {
        model.name.clone()
    }

    async fn do_create(
        &self,
        client: &NexusClient,
        plan: &Self::Model,
    ) -> Result<ApiResponse, nxrm_api::Error> {
        client
            .create_privilege(self.kind, &self.to_request(plan))
            .await
    }

    async fn do_read(
        &self,
        client: &NexusClient,
        state: &Self::Model,
    ) -> Result<ApiResponse, nxrm_api::Error> {
        client.get_privilege(&state.name).await
    }

    async fn do_update(
        &self,
        client: &NexusClient,
        plan: &Self::Model,
        state: &Self::Model,
    ) -> Result<ApiResponse, nxrm_api::Error> {
        client
            .update_privilege(self.kind, &state.name, &self.to_request(plan))
            .await
    }

    async fn do_delete(
        &self,
        client: &NexusClient,
        state: &Self::Model,
    ) -> Result<ApiResponse, nxrm_api::Error> {
        client.delete_privilege(&state.name).await
    }

    fn create_success_codes(&self) -> &'static [u16] {
        &[200, 201]
    }

    fn update_success_codes(&self) -> &'static [u16] {
        &[204]
    }

    fn delete_success_codes(&self) -> &'static [u16] {
        &[204]
    }

    fn apply_create_response(
        &self,
        model: &mut Self::Model,
        _response: &ApiResponse,
    ) -> Result<(), CoreError> {
        model.privilege_type = Some(self.kind.as_str().to_owned());
        model.read_only = Some(false);
        Ok(())
    }

    fn carry_over(&self, plan: &mut Self::Model, state: &Self::Model) {
        plan.privilege_type = Some(self.kind.as_str().to_owned());
        plan.read_only = state.read_only.or(Some(false));
    }

    fn update_state_from_api(
        &self,
        model: &mut Self::Model,
        api: &Self::Api,
    ) -> Result<(), CoreError> {
        if api.privilege_type != self.kind.as_str() {
            return Err(CoreError::ContractViolation(format!(
                "privilege {:?} has type {:?}, expected {:?}",
                api.name, api.privilege_type, self.kind.as_str()
            )));
        }
        model.name.clone_from(&api.name);
        model.description.clone_from(&api.description);
        model.privilege_type = Some(api.privilege_type.clone());
        model.read_only = Some(api.read_only);
        model.actions = api
            .actions
            .clone()
            .map(|fresh| keep_set_order(model.actions.as_deref().unwrap_or_default(), fresh));
        model.domain.clone_from(&api.domain);
        model.format.clone_from(&api.format);
        model.repository.clone_from(&api.repository);
        model.content_selector.clone_from(&api.content_selector);
        model.script_name.clone_from(&api.script_name);
        model.pattern.clone_from(&api.pattern);
        Ok(())
    }

    fn import_model(&self, id: &str) -> Result<Self::Model, CoreError> {
        Ok(PrivilegeModel {
            name: id.to_owned(),
            ..PrivilegeModel::default()
        })
    }

    fn is_deprecated(&self) -> bool {
        self.kind == PrivilegeKind::Script
    }
}

/// Dispatchers for every privilege type.
pub fn privilege_resources() -> Vec<Dispatcher<PrivilegeDescriptor>> {
    PrivilegeKind::ALL
        .into_iter()
        .map(|kind| Dispatcher::new(PrivilegeDescriptor::new(kind)))
        .collect()
}
