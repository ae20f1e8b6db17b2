// Roles: named bundles of privileges and other roles.

use nxrm_api::NexusClient;
use nxrm_api::types::Role;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::lifecycle::{Resource, stamped, type_name};
use crate::resources::{found, keep_set_order};
use crate::schema::{Attribute, Schema};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleModel {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub privileges: Vec<String>,
    pub roles: Vec<String>,
    pub last_updated: Option<String>,
}

stamped!(RoleModel);

impl From<&Role> for RoleModel {
    fn from(api: &Role) -> Self {
        Self {
            id: api.id.clone(),
            name: api.name.clone(),
            description: api.description.clone(),
            privileges: api.privileges.clone(),
            roles: api.roles.clone(),
            last_updated: None,
        }
    }
}

impl RoleModel {
    pub fn to_api(&self) -> Role {
        Role {
            id: self.id.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            privileges: self.privileges.clone(),
            roles: self.roles.clone(),
            source: None,
            read_only: None,
        }
    }
}

pub(crate) fn attributes() -> Vec<Attribute> {
    vec![
        Attribute::string("id")
            .required()
            .min_length(1)
            .requires_replace()
            .description("Role id; immutable once created."),
        Attribute::string("name").required().min_length(1),
        Attribute::string("description"),
        Attribute::string_set("privileges")
            .default(serde_json::json!([]))
            .description("Names of privileges granted by this role."),
        Attribute::string_set("roles")
            .default(serde_json::json!([]))
            .description("Ids of roles contained in this role."),
    ]
}

pub struct RoleResource;

impl Resource for RoleResource {
    type Model = RoleModel;

    fn type_name(&self) -> String {
        type_name("role")
    }

    fn schema(&self) -> Schema {
        Schema::new("Manage a security role.")
            .attributes(attributes())
            .with_last_updated()
    }

    fn key(&self, model: &Self::Model) -> String {
        model.id.clone()
    }

    async fn create(&self, client: &NexusClient, plan: &Self::Model) -> Result<Self::Model, CoreError> {
        client
            .create_role(&plan.to_api())
            .await?
            .expect(&[200, 201])?;
        Ok(plan.clone())
    }

    async fn read(
        &self,
        client: &NexusClient,
        state: &Self::Model,
    ) -> Result<Option<Self::Model>, CoreError> {
        let api: Option<Role> = found(client.get_role(&state.id).await?)?;
        Ok(api.map(|role| {
            let mut fresh = RoleModel::from(&role);
            fresh.privileges = keep_set_order(&state.privileges, fresh.privileges);
            fresh.roles = keep_set_order(&state.roles, fresh.roles);
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
            .update_role(&state.id, &plan.to_api())
            .await?
            .expect(&[200, 204])?;
        Ok(plan.clone())
    }

    async fn delete(&self, client: &NexusClient, state: &Self::Model) -> Result<(), CoreError> {
        client.delete_role(&state.id).await?.expect(&[200, 204])?;
        Ok(())
    }

    fn import_model(&self, id: &str) -> Result<Self::Model, CoreError> {
        Ok(RoleModel {
            id: id.to_owned(),
            ..RoleModel::default()
        })
    }
}
