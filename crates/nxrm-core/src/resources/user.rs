// Local users (source `default`).
//
// The server never returns passwords. Rotating one goes through the
// dedicated change-password endpoint, so an update that only touches the
// password skips the user PUT entirely.

use nxrm_api::NexusClient;
use nxrm_api::types::{CreateUserRequest, User};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CoreError;
use crate::lifecycle::{Resource, stamped, type_name};
use crate::resources::{found, keep_set_order};
use crate::schema::{Attribute, Schema};

pub const USER_SOURCE: &str = "default";
pub const USER_STATUSES: &[&str] = &["active", "locked", "disabled", "changepassword"];

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserModel {
    pub user_id: String,
    pub first_name: String,
    pub last_name: String,
    pub email_address: String,
    pub password: Option<String>,
    pub status: String,
    pub roles: Vec<String>,
    pub source: Option<String>,
    pub read_only: Option<bool>,
    pub last_updated: Option<String>,
}

stamped!(UserModel);

impl From<&User> for UserModel {
    fn from(api: &User) -> Self {
        Self {
            user_id: api.user_id.clone(),
            first_name: api.first_name.clone(),
            last_name: api.last_name.clone(),
            email_address: api.email_address.clone(),
            password: None,
            status: api.status.clone(),
            roles: api.roles.clone(),
            source: Some(api.source.clone()),
            read_only: Some(api.read_only),
            last_updated: None,
        }
    }
}

impl UserModel {
    fn to_create(&self) -> CreateUserRequest {
        CreateUserRequest {
            user_id: self.user_id.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email_address: self.email_address.clone(),
            password: self.password.clone().unwrap_or_default(),
            status: self.status.clone(),
            roles: self.roles.clone(),
        }
    }

    pub fn to_api(&self) -> User {
        User {
            user_id: self.user_id.clone(),
            first_name: self.first_name.clone(),
            last_name: self.last_name.clone(),
            email_address: self.email_address.clone(),
            source: USER_SOURCE.to_owned(),
            status: self.status.clone(),
            read_only: false,
            roles: self.roles.clone(),
            external_roles: Vec::new(),
        }
    }

    /// Same user apart from the password and bookkeeping fields.
    fn same_profile(&self, other: &Self) -> bool {
        self.user_id == other.user_id
            && self.first_name == other.first_name
            && self.last_name == other.last_name
            && self.email_address == other.email_address
            && self.status == other.status
            && self.roles == other.roles
    }
}

pub(crate) fn attributes() -> Vec<Attribute> {
    vec![
        Attribute::string("user_id")
            .required()
            .min_length(1)
            .requires_replace()
            .description("Login name."),
        Attribute::string("first_name").required(),
        Attribute::string("last_name").required(),
        Attribute::string("email_address").required().min_length(3),
        Attribute::string("password")
            .required()
            .write_only()
            .description("Initial password; later changes go through the change-password endpoint."),
        Attribute::string("status")
            .default("active")
            .one_of(USER_STATUSES),
        Attribute::string_set("roles")
            .default(serde_json::json!([]))
            .description("Role ids granted to the user."),
        Attribute::string("source")
            .computed()
            .use_state_for_unknown(),
        Attribute::bool("read_only").computed().use_state_for_unknown(),
    ]
}

pub struct UserResource;

impl Resource for UserResource {
    type Model = UserModel;

    fn type_name(&self) -> String {
        type_name("user")
    }

    fn schema(&self) -> Schema {
        Schema::new("Manage a local user.")
            .attributes(attributes())
            .with_last_updated()
    }

    fn key(&self, model: &Self::Model) -> String {
        model.user_id.clone()
    }

    async fn create(&self, client: &NexusClient, plan: &Self::Model) -> Result<Self::Model, CoreError> {
        client
            .create_user(&plan.to_create())
            .await?
            .expect(&[200, 201])?;
        Ok(UserModel {
            source: Some(USER_SOURCE.to_owned()),
            read_only: Some(false),
            ..plan.clone()
        })
    }

    async fn read(
        &self,
        client: &NexusClient,
        state: &Self::Model,
    ) -> Result<Option<Self::Model>, CoreError> {
        // The search matches by prefix; keep only the exact id.
        let users: Option<Vec<User>> =
            found(client.find_users(&state.user_id, USER_SOURCE).await?)?;
        let Some(user) = users
            .unwrap_or_default()
            .into_iter()
            .find(|u| u.user_id == state.user_id)
        else {
            return Ok(None);
        };
        let mut fresh = UserModel::from(&user);
        fresh.roles = keep_set_order(&state.roles, fresh.roles);
        Ok(Some(fresh))
    }

    async fn update(
        &self,
        client: &NexusClient,
        plan: &Self::Model,
        state: &Self::Model,
    ) -> Result<Self::Model, CoreError> {
        if plan.same_profile(state) {
            debug!(user_id = %state.user_id, "profile unchanged; skipping user PUT");
        } else {
            client
                .update_user(&state.user_id, &plan.to_api())
                .await?
                .expect(&[200, 204])?;
        }
        if let Some(password) = &plan.password {
            if plan.password != state.password {
                client
                    .change_user_password(&state.user_id, password.clone())
                    .await?
                    .expect(&[200, 204])?;
            }
        }
        Ok(UserModel {
            source: state.source.clone(),
            read_only: state.read_only,
            ..plan.clone()
        })
    }

    async fn delete(&self, client: &NexusClient, state: &Self::Model) -> Result<(), CoreError> {
        client
            .delete_user(&state.user_id)
            .await?
            .expect(&[200, 204])?;
        Ok(())
    }

    fn import_model(&self, id: &str) -> Result<Self::Model, CoreError> {
        Ok(UserModel {
            user_id: id.to_owned(),
            ..UserModel::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn alice() -> UserModel {
        UserModel {
            user_id: "alice".into(),
            first_name: "Alice".into(),
            last_name: "Liddell".into(),
            email_address: "alice@example.com".into(),
            password: Some("one".into()),
            status: "active".into(),
            roles: vec!["nx-admin".into()],
            ..UserModel::default()
        }
    }

    #[test]
    fn password_is_not_part_of_the_profile() {
        let state = alice();
        let plan = UserModel {
            password: Some("two".into()),
            last_updated: Some("later".into()),
            ..alice()
        };
        assert!(plan.same_profile(&state));

        let renamed = UserModel {
            first_name: "Alicia".into(),
            ..alice()
        };
        assert!(!renamed.same_profile(&state));
    }

    #[test]
    fn read_never_yields_a_password() {
        let api = alice().to_api();
        assert_eq!(UserModel::from(&api).password, None);
    }
}
