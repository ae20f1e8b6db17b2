//! Every managed resource kind, plus the registry the provider serves.

pub mod blob_store;
pub mod capability;
pub mod cleanup_policy;
pub mod content_selector;
pub mod ldap;
pub mod privilege;
pub mod repository;
pub mod role;
pub mod routing_rule;
pub mod security_settings;
pub mod system;
pub mod task;
pub mod user;

use std::sync::Arc;

use nxrm_api::ApiResponse;
use serde::de::DeserializeOwned;

use crate::error::CoreError;
use crate::lifecycle::{Engine, ResourceHandler};

/// Decode a GET response, mapping 404 to `None`.
pub(crate) fn found<T: DeserializeOwned>(resp: ApiResponse) -> Result<Option<T>, CoreError> {
    if resp.is_not_found() {
        return Ok(None);
    }
    Ok(Some(resp.expect(&[200])?.json()?))
}

/// Sets come back from the server in arbitrary order. Keep the prior
/// ordering when the membership is unchanged so reads produce no diff.
pub(crate) fn keep_set_order(prior: &[String], fresh: Vec<String>) -> Vec<String> {
    if prior.len() != fresh.len() {
        return fresh;
    }
    let mut a = prior.to_vec();
    let mut b = fresh.clone();
    a.sort_unstable();
    b.sort_unstable();
    if a == b { prior.to_vec() } else { fresh }
}

/// Every resource handler, in a stable order.
pub fn all_handlers() -> Vec<Arc<dyn ResourceHandler>> {
    let mut handlers: Vec<Arc<dyn ResourceHandler>> = Vec::new();

    handlers.extend(repository::repository_handlers());
    handlers.extend(blob_store::blob_store_handlers());
    handlers.push(Arc::new(Engine::new(cleanup_policy::CleanupPolicyResource)));
    handlers.push(Arc::new(Engine::new(routing_rule::RoutingRuleResource)));
    handlers.push(Arc::new(Engine::new(content_selector::ContentSelectorResource)));

    handlers.extend(
        privilege::privilege_resources()
            .into_iter()
            .map(|d| Arc::new(Engine::new(d)) as Arc<dyn ResourceHandler>),
    );
    handlers.push(Arc::new(Engine::new(role::RoleResource)));
    handlers.push(Arc::new(Engine::new(user::UserResource)));
    handlers.push(Arc::new(Engine::new(ldap::LdapServerResource)));

    handlers.push(Arc::new(Engine::new(security_settings::AnonymousAccessResource)));
    handlers.push(Arc::new(Engine::new(security_settings::UserTokenResource)));
    handlers.push(Arc::new(Engine::new(security_settings::RealmsResource)));
    handlers.push(Arc::new(Engine::new(security_settings::SamlResource)));

    handlers.push(Arc::new(Engine::new(system::MailResource)));
    handlers.push(Arc::new(Engine::new(system::HttpSystemResource)));
    handlers.push(Arc::new(Engine::new(system::IqConnectionResource)));
    handlers.push(Arc::new(Engine::new(system::LicenseResource)));

    handlers.extend(capability::capability_handlers());
    handlers.extend(task::task_handlers());
    handlers
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| (*s).to_owned()).collect()
    }

    #[test]
    fn same_members_keep_prior_order() {
        let prior = strings(&["nx-admin", "nx-anonymous"]);
        let fresh = strings(&["nx-anonymous", "nx-admin"]);
        assert_eq!(keep_set_order(&prior, fresh), prior);
    }

    #[test]
    fn changed_members_take_server_order() {
        let prior = strings(&["a", "b"]);
        let fresh = strings(&["c", "a"]);
        assert_eq!(keep_set_order(&prior, fresh.clone()), fresh);
    }

    #[test]
    fn type_names_are_unique_and_prefixed() {
        let handlers = all_handlers();
        let names: HashSet<String> = handlers.iter().map(|h| h.type_name()).collect();
        assert_eq!(names.len(), handlers.len());
        assert!(names.iter().all(|n| n.starts_with("sonatyperepo_")));
        for expected in [
            "sonatyperepo_repository_npm_hosted",
            "sonatyperepo_blob_store_s3",
            "sonatyperepo_privilege_application",
            "sonatyperepo_capability_ui_branding",
            "sonatyperepo_security_realms",
            "sonatyperepo_system_license",
        ] {
            assert!(names.contains(expected), "missing {expected}");
        }
    }
}
