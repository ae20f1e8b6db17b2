//! Read-only data sources, plus the registry the provider serves.
//!
//! List sources render every entity of a kind under a single computed
//! list attribute. Singleton sources reuse the matching resource's read
//! path and schema, minus write-only secrets and `last_updated`.

pub mod policy;
pub mod repository;
pub mod security;
pub mod system;

use std::sync::Arc;

use nxrm_api::NexusClient;
use serde_json::Value;

use crate::datasource::{DataSource, DataSourceEngine, DataSourceHandler};
use crate::error::CoreError;
use crate::lifecycle::Resource;
use crate::schema::{Schema, computed_view};

/// Exposes a singleton resource's current settings as a data source.
pub struct Singleton<R> {
    resource: R,
    description: &'static str,
}

impl<R: Resource> Singleton<R> {
    pub fn new(resource: R, description: &'static str) -> Self {
        Self {
            resource,
            description,
        }
    }
}

impl<R: Resource> DataSource for Singleton<R> {
    type Output = R::Model;

    fn type_name(&self) -> String {
        self.resource.type_name()
    }

    fn schema(&self) -> Schema {
        Schema::new(self.description)
            .attributes(computed_view(self.resource.schema().attributes))
    }

    async fn read(&self, client: &NexusClient, _config: &Value) -> Result<R::Model, CoreError> {
        // Singleton import seeds ignore the id.
        let seed = self.resource.import_model("")?;
        Ok(self.resource.read(client, &seed).await?.unwrap_or(seed))
    }
}

fn handler<D: DataSource>(source: D) -> Arc<dyn DataSourceHandler> {
    Arc::new(DataSourceEngine::new(source))
}

/// Every data source handler, in a stable order.
pub fn all_data_sources() -> Vec<Arc<dyn DataSourceHandler>> {
    vec![
        handler(repository::RepositoriesDataSource),
        handler(repository::BlobStoresDataSource),
        handler(policy::CleanupPoliciesDataSource),
        handler(policy::RoutingRulesDataSource),
        handler(security::ContentSelectorsDataSource),
        handler(security::PrivilegesDataSource),
        handler(security::RolesDataSource),
        handler(security::RoleDataSource),
        handler(security::UsersDataSource),
        handler(security::RealmsDataSource),
        handler(security::LdapServersDataSource),
        handler(system::CapabilitiesDataSource),
        handler(system::TasksDataSource),
        handler(system::license()),
        handler(system::mail()),
        handler(system::http()),
        handler(system::iq_connection()),
    ]
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;
    use crate::schema::LAST_UPDATED;

    #[test]
    fn names_are_unique_and_carry_no_timestamp() {
        let sources = all_data_sources();
        let names: HashSet<String> = sources.iter().map(|s| s.type_name()).collect();
        assert_eq!(names.len(), sources.len());
        assert!(names.contains("sonatyperepo_repositories"));
        assert!(names.contains("sonatyperepo_system_mail"));
        for source in &sources {
            assert!(source.schema().get(LAST_UPDATED).is_none(), "{}", source.type_name());
        }
    }

    #[test]
    fn singleton_schema_hides_secrets() {
        let mail = system::mail();
        let schema = DataSource::schema(&mail);
        assert!(schema.get("password").is_none());
        assert!(schema.attributes.iter().all(|a| a.computed));
    }
}
