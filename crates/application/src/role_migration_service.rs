use std::sync::Arc;

use rbac_migrate_core::{AppError, AppResult, OrgId};
use rbac_migrate_domain::{Role, RoleIndex, RoleSpec};
use tracing::{debug, info};

use crate::Batches;
use crate::role_migration_ports::{
    MigrationPlan, RoleInsertStrategy, RoleMigrationConfig, RoleMigrationStore, RoleUidGenerator,
};

mod assignments;
mod migrate;
mod roles;
mod uid;


/// Application service creating managed roles and their bindings in bulk.
#[derive(Clone)]
pub struct RoleMigrationService {
    store: Arc<dyn RoleMigrationStore>,
    uid_generator: Arc<dyn RoleUidGenerator>,
    config: RoleMigrationConfig,
    insert_strategy: RoleInsertStrategy,
}

impl RoleMigrationService {
    /// Creates a new service from required dependencies.
    ///
    /// The role insert strategy is fixed here from the store's capability.
    #[must_use]
    pub fn new(
        store: Arc<dyn RoleMigrationStore>,
        uid_generator: Arc<dyn RoleUidGenerator>,
        config: RoleMigrationConfig,
    ) -> Self {
        let insert_strategy = RoleInsertStrategy::for_capability(store.supports_insert_returning());
        debug!(
            insert_strategy = insert_strategy.as_str(),
            batch_size = config.batch_size.get(),
            uid_attempts = config.uid_attempts.get(),
            "role migration service configured"
        );

        Self {
            store,
            uid_generator,
            config,
            insert_strategy,
        }
    }

    /// Returns the strategy used to create role batches.
    #[must_use]
    pub fn insert_strategy(&self) -> RoleInsertStrategy {
        self.insert_strategy
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> RoleMigrationConfig {
        self.config
    }
}
