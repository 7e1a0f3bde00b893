//! Application services and ports for bulk role provisioning.

#![forbid(unsafe_code)]

mod batch;
mod random_role_uid_generator;
mod role_migration_ports;
mod role_migration_service;

pub use batch::Batches;
pub use random_role_uid_generator::{ROLE_UID_LENGTH, RandomRoleUidGenerator};
pub use role_migration_ports::{
    MigrationPlan, RoleInsertStrategy, RoleMigrationConfig, RoleMigrationStore, RoleUidGenerator,
};
pub use role_migration_service::RoleMigrationService;
