//! Infrastructure adapters for application ports.

#![forbid(unsafe_code)]

mod in_memory_role_migration_store;
mod mysql_role_migration_store;
mod postgres_role_migration_store;
mod role_rows;

pub use in_memory_role_migration_store::InMemoryRoleMigrationStore;
pub use mysql_role_migration_store::MySqlRoleMigrationStore;
pub use postgres_role_migration_store::PostgresRoleMigrationStore;
