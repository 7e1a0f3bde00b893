use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use tokio::sync::Mutex;
use tracing::{debug, info};

use rbac_migrate_application::RoleMigrationStore;
use rbac_migrate_core::{AppError, AppResult, OrgId};
use rbac_migrate_domain::{BuiltinRoleBinding, NewRole, Role, TeamRoleBinding, UserRoleBinding};

use crate::role_rows::{ROLE_COLUMNS, RoleRow, map_storage_error};

mod bindings;
mod roles;


/// PostgreSQL-backed role migration store running on one transaction.
///
/// PostgreSQL returns inserted rows, so role batches are written and read
/// back in a single statement.
pub struct PostgresRoleMigrationStore {
    transaction: Mutex<Transaction<'static, Postgres>>,
}

impl PostgresRoleMigrationStore {
    /// Opens the migration transaction on the provided pool.
    pub async fn begin(pool: &PgPool) -> AppResult<Self> {
        let transaction = pool
            .begin()
            .await
            .map_err(|error| AppError::Storage(format!("failed to begin transaction: {error}")))?;

        debug!(dialect = "postgres", "role migration transaction opened");
        Ok(Self {
            transaction: Mutex::new(transaction),
        })
    }

    /// Commits everything written through this store.
    pub async fn commit(self) -> AppResult<()> {
        self.transaction
            .into_inner()
            .commit()
            .await
            .map_err(|error| AppError::Storage(format!("failed to commit transaction: {error}")))?;

        info!(dialect = "postgres", "role migration transaction committed");
        Ok(())
    }

    /// Discards everything written through this store.
    pub async fn rollback(self) -> AppResult<()> {
        self.transaction
            .into_inner()
            .rollback()
            .await
            .map_err(|error| {
                AppError::Storage(format!("failed to roll back transaction: {error}"))
            })?;

        info!(dialect = "postgres", "role migration transaction rolled back");
        Ok(())
    }
}

#[async_trait]
impl RoleMigrationStore for PostgresRoleMigrationStore {
    fn supports_insert_returning(&self) -> bool {
        true
    }

    async fn role_uid_exists(&self, org_id: OrgId, uid: &str) -> AppResult<bool> {
        self.role_uid_exists_impl(org_id, uid).await
    }

    async fn find_role(&self, org_id: OrgId, name: &str) -> AppResult<Option<Role>> {
        self.find_role_impl(org_id, name).await
    }

    async fn find_roles_by_names(&self, org_id: OrgId, names: &[String]) -> AppResult<Vec<Role>> {
        self.find_roles_by_names_impl(org_id, names).await
    }

    async fn insert_roles_returning(&self, roles: &[NewRole]) -> AppResult<Vec<Role>> {
        self.insert_roles_returning_impl(roles).await
    }

    async fn insert_roles(&self, roles: &[NewRole]) -> AppResult<()> {
        self.insert_roles_impl(roles).await
    }

    async fn find_roles_by_uids(&self, roles: &[NewRole]) -> AppResult<Vec<Role>> {
        self.find_roles_by_uids_impl(roles).await
    }

    async fn insert_user_roles(&self, bindings: &[UserRoleBinding]) -> AppResult<()> {
        self.insert_user_roles_impl(bindings).await
    }

    async fn insert_team_roles(&self, bindings: &[TeamRoleBinding]) -> AppResult<()> {
        self.insert_team_roles_impl(bindings).await
    }

    async fn insert_builtin_roles(&self, bindings: &[BuiltinRoleBinding]) -> AppResult<()> {
        self.insert_builtin_roles_impl(bindings).await
    }
}

fn role_insert_builder(roles: &[NewRole]) -> QueryBuilder<'_, Postgres> {
    let mut builder: QueryBuilder<'_, Postgres> =
        QueryBuilder::new("INSERT INTO role (org_id, uid, name, version, created, updated) ");
    builder.push_values(roles, |mut row, role| {
        row.push_bind(role.org_id.as_i64())
            .push_bind(role.uid.as_str())
            .push_bind(role.name.as_str())
            .push_bind(role.version)
            .push_bind(role.created)
            .push_bind(role.updated);
    });
    builder
}
