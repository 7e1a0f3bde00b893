use async_trait::async_trait;
use sqlx::{MySql, MySqlPool, QueryBuilder, Transaction};
use tokio::sync::Mutex;
use tracing::{debug, info};

use rbac_migrate_application::RoleMigrationStore;
use rbac_migrate_core::{AppError, AppResult, OrgId};
use rbac_migrate_domain::{BuiltinRoleBinding, NewRole, Role, TeamRoleBinding, UserRoleBinding};

use crate::role_rows::{ROLE_COLUMNS, RoleRow, map_storage_error};


/// MySQL-backed role migration store running on one transaction.
///
/// MySQL cannot return rows from a multi-row insert, so created roles are
/// read back by `(org_id, uid)` after each batch.
pub struct MySqlRoleMigrationStore {
    transaction: Mutex<Transaction<'static, MySql>>,
}

impl MySqlRoleMigrationStore {
    /// Opens the migration transaction on the provided pool.
    pub async fn begin(pool: &MySqlPool) -> AppResult<Self> {
        let transaction = pool
            .begin()
            .await
            .map_err(|error| AppError::Storage(format!("failed to begin transaction: {error}")))?;

        debug!(dialect = "mysql", "role migration transaction opened");
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

        info!(dialect = "mysql", "role migration transaction committed");
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

        info!(dialect = "mysql", "role migration transaction rolled back");
        Ok(())
    }

    async fn execute(&self, mut builder: QueryBuilder<'_, MySql>, action: &str) -> AppResult<()> {
        let mut transaction = self.transaction.lock().await;
        builder
            .build()
            .execute(&mut **transaction)
            .await
            .map_err(|error| map_storage_error(error, action))?;

        Ok(())
    }

    async fn fetch_roles(
        &self,
        mut builder: QueryBuilder<'_, MySql>,
        action: &str,
    ) -> AppResult<Vec<Role>> {
        let mut transaction = self.transaction.lock().await;
        let rows = builder
            .build_query_as::<RoleRow>()
            .fetch_all(&mut **transaction)
            .await
            .map_err(|error| map_storage_error(error, action))?;

        Ok(rows.into_iter().map(Role::from).collect())
    }
}

#[async_trait]
impl RoleMigrationStore for MySqlRoleMigrationStore {
    fn supports_insert_returning(&self) -> bool {
        false
    }

    async fn role_uid_exists(&self, org_id: OrgId, uid: &str) -> AppResult<bool> {
        let mut transaction = self.transaction.lock().await;

        let matches = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT COUNT(*)
            FROM role
            WHERE org_id = ? AND uid = ?
            "#,
        )
        .bind(org_id.as_i64())
        .bind(uid)
        .fetch_one(&mut **transaction)
        .await
        .map_err(|error| map_storage_error(error, "check role uid"))?;

        Ok(matches > 0)
    }

    async fn find_role(&self, org_id: OrgId, name: &str) -> AppResult<Option<Role>> {
        let mut transaction = self.transaction.lock().await;

        let row = sqlx::query_as::<_, RoleRow>(&format!(
            "SELECT {ROLE_COLUMNS} FROM role WHERE org_id = ? AND name = ? LIMIT 1"
        ))
        .bind(org_id.as_i64())
        .bind(name)
        .fetch_optional(&mut **transaction)
        .await
        .map_err(|error| map_storage_error(error, "find role"))?;

        Ok(row.map(Role::from))
    }

    async fn find_roles_by_names(&self, org_id: OrgId, names: &[String]) -> AppResult<Vec<Role>> {
        if names.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<'_, MySql> = QueryBuilder::new("SELECT ");
        builder.push(ROLE_COLUMNS);
        builder.push(" FROM role WHERE org_id = ");
        builder.push_bind(org_id.as_i64());
        builder.push(" AND name IN (");
        let mut separated = builder.separated(", ");
        for name in names {
            separated.push_bind(name.as_str());
        }
        separated.push_unseparated(")");

        self.fetch_roles(builder, "list roles by name").await
    }

    async fn insert_roles(&self, roles: &[NewRole]) -> AppResult<()> {
        if roles.is_empty() {
            return Ok(());
        }

        let mut builder: QueryBuilder<'_, MySql> =
            QueryBuilder::new("INSERT INTO role (org_id, uid, name, version, created, updated) ");
        builder.push_values(roles, |mut row, role| {
            row.push_bind(role.org_id.as_i64())
                .push_bind(role.uid.as_str())
                .push_bind(role.name.as_str())
                .push_bind(role.version)
                .push_bind(role.created)
                .push_bind(role.updated);
        });

        self.execute(builder, "insert roles").await
    }

    async fn find_roles_by_uids(&self, roles: &[NewRole]) -> AppResult<Vec<Role>> {
        if roles.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<'_, MySql> = QueryBuilder::new("SELECT ");
        builder.push(ROLE_COLUMNS);
        builder.push(" FROM role WHERE ");
        let mut separated = builder.separated(" OR ");
        for role in roles {
            separated.push("(org_id = ");
            separated.push_bind_unseparated(role.org_id.as_i64());
            separated.push_unseparated(" AND uid = ");
            separated.push_bind_unseparated(role.uid.as_str());
            separated.push_unseparated(")");
        }

        self.fetch_roles(builder, "list roles by uid").await
    }

    async fn insert_user_roles(&self, bindings: &[UserRoleBinding]) -> AppResult<()> {
        if bindings.is_empty() {
            return Ok(());
        }

        let mut builder: QueryBuilder<'_, MySql> =
            QueryBuilder::new("INSERT INTO user_role (org_id, role_id, user_id, created) ");
        builder.push_values(bindings, |mut row, binding| {
            row.push_bind(binding.org_id.as_i64())
                .push_bind(binding.role_id)
                .push_bind(binding.user_id)
                .push_bind(binding.created);
        });

        self.execute(builder, "insert user role bindings").await
    }

    async fn insert_team_roles(&self, bindings: &[TeamRoleBinding]) -> AppResult<()> {
        if bindings.is_empty() {
            return Ok(());
        }

        let mut builder: QueryBuilder<'_, MySql> =
            QueryBuilder::new("INSERT INTO team_role (org_id, role_id, team_id, created) ");
        builder.push_values(bindings, |mut row, binding| {
            row.push_bind(binding.org_id.as_i64())
                .push_bind(binding.role_id)
                .push_bind(binding.team_id)
                .push_bind(binding.created);
        });

        self.execute(builder, "insert team role bindings").await
    }

    async fn insert_builtin_roles(&self, bindings: &[BuiltinRoleBinding]) -> AppResult<()> {
        if bindings.is_empty() {
            return Ok(());
        }

        let mut builder: QueryBuilder<'_, MySql> = QueryBuilder::new(
            "INSERT INTO builtin_role (role, role_id, org_id, created, updated) ",
        );
        builder.push_values(bindings, |mut row, binding| {
            row.push_bind(binding.role.as_str())
                .push_bind(binding.role_id)
                .push_bind(binding.org_id.as_i64())
                .push_bind(binding.created)
                .push_bind(binding.updated);
        });

        self.execute(builder, "insert built-in role bindings").await
    }
}
