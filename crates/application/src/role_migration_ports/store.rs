use async_trait::async_trait;

use rbac_migrate_core::{AppError, AppResult, OrgId};
use rbac_migrate_domain::{BuiltinRoleBinding, NewRole, Role, TeamRoleBinding, UserRoleBinding};

/// Storage session used by the role migration.
///
/// Implementations wrap one caller-supplied session; every call runs on it
/// sequentially. Commit and rollback stay with the caller.
#[async_trait]
pub trait RoleMigrationStore: Send + Sync {
    /// Returns whether a multi-row insert can return the generated rows.
    fn supports_insert_returning(&self) -> bool;

    /// Returns whether `uid` is already taken in the organization.
    async fn role_uid_exists(&self, org_id: OrgId, uid: &str) -> AppResult<bool>;

    /// Finds a role by organization and name.
    async fn find_role(&self, org_id: OrgId, name: &str) -> AppResult<Option<Role>>;

    /// Lists roles of one organization whose name is in `names`.
    async fn find_roles_by_names(&self, org_id: OrgId, names: &[String]) -> AppResult<Vec<Role>>;

    /// Inserts roles and returns the persisted rows in one statement.
    async fn insert_roles_returning(&self, _roles: &[NewRole]) -> AppResult<Vec<Role>> {
        Err(AppError::Internal(
            "storage dialect cannot return rows from a multi-row insert".to_owned(),
        ))
    }

    /// Inserts roles without reading them back.
    async fn insert_roles(&self, roles: &[NewRole]) -> AppResult<()>;

    /// Lists roles matching any `(org_id, uid)` pair of `roles`.
    async fn find_roles_by_uids(&self, roles: &[NewRole]) -> AppResult<Vec<Role>>;

    /// Inserts user role bindings.
    async fn insert_user_roles(&self, bindings: &[UserRoleBinding]) -> AppResult<()>;

    /// Inserts team role bindings.
    async fn insert_team_roles(&self, bindings: &[TeamRoleBinding]) -> AppResult<()>;

    /// Inserts built-in role bindings.
    async fn insert_builtin_roles(&self, bindings: &[BuiltinRoleBinding]) -> AppResult<()>;
}
