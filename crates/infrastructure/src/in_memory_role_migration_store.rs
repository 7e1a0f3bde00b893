use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::RwLock;

use rbac_migrate_application::RoleMigrationStore;
use rbac_migrate_core::{AppError, AppResult, OrgId};
use rbac_migrate_domain::{BuiltinRoleBinding, NewRole, Role, TeamRoleBinding, UserRoleBinding};


#[derive(Debug, Default)]
struct StoreState {
    roles: Vec<Role>,
    user_roles: Vec<UserRoleBinding>,
    team_roles: Vec<TeamRoleBinding>,
    builtin_roles: Vec<BuiltinRoleBinding>,
}

impl StoreState {
    fn next_role_id(&self) -> i64 {
        self.roles
            .iter()
            .map(|role| role.id)
            .max()
            .unwrap_or_default()
            .saturating_add(1)
    }

    /// Rejects the whole batch when any row clashes with stored roles or
    /// with an earlier row of the same batch.
    fn check_role_keys(&self, roles: &[NewRole]) -> AppResult<()> {
        let mut uids: HashSet<(OrgId, &str)> = self
            .roles
            .iter()
            .map(|role| (role.org_id, role.uid.as_str()))
            .collect();
        let mut names: HashSet<(OrgId, &str)> = self
            .roles
            .iter()
            .map(|role| (role.org_id, role.name.as_str()))
            .collect();

        for role in roles {
            if !uids.insert((role.org_id, role.uid.as_str())) {
                return Err(AppError::Conflict(format!(
                    "role uid '{}' already exists for org '{}'",
                    role.uid, role.org_id
                )));
            }
            if !names.insert((role.org_id, role.name.as_str())) {
                return Err(AppError::Conflict(format!(
                    "role '{}' already exists for org '{}'",
                    role.name, role.org_id
                )));
            }
        }

        Ok(())
    }

    fn persist_roles(&mut self, roles: &[NewRole]) -> AppResult<Vec<Role>> {
        self.check_role_keys(roles)?;

        let mut next_id = self.next_role_id();
        let mut persisted = Vec::with_capacity(roles.len());
        for role in roles {
            let stored = Role {
                id: next_id,
                org_id: role.org_id,
                uid: role.uid.clone(),
                name: role.name.clone(),
                version: role.version,
                created: role.created,
                updated: role.updated,
            };
            next_id = next_id.saturating_add(1);
            self.roles.push(stored.clone());
            persisted.push(stored);
        }

        Ok(persisted)
    }
}

/// In-memory role migration store.
///
/// Enforces the same unique keys as the SQL schema. Writes are applied per
/// call; there is no session to roll back.
#[derive(Debug)]
pub struct InMemoryRoleMigrationStore {
    supports_insert_returning: bool,
    state: RwLock<StoreState>,
}

impl InMemoryRoleMigrationStore {
    /// Creates an empty store that returns rows from role inserts.
    #[must_use]
    pub fn new() -> Self {
        Self::with_insert_returning(true)
    }

    /// Creates an empty store with the given insert capability.
    #[must_use]
    pub fn with_insert_returning(supports_insert_returning: bool) -> Self {
        Self {
            supports_insert_returning,
            state: RwLock::new(StoreState::default()),
        }
    }

    /// Returns stored roles ordered by id.
    pub async fn roles(&self) -> Vec<Role> {
        self.state.read().await.roles.clone()
    }

    /// Returns stored user role bindings in insertion order.
    pub async fn user_roles(&self) -> Vec<UserRoleBinding> {
        self.state.read().await.user_roles.clone()
    }

    /// Returns stored team role bindings in insertion order.
    pub async fn team_roles(&self) -> Vec<TeamRoleBinding> {
        self.state.read().await.team_roles.clone()
    }

    /// Returns stored built-in role bindings in insertion order.
    pub async fn builtin_roles(&self) -> Vec<BuiltinRoleBinding> {
        self.state.read().await.builtin_roles.clone()
    }
}

impl Default for InMemoryRoleMigrationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoleMigrationStore for InMemoryRoleMigrationStore {
    fn supports_insert_returning(&self) -> bool {
        self.supports_insert_returning
    }

    async fn role_uid_exists(&self, org_id: OrgId, uid: &str) -> AppResult<bool> {
        Ok(self
            .state
            .read()
            .await
            .roles
            .iter()
            .any(|role| role.org_id == org_id && role.uid == uid))
    }

    async fn find_role(&self, org_id: OrgId, name: &str) -> AppResult<Option<Role>> {
        Ok(self
            .state
            .read()
            .await
            .roles
            .iter()
            .find(|role| role.org_id == org_id && role.name == name)
            .cloned())
    }

    async fn find_roles_by_names(&self, org_id: OrgId, names: &[String]) -> AppResult<Vec<Role>> {
        let wanted: HashSet<&str> = names.iter().map(String::as_str).collect();

        Ok(self
            .state
            .read()
            .await
            .roles
            .iter()
            .filter(|role| role.org_id == org_id && wanted.contains(role.name.as_str()))
            .cloned()
            .collect())
    }

    async fn insert_roles_returning(&self, roles: &[NewRole]) -> AppResult<Vec<Role>> {
        if !self.supports_insert_returning {
            return Err(AppError::Internal(
                "in-memory store configured without insert returning".to_owned(),
            ));
        }

        self.state.write().await.persist_roles(roles)
    }

    async fn insert_roles(&self, roles: &[NewRole]) -> AppResult<()> {
        self.state.write().await.persist_roles(roles).map(|_| ())
    }

    async fn find_roles_by_uids(&self, roles: &[NewRole]) -> AppResult<Vec<Role>> {
        let wanted: HashSet<(OrgId, &str)> = roles
            .iter()
            .map(|role| (role.org_id, role.uid.as_str()))
            .collect();

        Ok(self
            .state
            .read()
            .await
            .roles
            .iter()
            .filter(|role| wanted.contains(&(role.org_id, role.uid.as_str())))
            .cloned()
            .collect())
    }

    async fn insert_user_roles(&self, bindings: &[UserRoleBinding]) -> AppResult<()> {
        let mut state = self.state.write().await;

        let mut keys: HashSet<(OrgId, i64, i64)> = state
            .user_roles
            .iter()
            .map(|binding| (binding.org_id, binding.user_id, binding.role_id))
            .collect();
        for binding in bindings {
            if !keys.insert((binding.org_id, binding.user_id, binding.role_id)) {
                return Err(AppError::Conflict(format!(
                    "user '{}' already holds role '{}' in org '{}'",
                    binding.user_id, binding.role_id, binding.org_id
                )));
            }
        }

        state.user_roles.extend_from_slice(bindings);
        Ok(())
    }

    async fn insert_team_roles(&self, bindings: &[TeamRoleBinding]) -> AppResult<()> {
        let mut state = self.state.write().await;

        let mut keys: HashSet<(OrgId, i64, i64)> = state
            .team_roles
            .iter()
            .map(|binding| (binding.org_id, binding.team_id, binding.role_id))
            .collect();
        for binding in bindings {
            if !keys.insert((binding.org_id, binding.team_id, binding.role_id)) {
                return Err(AppError::Conflict(format!(
                    "team '{}' already holds role '{}' in org '{}'",
                    binding.team_id, binding.role_id, binding.org_id
                )));
            }
        }

        state.team_roles.extend_from_slice(bindings);
        Ok(())
    }

    async fn insert_builtin_roles(&self, bindings: &[BuiltinRoleBinding]) -> AppResult<()> {
        let mut state = self.state.write().await;

        let mut keys: HashSet<(String, i64, OrgId)> = state
            .builtin_roles
            .iter()
            .map(|binding| (binding.role.clone(), binding.role_id, binding.org_id))
            .collect();
        for binding in bindings {
            if !keys.insert((binding.role.clone(), binding.role_id, binding.org_id)) {
                return Err(AppError::Conflict(format!(
                    "built-in role '{}' already holds role '{}' in org '{}'",
                    binding.role, binding.role_id, binding.org_id
                )));
            }
        }

        state.builtin_roles.extend_from_slice(bindings);
        Ok(())
    }
}
