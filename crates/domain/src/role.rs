use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rbac_migrate_core::{AppResult, NonEmptyString, OrgId};
use serde::{Deserialize, Serialize};

/// Version stamped on every role when it is first persisted.
pub const INITIAL_ROLE_VERSION: i64 = 1;

/// Desired role identified by organization and name, prior to creation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RoleSpec {
    org_id: OrgId,
    name: NonEmptyString,
}

impl RoleSpec {
    /// Creates a role specification with a validated name.
    pub fn new(org_id: OrgId, name: impl Into<String>) -> AppResult<Self> {
        Ok(Self {
            org_id,
            name: NonEmptyString::new(name)?,
        })
    }

    /// Returns the owning organization.
    #[must_use]
    pub fn org_id(&self) -> OrgId {
        self.org_id
    }

    /// Returns the role name.
    #[must_use]
    pub fn name(&self) -> &str {
        self.name.as_str()
    }
}

/// Role row ready to be inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRole {
    /// Owning organization.
    pub org_id: OrgId,
    /// Short identifier, unique in organization scope.
    pub uid: String,
    /// Role name, unique in organization scope.
    pub name: String,
    /// Row version.
    pub version: i64,
    /// Creation timestamp.
    pub created: DateTime<Utc>,
    /// Last update timestamp.
    pub updated: DateTime<Utc>,
}

impl NewRole {
    /// Builds the first version of a role from its specification.
    #[must_use]
    pub fn from_spec(spec: &RoleSpec, uid: String, timestamp: DateTime<Utc>) -> Self {
        Self {
            org_id: spec.org_id(),
            uid,
            name: spec.name().to_owned(),
            version: INITIAL_ROLE_VERSION,
            created: timestamp,
            updated: timestamp,
        }
    }
}

/// Persisted role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Role {
    /// Storage-generated identifier.
    pub id: i64,
    /// Owning organization.
    pub org_id: OrgId,
    /// Short identifier, unique in organization scope.
    pub uid: String,
    /// Role name, unique in organization scope.
    pub name: String,
    /// Row version.
    pub version: i64,
    /// Creation timestamp.
    pub created: DateTime<Utc>,
    /// Last update timestamp.
    pub updated: DateTime<Utc>,
}

/// In-memory lookup of persisted roles keyed by organization and name.
#[derive(Debug, Clone, Default)]
pub struct RoleIndex {
    roles: HashMap<(OrgId, String), Role>,
}

impl RoleIndex {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a role, replacing any previous entry with the same key.
    pub fn insert(&mut self, role: Role) {
        self.roles.insert((role.org_id, role.name.clone()), role);
    }

    /// Returns the role named `name` in `org_id`.
    #[must_use]
    pub fn get(&self, org_id: OrgId, name: &str) -> Option<&Role> {
        self.roles.get(&(org_id, name.to_owned()))
    }

    /// Returns whether the index has a role for the key.
    #[must_use]
    pub fn contains(&self, org_id: OrgId, name: &str) -> bool {
        self.get(org_id, name).is_some()
    }

    /// Returns the number of indexed roles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Returns whether the index is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Consumes the index and returns its roles ordered by organization and name.
    #[must_use]
    pub fn into_roles(self) -> Vec<Role> {
        let mut roles = self.roles.into_values().collect::<Vec<_>>();
        roles.sort_by(|left, right| {
            left.org_id
                .cmp(&right.org_id)
                .then_with(|| left.name.cmp(&right.name))
        });
        roles
    }
}

impl FromIterator<Role> for RoleIndex {
    fn from_iter<T: IntoIterator<Item = Role>>(iter: T) -> Self {
        let mut index = Self::new();
        for role in iter {
            index.insert(role);
        }
        index
    }
}

impl Extend<Role> for RoleIndex {
    fn extend<T: IntoIterator<Item = Role>>(&mut self, iter: T) {
        for role in iter {
            self.insert(role);
        }
    }
}
