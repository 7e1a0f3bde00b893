use chrono::{DateTime, Utc};
use rbac_migrate_core::OrgId;
use serde::{Deserialize, Serialize};

/// Binding of a role to an individual user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRoleBinding {
    /// Owning organization.
    pub org_id: OrgId,
    /// Bound role.
    pub role_id: i64,
    /// Bound user.
    pub user_id: i64,
    /// Creation timestamp.
    pub created: DateTime<Utc>,
}

/// Binding of a role to a team.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamRoleBinding {
    /// Owning organization.
    pub org_id: OrgId,
    /// Bound role.
    pub role_id: i64,
    /// Bound team.
    pub team_id: i64,
    /// Creation timestamp.
    pub created: DateTime<Utc>,
}

/// Binding of a role to a built-in role class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuiltinRoleBinding {
    /// Owning organization.
    pub org_id: OrgId,
    /// Bound role.
    pub role_id: i64,
    /// Title-cased built-in role class.
    pub role: String,
    /// Creation timestamp.
    pub created: DateTime<Utc>,
    /// Last update timestamp.
    pub updated: DateTime<Utc>,
}
