use std::collections::{BTreeMap, BTreeSet};

use rbac_migrate_core::{AppResult, OrgId};
use rbac_migrate_domain::{LegacyGrant, RoleSpec};

/// Roles to ensure and assignments to realize, grouped by organization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationPlan {
    roles: BTreeMap<OrgId, BTreeSet<String>>,
    assignments: BTreeMap<OrgId, BTreeSet<String>>,
}

impl MigrationPlan {
    /// Creates an empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a plan with one managed role per distinct legacy grantee.
    ///
    /// Each managed role is both required and assigned to the grantee it
    /// encodes.
    pub fn from_legacy_grants(grants: impl IntoIterator<Item = LegacyGrant>) -> Self {
        let mut plan = Self::new();
        for grant in grants {
            let role_name = grant.target.managed_role_name();
            plan.require_role(grant.org_id, role_name.clone());
            plan.assign(grant.org_id, role_name);
        }
        plan
    }

    /// Requires a role named `name` to exist in the organization.
    pub fn require_role(&mut self, org_id: OrgId, name: impl Into<String>) {
        self.roles.entry(org_id).or_default().insert(name.into());
    }

    /// Requests the binding encoded by `role_name` in the organization.
    pub fn assign(&mut self, org_id: OrgId, role_name: impl Into<String>) {
        self.assignments
            .entry(org_id)
            .or_default()
            .insert(role_name.into());
    }

    /// Returns required role names by organization.
    #[must_use]
    pub fn roles(&self) -> &BTreeMap<OrgId, BTreeSet<String>> {
        &self.roles
    }

    /// Returns assignment names by organization.
    #[must_use]
    pub fn assignments(&self) -> &BTreeMap<OrgId, BTreeSet<String>> {
        &self.assignments
    }

    /// Returns validated role specifications ordered by organization and name.
    pub fn role_specs(&self) -> AppResult<Vec<RoleSpec>> {
        self.roles
            .iter()
            .flat_map(|(org_id, names)| names.iter().map(|name| RoleSpec::new(*org_id, name)))
            .collect()
    }

    /// Returns whether the plan requests nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty() && self.assignments.is_empty()
    }
}
