use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use rbac_migrate_domain::{AssignmentTarget, BuiltinRoleBinding, TeamRoleBinding, UserRoleBinding};

use super::*;

/// Bindings decoded from one assignment request, split by destination table.
#[derive(Debug, Default)]
struct BindingBuckets {
    user_roles: Vec<UserRoleBinding>,
    team_roles: Vec<TeamRoleBinding>,
    builtin_roles: Vec<BuiltinRoleBinding>,
}

impl BindingBuckets {
    fn collect(
        role_index: &RoleIndex,
        assignments: &BTreeMap<OrgId, BTreeSet<String>>,
        timestamp: DateTime<Utc>,
    ) -> AppResult<Self> {
        let mut buckets = Self::default();

        for (org_id, role_names) in assignments {
            for role_name in role_names {
                let role = role_index.get(*org_id, role_name).ok_or_else(|| {
                    AppError::UnknownRole {
                        org_id: *org_id,
                        role_name: role_name.clone(),
                    }
                })?;

                match AssignmentTarget::decode(role_name)? {
                    Some(AssignmentTarget::User(user_id)) => {
                        buckets.user_roles.push(UserRoleBinding {
                            org_id: role.org_id,
                            role_id: role.id,
                            user_id,
                            created: timestamp,
                        });
                    }
                    Some(AssignmentTarget::Team(team_id)) => {
                        buckets.team_roles.push(TeamRoleBinding {
                            org_id: role.org_id,
                            role_id: role.id,
                            team_id,
                            created: timestamp,
                        });
                    }
                    Some(AssignmentTarget::BuiltIn(role_class)) => {
                        buckets.builtin_roles.push(BuiltinRoleBinding {
                            org_id: role.org_id,
                            role_id: role.id,
                            role: role_class,
                            created: timestamp,
                            updated: timestamp,
                        });
                    }
                    None => {
                        debug!(
                            org_id = %org_id,
                            role_name = %role_name,
                            "skipping role outside the managed namespace"
                        );
                    }
                }
            }
        }

        Ok(buckets)
    }
}

impl RoleMigrationService {
    /// Writes user, team, and built-in bindings for every assignment name.
    ///
    /// Every name must resolve through `role_index`; a miss fails with
    /// [`AppError::UnknownRole`] before anything is written. Names outside
    /// the managed namespace are skipped.
    pub async fn bulk_assign_roles(
        &self,
        role_index: &RoleIndex,
        assignments: &BTreeMap<OrgId, BTreeSet<String>>,
    ) -> AppResult<()> {
        if assignments.is_empty() {
            return Ok(());
        }

        let buckets = BindingBuckets::collect(role_index, assignments, Utc::now())?;
        let batch_size = self.config.batch_size;

        for window in Batches::new(buckets.user_roles.len(), batch_size) {
            self.store
                .insert_user_roles(&buckets.user_roles[window])
                .await?;
        }

        for window in Batches::new(buckets.team_roles.len(), batch_size) {
            self.store
                .insert_team_roles(&buckets.team_roles[window])
                .await?;
        }

        for window in Batches::new(buckets.builtin_roles.len(), batch_size) {
            self.store
                .insert_builtin_roles(&buckets.builtin_roles[window])
                .await?;
        }

        info!(
            user_roles = buckets.user_roles.len(),
            team_roles = buckets.team_roles.len(),
            builtin_roles = buckets.builtin_roles.len(),
            "wrote role bindings"
        );

        Ok(())
    }
}
