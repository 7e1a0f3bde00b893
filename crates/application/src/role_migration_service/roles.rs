use std::collections::{BTreeMap, HashSet};

use chrono::Utc;
use rbac_migrate_domain::NewRole;

use super::*;

impl RoleMigrationService {
    /// Finds a persisted role by organization and name.
    pub async fn find_role(&self, org_id: OrgId, name: &str) -> AppResult<Option<Role>> {
        self.store.find_role(org_id, name).await
    }

    /// Creates roles in batches and returns the persisted rows.
    ///
    /// Batches already written stay written when a later batch fails.
    pub async fn bulk_create_roles(&self, specs: &[RoleSpec]) -> AppResult<Vec<Role>> {
        if specs.is_empty() {
            return Ok(Vec::new());
        }

        let mut created_roles = Vec::with_capacity(specs.len());

        for window in Batches::new(specs.len(), self.config.batch_size) {
            let new_roles = self.prepare_role_batch(&specs[window.clone()]).await?;

            let batch_roles = match self.insert_strategy {
                RoleInsertStrategy::CombiningInsert => {
                    self.store.insert_roles_returning(&new_roles).await?
                }
                RoleInsertStrategy::InsertThenFetch => {
                    self.store.insert_roles(&new_roles).await?;
                    self.store.find_roles_by_uids(&new_roles).await?
                }
            };

            ensure_batch_matches(&new_roles, &batch_roles)?;

            info!(
                start = window.start,
                end = window.end,
                insert_strategy = self.insert_strategy.as_str(),
                "created role batch"
            );
            created_roles.extend(batch_roles);
        }

        Ok(created_roles)
    }

    /// Lists persisted roles matching any of the specifications.
    pub(super) async fn existing_roles(&self, specs: &[RoleSpec]) -> AppResult<Vec<Role>> {
        let mut names_by_org: BTreeMap<OrgId, Vec<String>> = BTreeMap::new();
        for spec in specs {
            names_by_org
                .entry(spec.org_id())
                .or_default()
                .push(spec.name().to_owned());
        }

        let mut existing = Vec::new();
        for (org_id, names) in names_by_org {
            for window in Batches::new(names.len(), self.config.batch_size) {
                existing.extend(
                    self.store
                        .find_roles_by_names(org_id, &names[window])
                        .await?,
                );
            }
        }

        Ok(existing)
    }

    async fn prepare_role_batch(&self, specs: &[RoleSpec]) -> AppResult<Vec<NewRole>> {
        let timestamp = Utc::now();
        let mut reserved = HashSet::with_capacity(specs.len());
        let mut new_roles = Vec::with_capacity(specs.len());

        for spec in specs {
            let uid = self
                .generate_unreserved_role_uid(spec.org_id(), &reserved)
                .await?;
            reserved.insert((spec.org_id(), uid.clone()));
            new_roles.push(NewRole::from_spec(spec, uid, timestamp));
        }

        Ok(new_roles)
    }
}

/// Checks that a written batch came back as exactly the requested roles.
fn ensure_batch_matches(requested: &[NewRole], persisted: &[Role]) -> AppResult<()> {
    let mut requested_keys = requested
        .iter()
        .map(|role| (role.org_id, role.name.as_str()))
        .collect::<Vec<_>>();
    let mut persisted_keys = persisted
        .iter()
        .map(|role| (role.org_id, role.name.as_str()))
        .collect::<Vec<_>>();
    requested_keys.sort_unstable();
    persisted_keys.sort_unstable();

    if requested_keys != persisted_keys {
        return Err(AppError::Internal(format!(
            "role batch returned {} rows that do not match the {} requested roles",
            persisted.len(),
            requested.len()
        )));
    }

    Ok(())
}
