use std::collections::BTreeMap;
use std::path::Path;

use rbac_migrate_application::MigrationPlan;
use rbac_migrate_core::{AppError, AppResult, OrgId};
use rbac_migrate_domain::LegacyGrant;
use serde::Deserialize;

/// JSON migration plan read from `MIGRATION_PLAN_PATH`.
///
/// `roles` and `assignments` are keyed by organization id. Each legacy grant
/// adds its managed role to both sets.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlanFile {
    roles: BTreeMap<i64, Vec<String>>,
    assignments: BTreeMap<i64, Vec<String>>,
    legacy_grants: Vec<LegacyGrant>,
}

impl PlanFile {
    pub async fn read(path: &Path) -> AppResult<Self> {
        let contents = tokio::fs::read_to_string(path).await.map_err(|error| {
            AppError::Validation(format!(
                "failed to read migration plan '{}': {error}",
                path.display()
            ))
        })?;

        Self::parse(contents.as_str())
    }

    pub fn parse(contents: &str) -> AppResult<Self> {
        serde_json::from_str(contents)
            .map_err(|error| AppError::Validation(format!("invalid migration plan: {error}")))
    }

    pub fn into_plan(self) -> MigrationPlan {
        let mut plan = MigrationPlan::from_legacy_grants(self.legacy_grants);

        for (org_id, names) in self.roles {
            for name in names {
                plan.require_role(OrgId::new(org_id), name);
            }
        }
        for (org_id, names) in self.assignments {
            for name in names {
                plan.assign(OrgId::new(org_id), name);
            }
        }

        plan
    }
}
