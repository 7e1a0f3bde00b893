use super::*;

impl RoleMigrationService {
    /// Ensures every planned role exists, then writes every planned binding.
    ///
    /// Roles already persisted are reused. Returns every role the plan
    /// requires, ordered by organization and name.
    pub async fn migrate(&self, plan: &MigrationPlan) -> AppResult<Vec<Role>> {
        let specs = plan.role_specs()?;

        let mut role_index = RoleIndex::from_iter(self.existing_roles(&specs).await?);
        let existing_count = role_index.len();

        let missing_specs = specs
            .into_iter()
            .filter(|spec| !role_index.contains(spec.org_id(), spec.name()))
            .collect::<Vec<_>>();
        let created_roles = self.bulk_create_roles(&missing_specs).await?;
        let created_count = created_roles.len();
        role_index.extend(created_roles);

        self.bulk_assign_roles(&role_index, plan.assignments()).await?;

        info!(
            existing_roles = existing_count,
            created_roles = created_count,
            organizations = plan.roles().len(),
            "role migration finished"
        );

        Ok(role_index.into_roles())
    }
}
