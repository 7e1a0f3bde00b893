use super::*;

impl PostgresRoleMigrationStore {
    pub(super) async fn insert_user_roles_impl(
        &self,
        bindings: &[UserRoleBinding],
    ) -> AppResult<()> {
        if bindings.is_empty() {
            return Ok(());
        }

        let mut builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("INSERT INTO user_role (org_id, role_id, user_id, created) ");
        builder.push_values(bindings, |mut row, binding| {
            row.push_bind(binding.org_id.as_i64())
                .push_bind(binding.role_id)
                .push_bind(binding.user_id)
                .push_bind(binding.created);
        });

        let mut transaction = self.transaction.lock().await;
        builder
            .build()
            .execute(&mut **transaction)
            .await
            .map_err(|error| map_storage_error(error, "insert user role bindings"))?;

        Ok(())
    }

    pub(super) async fn insert_team_roles_impl(
        &self,
        bindings: &[TeamRoleBinding],
    ) -> AppResult<()> {
        if bindings.is_empty() {
            return Ok(());
        }

        let mut builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("INSERT INTO team_role (org_id, role_id, team_id, created) ");
        builder.push_values(bindings, |mut row, binding| {
            row.push_bind(binding.org_id.as_i64())
                .push_bind(binding.role_id)
                .push_bind(binding.team_id)
                .push_bind(binding.created);
        });

        let mut transaction = self.transaction.lock().await;
        builder
            .build()
            .execute(&mut **transaction)
            .await
            .map_err(|error| map_storage_error(error, "insert team role bindings"))?;

        Ok(())
    }

    pub(super) async fn insert_builtin_roles_impl(
        &self,
        bindings: &[BuiltinRoleBinding],
    ) -> AppResult<()> {
        if bindings.is_empty() {
            return Ok(());
        }

        let mut builder: QueryBuilder<'_, Postgres> = QueryBuilder::new(
            "INSERT INTO builtin_role (role, role_id, org_id, created, updated) ",
        );
        builder.push_values(bindings, |mut row, binding| {
            row.push_bind(binding.role.as_str())
                .push_bind(binding.role_id)
                .push_bind(binding.org_id.as_i64())
                .push_bind(binding.created)
                .push_bind(binding.updated);
        });

        let mut transaction = self.transaction.lock().await;
        builder
            .build()
            .execute(&mut **transaction)
            .await
            .map_err(|error| map_storage_error(error, "insert built-in role bindings"))?;

        Ok(())
    }
}
