use super::*;

impl PostgresRoleMigrationStore {
    pub(super) async fn role_uid_exists_impl(&self, org_id: OrgId, uid: &str) -> AppResult<bool> {
        let mut transaction = self.transaction.lock().await;

        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1
                FROM role
                WHERE org_id = $1 AND uid = $2
            )
            "#,
        )
        .bind(org_id.as_i64())
        .bind(uid)
        .fetch_one(&mut **transaction)
        .await
        .map_err(|error| map_storage_error(error, "check role uid"))
    }

    pub(super) async fn find_role_impl(&self, org_id: OrgId, name: &str) -> AppResult<Option<Role>> {
        let mut transaction = self.transaction.lock().await;

        let row = sqlx::query_as::<_, RoleRow>(&format!(
            "SELECT {ROLE_COLUMNS} FROM role WHERE org_id = $1 AND name = $2 LIMIT 1"
        ))
        .bind(org_id.as_i64())
        .bind(name)
        .fetch_optional(&mut **transaction)
        .await
        .map_err(|error| map_storage_error(error, "find role"))?;

        Ok(row.map(Role::from))
    }

    pub(super) async fn find_roles_by_names_impl(
        &self,
        org_id: OrgId,
        names: &[String],
    ) -> AppResult<Vec<Role>> {
        let mut transaction = self.transaction.lock().await;

        let rows = sqlx::query_as::<_, RoleRow>(&format!(
            "SELECT {ROLE_COLUMNS} FROM role WHERE org_id = $1 AND name = ANY($2)"
        ))
        .bind(org_id.as_i64())
        .bind(names)
        .fetch_all(&mut **transaction)
        .await
        .map_err(|error| map_storage_error(error, "list roles by name"))?;

        Ok(rows.into_iter().map(Role::from).collect())
    }

    pub(super) async fn insert_roles_returning_impl(
        &self,
        roles: &[NewRole],
    ) -> AppResult<Vec<Role>> {
        if roles.is_empty() {
            return Ok(Vec::new());
        }

        let mut builder = role_insert_builder(roles);
        builder.push(" RETURNING ");
        builder.push(ROLE_COLUMNS);

        let mut transaction = self.transaction.lock().await;
        let rows = builder
            .build_query_as::<RoleRow>()
            .fetch_all(&mut **transaction)
            .await
            .map_err(|error| map_storage_error(error, "insert roles"))?;

        Ok(rows.into_iter().map(Role::from).collect())
    }

    pub(super) async fn insert_roles_impl(&self, roles: &[NewRole]) -> AppResult<()> {
        if roles.is_empty() {
            return Ok(());
        }

        let mut builder = role_insert_builder(roles);

        let mut transaction = self.transaction.lock().await;
        builder
            .build()
            .execute(&mut **transaction)
            .await
            .map_err(|error| map_storage_error(error, "insert roles"))?;

        Ok(())
    }

    pub(super) async fn find_roles_by_uids_impl(&self, roles: &[NewRole]) -> AppResult<Vec<Role>> {
        let org_ids = roles
            .iter()
            .map(|role| role.org_id.as_i64())
            .collect::<Vec<_>>();
        let uids = roles.iter().map(|role| role.uid.clone()).collect::<Vec<_>>();

        let mut transaction = self.transaction.lock().await;
        let rows = sqlx::query_as::<_, RoleRow>(&format!(
            r#"
            SELECT {ROLE_COLUMNS}
            FROM role
            WHERE (org_id, uid) IN (
                SELECT * FROM UNNEST($1::BIGINT[], $2::TEXT[])
            )
            "#
        ))
        .bind(org_ids)
        .bind(uids)
        .fetch_all(&mut **transaction)
        .await
        .map_err(|error| map_storage_error(error, "list roles by uid"))?;

        Ok(rows.into_iter().map(Role::from).collect())
    }
}
