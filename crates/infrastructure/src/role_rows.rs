use chrono::{DateTime, Utc};
use rbac_migrate_core::{AppError, OrgId};
use rbac_migrate_domain::Role;
use sqlx::FromRow;

/// Column list selected for every role read.
pub(crate) const ROLE_COLUMNS: &str = "id, org_id, uid, name, version, created, updated";

#[derive(Debug, FromRow)]
pub(crate) struct RoleRow {
    id: i64,
    org_id: i64,
    uid: String,
    name: String,
    version: i64,
    created: DateTime<Utc>,
    updated: DateTime<Utc>,
}

impl From<RoleRow> for Role {
    fn from(row: RoleRow) -> Self {
        Self {
            id: row.id,
            org_id: OrgId::new(row.org_id),
            uid: row.uid,
            name: row.name,
            version: row.version,
            created: row.created,
            updated: row.updated,
        }
    }
}

/// Maps a driver error, reporting unique-key violations as conflicts.
pub(crate) fn map_storage_error(error: sqlx::Error, action: &str) -> AppError {
    if let sqlx::Error::Database(database_error) = &error
        && database_error.is_unique_violation()
    {
        return AppError::Conflict(format!("failed to {action}: {error}"));
    }

    AppError::Storage(format!("failed to {action}: {error}"))
}
