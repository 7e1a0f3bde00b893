use rbac_migrate_core::AppResult;

/// Source of candidate role UIDs.
///
/// Candidates are not checked for uniqueness here.
pub trait RoleUidGenerator: Send + Sync {
    /// Returns the next candidate UID.
    fn next_uid(&self) -> AppResult<String>;
}
