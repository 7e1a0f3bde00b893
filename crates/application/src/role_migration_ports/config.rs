use std::num::{NonZeroU8, NonZeroUsize};

use rbac_migrate_core::{AppError, AppResult};

/// Tunables for the role migration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleMigrationConfig {
    /// Maximum rows written per statement.
    pub batch_size: NonZeroUsize,
    /// Candidate UIDs checked per role before giving up.
    pub uid_attempts: NonZeroU8,
}

impl RoleMigrationConfig {
    /// Default maximum rows per statement.
    pub const DEFAULT_BATCH_SIZE: usize = 500;

    /// Default candidate UIDs checked per role.
    pub const DEFAULT_UID_ATTEMPTS: u8 = 3;

    /// Creates a validated configuration.
    pub fn new(batch_size: usize, uid_attempts: u8) -> AppResult<Self> {
        let batch_size = NonZeroUsize::new(batch_size).ok_or_else(|| {
            AppError::Validation("migration batch size must be at least 1".to_owned())
        })?;
        let uid_attempts = NonZeroU8::new(uid_attempts).ok_or_else(|| {
            AppError::Validation("role uid attempts must be at least 1".to_owned())
        })?;

        Ok(Self {
            batch_size,
            uid_attempts,
        })
    }
}

impl Default for RoleMigrationConfig {
    fn default() -> Self {
        Self {
            batch_size: NonZeroUsize::new(Self::DEFAULT_BATCH_SIZE).unwrap_or(NonZeroUsize::MIN),
            uid_attempts: NonZeroU8::new(Self::DEFAULT_UID_ATTEMPTS).unwrap_or(NonZeroU8::MIN),
        }
    }
}

/// How a batch of new roles is written and read back.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleInsertStrategy {
    /// One multi-row insert that returns the created rows.
    CombiningInsert,
    /// Multi-row insert followed by a lookup on `(org_id, uid)`.
    InsertThenFetch,
}

impl RoleInsertStrategy {
    /// Selects the strategy from the storage capability flag.
    #[must_use]
    pub fn for_capability(supports_insert_returning: bool) -> Self {
        if supports_insert_returning {
            Self::CombiningInsert
        } else {
            Self::InsertThenFetch
        }
    }

    /// Returns a stable label for logs.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CombiningInsert => "combining_insert",
            Self::InsertThenFetch => "insert_then_fetch",
        }
    }
}
