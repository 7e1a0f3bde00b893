use std::env;
use std::path::PathBuf;

use rbac_migrate_application::RoleMigrationConfig;
use rbac_migrate_core::{AppError, AppResult};
use tracing_subscriber::EnvFilter;

/// What the binary was asked to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MigratorCommand {
    /// Apply the bundled schema and exit.
    Schema,
    /// Run a migration plan.
    Migrate,
}

/// Storage dialect chosen from the database URL scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DatabaseDialect {
    Postgres,
    MySql,
}

impl DatabaseDialect {
    pub fn from_database_url(database_url: &str) -> AppResult<Self> {
        let scheme = database_url
            .split_once("://")
            .map(|(scheme, _)| scheme.to_ascii_lowercase())
            .unwrap_or_default();

        match scheme.as_str() {
            "postgres" | "postgresql" => Ok(Self::Postgres),
            "mysql" | "mariadb" => Ok(Self::MySql),
            _ => Err(AppError::Validation(
                "DATABASE_URL must start with postgres://, postgresql://, mysql:// or mariadb://"
                    .to_owned(),
            )),
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Postgres => "postgres",
            Self::MySql => "mysql",
        }
    }
}

#[derive(Debug, Clone)]
pub struct MigratorConfig {
    pub command: MigratorCommand,
    pub database_url: String,
    pub dialect: DatabaseDialect,
    pub plan_path: Option<PathBuf>,
    pub role_migration: RoleMigrationConfig,
    pub dry_run: bool,
}

impl MigratorConfig {
    pub fn load() -> AppResult<Self> {
        Self::from_lookup(env::args().nth(1).as_deref(), |name| env::var(name).ok())
    }

    fn from_lookup(
        command: Option<&str>,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> AppResult<Self> {
        let command = match command {
            None => MigratorCommand::Migrate,
            Some("schema") => MigratorCommand::Schema,
            Some(other) => {
                return Err(AppError::Validation(format!(
                    "unknown command '{other}', expected no argument or 'schema'"
                )));
            }
        };

        let database_url = lookup("DATABASE_URL")
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| AppError::Validation("DATABASE_URL is required".to_owned()))?;
        let dialect = DatabaseDialect::from_database_url(database_url.as_str())?;

        let plan_path = lookup("MIGRATION_PLAN_PATH")
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);
        if command == MigratorCommand::Migrate && plan_path.is_none() {
            return Err(AppError::Validation(
                "MIGRATION_PLAN_PATH is required".to_owned(),
            ));
        }

        let batch_size = match lookup("MIGRATION_BATCH_SIZE") {
            Some(value) => value.trim().parse::<usize>().map_err(|error| {
                AppError::Validation(format!("invalid MIGRATION_BATCH_SIZE: {error}"))
            })?,
            None => RoleMigrationConfig::DEFAULT_BATCH_SIZE,
        };
        let uid_attempts = match lookup("MIGRATION_UID_ATTEMPTS") {
            Some(value) => value.trim().parse::<u8>().map_err(|error| {
                AppError::Validation(format!("invalid MIGRATION_UID_ATTEMPTS: {error}"))
            })?,
            None => RoleMigrationConfig::DEFAULT_UID_ATTEMPTS,
        };
        let role_migration = RoleMigrationConfig::new(batch_size, uid_attempts)?;

        let dry_run = lookup("MIGRATION_DRY_RUN")
            .unwrap_or_else(|| "false".to_owned())
            .eq_ignore_ascii_case("true");

        Ok(Self {
            command,
            database_url,
            dialect,
            plan_path,
            role_migration,
            dry_run,
        })
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use rbac_migrate_core::AppError;

    use super::{DatabaseDialect, MigratorCommand, MigratorConfig};

    fn load(
        command: Option<&str>,
        values: &[(&str, &str)],
    ) -> Result<MigratorConfig, AppError> {
        let values: HashMap<String, String> = values
            .iter()
            .map(|(name, value)| ((*name).to_owned(), (*value).to_owned()))
            .collect();
        MigratorConfig::from_lookup(command, |name| values.get(name).cloned())
    }

    #[test]
    fn dialect_follows_url_scheme() {
        assert!(matches!(
            DatabaseDialect::from_database_url("postgres://localhost/grafana"),
            Ok(DatabaseDialect::Postgres)
        ));
        assert!(matches!(
            DatabaseDialect::from_database_url("PostgreSQL://localhost/grafana"),
            Ok(DatabaseDialect::Postgres)
        ));
        assert!(matches!(
            DatabaseDialect::from_database_url("mariadb://localhost/grafana"),
            Ok(DatabaseDialect::MySql)
        ));
        assert!(matches!(
            DatabaseDialect::from_database_url("sqlite://grafana.db"),
            Err(AppError::Validation(_))
        ));
        assert!(matches!(
            DatabaseDialect::from_database_url("localhost:5432"),
            Err(AppError::Validation(_))
        ));
    }

    #[test]
    fn migrate_defaults_apply() {
        let config = load(
            None,
            &[
                ("DATABASE_URL", "mysql://localhost/grafana"),
                ("MIGRATION_PLAN_PATH", "plan.json"),
            ],
        );

        let Ok(config) = config else {
            panic!("config should load");
        };
        assert_eq!(config.command, MigratorCommand::Migrate);
        assert_eq!(config.dialect, DatabaseDialect::MySql);
        assert_eq!(config.role_migration.batch_size.get(), 500);
        assert_eq!(config.role_migration.uid_attempts.get(), 3);
        assert!(!config.dry_run);
    }

    #[test]
    fn migrate_requires_plan_path() {
        let config = load(None, &[("DATABASE_URL", "postgres://localhost/grafana")]);
        assert!(matches!(config, Err(AppError::Validation(_))));
    }

    #[test]
    fn schema_command_does_not_need_plan() {
        let config = load(
            Some("schema"),
            &[("DATABASE_URL", "postgres://localhost/grafana")],
        );
        assert!(matches!(
            config,
            Ok(MigratorConfig {
                command: MigratorCommand::Schema,
                ..
            })
        ));
    }

    #[test]
    fn zero_batch_size_is_rejected() {
        let config = load(
            None,
            &[
                ("DATABASE_URL", "postgres://localhost/grafana"),
                ("MIGRATION_PLAN_PATH", "plan.json"),
                ("MIGRATION_BATCH_SIZE", "0"),
            ],
        );
        assert!(matches!(config, Err(AppError::Validation(_))));
    }

    #[test]
    fn overrides_and_dry_run_are_read() {
        let config = load(
            None,
            &[
                ("DATABASE_URL", "postgres://localhost/grafana"),
                ("MIGRATION_PLAN_PATH", "plan.json"),
                ("MIGRATION_BATCH_SIZE", "25"),
                ("MIGRATION_UID_ATTEMPTS", "5"),
                ("MIGRATION_DRY_RUN", "TRUE"),
            ],
        );

        let Ok(config) = config else {
            panic!("config should load");
        };
        assert_eq!(config.role_migration.batch_size.get(), 25);
        assert_eq!(config.role_migration.uid_attempts.get(), 5);
        assert!(config.dry_run);
    }

    #[test]
    fn unknown_command_is_rejected() {
        let config = load(
            Some("seed"),
            &[("DATABASE_URL", "postgres://localhost/grafana")],
        );
        assert!(matches!(config, Err(AppError::Validation(_))));
    }
}
