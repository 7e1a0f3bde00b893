//! Role migration runner for organization RBAC tables.

#![forbid(unsafe_code)]

mod migrator_config;
mod plan_file;

use std::path::Path;
use std::sync::Arc;

use rbac_migrate_application::{
    MigrationPlan, RandomRoleUidGenerator, RoleMigrationConfig, RoleMigrationService,
    RoleMigrationStore,
};
use rbac_migrate_core::{AppError, AppResult};
use rbac_migrate_infrastructure::{MySqlRoleMigrationStore, PostgresRoleMigrationStore};
use sqlx::mysql::MySqlPoolOptions;
use sqlx::postgres::PgPoolOptions;
use tracing::{info, warn};

use crate::migrator_config::{DatabaseDialect, MigratorCommand, MigratorConfig, init_tracing};
use crate::plan_file::PlanFile;

/// Store whose writes end with an explicit commit or rollback.
trait TransactionalStore: RoleMigrationStore + Sized + 'static {
    async fn commit(self) -> AppResult<()>;

    async fn rollback(self) -> AppResult<()>;
}

impl TransactionalStore for PostgresRoleMigrationStore {
    async fn commit(self) -> AppResult<()> {
        PostgresRoleMigrationStore::commit(self).await
    }

    async fn rollback(self) -> AppResult<()> {
        PostgresRoleMigrationStore::rollback(self).await
    }
}

impl TransactionalStore for MySqlRoleMigrationStore {
    async fn commit(self) -> AppResult<()> {
        MySqlRoleMigrationStore::commit(self).await
    }

    async fn rollback(self) -> AppResult<()> {
        MySqlRoleMigrationStore::rollback(self).await
    }
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = MigratorConfig::load()?;
    info!(
        dialect = config.dialect.as_str(),
        dry_run = config.dry_run,
        batch_size = config.role_migration.batch_size.get(),
        "rbac-migrate started"
    );

    match config.dialect {
        DatabaseDialect::Postgres => run_postgres(&config).await,
        DatabaseDialect::MySql => run_mysql(&config).await,
    }
}

async fn run_postgres(config: &MigratorConfig) -> AppResult<()> {
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(config.database_url.as_str())
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    if config.command == MigratorCommand::Schema {
        sqlx::migrate!("../../crates/infrastructure/migrations/postgres")
            .run(&pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;
        info!("database schema applied successfully");
        return Ok(());
    }

    let plan = load_plan(config).await?;
    let store = PostgresRoleMigrationStore::begin(&pool).await?;
    run_plan(store, config.role_migration, &plan, config.dry_run).await
}

async fn run_mysql(config: &MigratorConfig) -> AppResult<()> {
    let pool = MySqlPoolOptions::new()
        .max_connections(2)
        .connect(config.database_url.as_str())
        .await
        .map_err(|error| AppError::Internal(format!("failed to connect to database: {error}")))?;

    if config.command == MigratorCommand::Schema {
        sqlx::migrate!("../../crates/infrastructure/migrations/mysql")
            .run(&pool)
            .await
            .map_err(|error| AppError::Internal(format!("failed to run migrations: {error}")))?;
        info!("database schema applied successfully");
        return Ok(());
    }

    let plan = load_plan(config).await?;
    let store = MySqlRoleMigrationStore::begin(&pool).await?;
    run_plan(store, config.role_migration, &plan, config.dry_run).await
}

async fn load_plan(config: &MigratorConfig) -> AppResult<MigrationPlan> {
    let path = config
        .plan_path
        .as_deref()
        .ok_or_else(|| AppError::Validation("MIGRATION_PLAN_PATH is required".to_owned()))?;

    let plan = PlanFile::read(path).await?.into_plan();
    log_plan(path, &plan);
    Ok(plan)
}

fn log_plan(path: &Path, plan: &MigrationPlan) {
    let role_count: usize = plan.roles().values().map(|names| names.len()).sum();
    let assignment_count: usize = plan.assignments().values().map(|names| names.len()).sum();

    info!(
        path = %path.display(),
        organizations = plan.roles().len(),
        roles = role_count,
        assignments = assignment_count,
        "migration plan loaded"
    );
}

/// Runs the plan on one transaction and commits it, or rolls it back on
/// failure and on dry runs.
async fn run_plan<S: TransactionalStore>(
    store: S,
    role_migration: RoleMigrationConfig,
    plan: &MigrationPlan,
    dry_run: bool,
) -> AppResult<()> {
    let store = Arc::new(store);
    let service = RoleMigrationService::new(
        store.clone(),
        Arc::new(RandomRoleUidGenerator::new()),
        role_migration,
    );

    let outcome = service.migrate(plan).await;
    drop(service);
    let store = Arc::try_unwrap(store)
        .map_err(|_| AppError::Internal("migration store is still shared".to_owned()))?;

    match outcome {
        Ok(roles) if dry_run => {
            info!(roles = roles.len(), "dry run finished, rolling back");
            store.rollback().await
        }
        Ok(roles) => {
            store.commit().await?;
            info!(roles = roles.len(), "role migration committed");
            Ok(())
        }
        Err(error) => {
            if let Err(rollback_error) = store.rollback().await {
                warn!(error = %rollback_error, "failed to roll back role migration");
            }
            Err(error)
        }
    }
}
