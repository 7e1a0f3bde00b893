mod config;
mod plan;
mod store;
mod uid;

pub use config::{RoleInsertStrategy, RoleMigrationConfig};
pub use plan::MigrationPlan;
pub use store::RoleMigrationStore;
pub use uid::RoleUidGenerator;
