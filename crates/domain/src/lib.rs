//! Domain entities and invariants.

#![forbid(unsafe_code)]

mod assignment;
mod binding;
mod role;

pub use assignment::{AssignmentTarget, LegacyGrant};
pub use binding::{BuiltinRoleBinding, TeamRoleBinding, UserRoleBinding};
pub use role::{INITIAL_ROLE_VERSION, NewRole, Role, RoleIndex, RoleSpec};
