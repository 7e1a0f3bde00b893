//! Managed assignment names and the targets they encode.
//!
//! A managed role name has the shape `managed:<kind>:<identifier>[:...]`.
//! Only the third colon-separated segment is significant; trailing segments
//! such as the conventional `:permissions` suffix are ignored when decoding.

use rbac_migrate_core::{AppError, AppResult, OrgId};
use serde::{Deserialize, Serialize};

const USERS_PREFIX: &str = "managed:users:";
const TEAMS_PREFIX: &str = "managed:teams:";
const BUILTINS_PREFIX: &str = "managed:builtins:";
const MANAGED_SUFFIX: &str = "permissions";

/// Entity a managed role is bound to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentTarget {
    /// Individual user by identifier.
    User(i64),
    /// Team by identifier.
    Team(i64),
    /// Built-in role class such as `Editor`.
    BuiltIn(String),
}

impl AssignmentTarget {
    /// Decodes a role name into its binding target.
    ///
    /// Returns `Ok(None)` for names outside the managed namespace. Numeric
    /// identifiers that fail to parse are reported as
    /// [`AppError::MalformedAssignment`].
    pub fn decode(role_name: &str) -> AppResult<Option<Self>> {
        if role_name.starts_with(USERS_PREFIX) {
            return parse_entity_id(role_name).map(|user_id| Some(Self::User(user_id)));
        }

        if role_name.starts_with(TEAMS_PREFIX) {
            return parse_entity_id(role_name).map(|team_id| Some(Self::Team(team_id)));
        }

        if role_name.starts_with(BUILTINS_PREFIX) {
            let role_class = identifier_segment(role_name);
            if role_class.trim().is_empty() {
                return Err(AppError::MalformedAssignment {
                    role_name: role_name.to_owned(),
                    reason: "built-in role class is empty".to_owned(),
                });
            }

            return Ok(Some(Self::BuiltIn(title_case(role_class))));
        }

        Ok(None)
    }

    /// Returns the managed role name that decodes back to this target.
    #[must_use]
    pub fn managed_role_name(&self) -> String {
        match self {
            Self::User(user_id) => format!("{USERS_PREFIX}{user_id}:{MANAGED_SUFFIX}"),
            Self::Team(team_id) => format!("{TEAMS_PREFIX}{team_id}:{MANAGED_SUFFIX}"),
            Self::BuiltIn(role_class) => format!(
                "{BUILTINS_PREFIX}{}:{MANAGED_SUFFIX}",
                role_class.to_lowercase()
            ),
        }
    }
}

/// Permission grant recorded by the legacy model for one organization.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LegacyGrant {
    /// Organization the grant belongs to.
    pub org_id: OrgId,
    /// Grantee of the legacy permission.
    pub target: AssignmentTarget,
}

fn identifier_segment(role_name: &str) -> &str {
    role_name.split(':').nth(2).unwrap_or_default()
}

fn parse_entity_id(role_name: &str) -> AppResult<i64> {
    identifier_segment(role_name)
        .parse::<i64>()
        .map_err(|error| AppError::MalformedAssignment {
            role_name: role_name.to_owned(),
            reason: error.to_string(),
        })
}

/// Upper-cases the first letter of every word, leaving other characters as is.
fn title_case(value: &str) -> String {
    let mut titled = String::with_capacity(value.len());
    let mut at_word_start = true;

    for character in value.chars() {
        if at_word_start {
            titled.extend(character.to_uppercase());
        } else {
            titled.push(character);
        }
        at_word_start = !(character.is_alphanumeric() || character == '_');
    }

    titled
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;
    use rbac_migrate_core::AppError;

    use super::{AssignmentTarget, title_case};

    #[test]
    fn decodes_user_assignment() {
        let decoded = AssignmentTarget::decode("managed:users:42");
        assert!(matches!(decoded, Ok(Some(AssignmentTarget::User(42)))));
    }

    #[test]
    fn decodes_team_assignment() {
        let decoded = AssignmentTarget::decode("managed:teams:7");
        assert!(matches!(decoded, Ok(Some(AssignmentTarget::Team(7)))));
    }

    #[test]
    fn decodes_built_in_assignment_title_cased() {
        let decoded = AssignmentTarget::decode("managed:builtins:editor");
        assert!(matches!(
            decoded,
            Ok(Some(AssignmentTarget::BuiltIn(ref role_class))) if role_class == "Editor"
        ));
    }

    #[test]
    fn trailing_segments_are_ignored() {
        let decoded = AssignmentTarget::decode("managed:builtins:editor:extra");
        assert!(matches!(
            decoded,
            Ok(Some(AssignmentTarget::BuiltIn(ref role_class))) if role_class == "Editor"
        ));

        let decoded = AssignmentTarget::decode("managed:users:42:permissions");
        assert!(matches!(decoded, Ok(Some(AssignmentTarget::User(42)))));
    }

    #[test]
    fn unrecognized_prefix_is_not_managed() {
        assert!(matches!(
            AssignmentTarget::decode("fixed:dashboards:writer"),
            Ok(None)
        ));
        assert!(matches!(AssignmentTarget::decode("managed:users"), Ok(None)));
    }

    #[test]
    fn malformed_user_id_names_the_role() {
        let decoded = AssignmentTarget::decode("managed:users:abc:permissions");
        assert!(matches!(
            decoded,
            Err(AppError::MalformedAssignment { ref role_name, .. })
                if role_name == "managed:users:abc:permissions"
        ));
    }

    #[test]
    fn empty_team_id_is_malformed() {
        let decoded = AssignmentTarget::decode("managed:teams:");
        assert!(matches!(decoded, Err(AppError::MalformedAssignment { .. })));
    }

    #[test]
    fn empty_built_in_class_is_malformed() {
        let decoded = AssignmentTarget::decode("managed:builtins::permissions");
        assert!(matches!(decoded, Err(AppError::MalformedAssignment { .. })));
    }

    #[test]
    fn title_case_capitalizes_each_word() {
        assert_eq!(title_case("grafana admin"), "Grafana Admin");
        assert_eq!(title_case("viewer"), "Viewer");
        assert_eq!(title_case("Admin"), "Admin");
    }

    #[test]
    fn managed_role_names_use_permissions_suffix() {
        assert_eq!(
            AssignmentTarget::User(3).managed_role_name(),
            "managed:users:3:permissions"
        );
        assert_eq!(
            AssignmentTarget::Team(9).managed_role_name(),
            "managed:teams:9:permissions"
        );
        assert_eq!(
            AssignmentTarget::BuiltIn("Editor".to_owned()).managed_role_name(),
            "managed:builtins:editor:permissions"
        );
    }

    proptest! {
        #[test]
        fn user_and_team_names_decode_to_their_target(entity_id in any::<i64>()) {
            for target in [AssignmentTarget::User(entity_id), AssignmentTarget::Team(entity_id)] {
                let decoded = AssignmentTarget::decode(target.managed_role_name().as_str());
                prop_assert!(matches!(decoded, Ok(Some(ref value)) if value == &target));
            }
        }

        #[test]
        fn built_in_names_decode_title_cased(role_class in "[a-z]{1,12}") {
            let target = AssignmentTarget::BuiltIn(role_class.clone());
            let decoded = AssignmentTarget::decode(target.managed_role_name().as_str());
            let expected = title_case(role_class.as_str());
            prop_assert!(
                matches!(decoded, Ok(Some(AssignmentTarget::BuiltIn(ref value))) if value == &expected)
            );
        }
    }
}
