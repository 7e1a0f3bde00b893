use rbac_migrate_core::{AppError, AppResult};

use crate::RoleUidGenerator;

/// Length of generated role UIDs.
pub const ROLE_UID_LENGTH: usize = 14;

const LEADING_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz";
const ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789";

/// Generates short lowercase alphanumeric UIDs from the OS entropy source.
///
/// UIDs always start with a letter.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomRoleUidGenerator;

impl RandomRoleUidGenerator {
    /// Creates a generator.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl RoleUidGenerator for RandomRoleUidGenerator {
    fn next_uid(&self) -> AppResult<String> {
        let mut uid = String::with_capacity(ROLE_UID_LENGTH);
        let mut entropy = [0_u8; 32];

        while uid.len() < ROLE_UID_LENGTH {
            getrandom::fill(&mut entropy).map_err(|error| {
                AppError::Internal(format!("failed to generate role uid: {error}"))
            })?;

            for byte in entropy {
                let alphabet = if uid.is_empty() {
                    LEADING_ALPHABET
                } else {
                    ALPHABET
                };

                // Rejection sampling keeps every symbol equally likely.
                let accepted_below = 256 - 256 % alphabet.len();
                let value = usize::from(byte);
                if value >= accepted_below {
                    continue;
                }

                uid.push(char::from(alphabet[value % alphabet.len()]));
                if uid.len() == ROLE_UID_LENGTH {
                    break;
                }
            }
        }

        Ok(uid)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use crate::RoleUidGenerator;

    use super::{ROLE_UID_LENGTH, RandomRoleUidGenerator};

    #[test]
    fn uid_has_fixed_length_and_leading_letter() {
        let uid = RandomRoleUidGenerator::new().next_uid().unwrap_or_default();

        assert_eq!(uid.len(), ROLE_UID_LENGTH);
        assert!(uid.starts_with(|character: char| character.is_ascii_lowercase()));
        assert!(
            uid.chars()
                .all(|character| character.is_ascii_lowercase() || character.is_ascii_digit())
        );
    }

    #[test]
    fn consecutive_uids_differ() {
        let generator = RandomRoleUidGenerator::new();
        let uids = (0..64)
            .map(|_| generator.next_uid().unwrap_or_default())
            .collect::<HashSet<_>>();

        assert_eq!(uids.len(), 64);
    }
}
