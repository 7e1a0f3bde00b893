use std::collections::HashSet;

use super::*;

impl RoleMigrationService {
    /// Returns a UID not used by any persisted role in the organization.
    ///
    /// Checks at most `uid_attempts` candidates and fails with
    /// [`AppError::UidExhausted`] when every candidate is taken.
    pub async fn generate_role_uid(&self, org_id: OrgId) -> AppResult<String> {
        self.generate_unreserved_role_uid(org_id, &HashSet::new())
            .await
    }

    /// Same as [`Self::generate_role_uid`], also rejecting UIDs already
    /// handed out to not-yet-inserted roles of the current batch.
    pub(super) async fn generate_unreserved_role_uid(
        &self,
        org_id: OrgId,
        reserved: &HashSet<(OrgId, String)>,
    ) -> AppResult<String> {
        let attempts = self.config.uid_attempts.get();

        for attempt in 1..=attempts {
            let candidate = self.uid_generator.next_uid()?;
            let is_reserved = reserved.contains(&(org_id, candidate.clone()));

            if !is_reserved && !self.store.role_uid_exists(org_id, candidate.as_str()).await? {
                return Ok(candidate);
            }

            debug!(
                org_id = %org_id,
                attempt,
                uid = %candidate,
                "role uid candidate already in use"
            );
        }

        Err(AppError::UidExhausted { org_id, attempts })
    }
}
