// SPDX-License-Identifier: MIT

//! User reconciliation: verified OAuth profile -> durable local user.

use crate::db::Store;
use crate::error::{AppError, Result};
use crate::models::User;
use crate::services::google::GoogleProfile;

/// Maps a verified external profile to a local user, creating one
/// exactly once per distinct provider id.
#[derive(Clone)]
pub struct IdentityService {
    store: Store,
}

impl IdentityService {
    pub fn new(store: Store) -> Self {
        Self { store }
    }

    /// Find or create the user for a verified profile.
    ///
    /// An existing user is returned unchanged; display name, email and
    /// avatar are not refreshed on repeat logins. Two near-simultaneous
    /// first logins race at the store's unique index on the provider id;
    /// the loser re-reads once instead of surfacing the conflict.
    pub async fn reconcile(&self, profile: &GoogleProfile) -> Result<User> {
        if let Some(user) = self
            .store
            .find_user_by_google_id(&profile.provider_id)
            .await?
        {
            return Ok(user);
        }

        let created = self
            .store
            .create_google_user(
                &profile.provider_id,
                &profile.display_name,
                profile.emails.first().map(String::as_str),
                profile.avatar_url.as_deref(),
            )
            .await;

        match created {
            Ok(user) => {
                tracing::info!(
                    user_id = user.id,
                    provider_id = %profile.provider_id,
                    "Created user on first login"
                );
                Ok(user)
            }
            Err(AppError::DuplicateIdentity) => {
                // Lost the first-login race; the winner's row must be there.
                tracing::debug!(
                    provider_id = %profile.provider_id,
                    "Concurrent first login, retrying lookup"
                );
                self.store
                    .find_user_by_google_id(&profile.provider_id)
                    .await?
                    .ok_or(AppError::ReconciliationFailed)
            }
            Err(err) => Err(err),
        }
    }
}
