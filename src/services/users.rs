// SPDX-License-Identifier: MIT

//! User profile bootstrap and seen-message watermarks.

use crate::db::FirestoreDb;
use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::UserProfile;
use crate::time_utils::now_rfc3339;
use std::collections::HashMap;

/// Profile lifecycle operations.
#[derive(Clone)]
pub struct UserService {
    db: FirestoreDb,
}

impl UserService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Get the caller's profile, creating it on first sign-in.
    ///
    /// Existing profiles get their display name, photo and
    /// `last_active` refreshed from the session claims.
    pub async fn ensure_profile(&self, auth: &AuthUser) -> Result<UserProfile> {
        let now = now_rfc3339();

        if let Some(mut profile) = self.db.get_user(&auth.uid).await? {
            if let Some(name) = &auth.name {
                profile.display_name = name.clone();
            }
            if auth.photo_url.is_some() {
                profile.photo_url = auth.photo_url.clone();
            }
            profile.last_active = now;
            self.db.set_user_identity(&profile).await?;
            return Ok(profile);
        }

        let profile = UserProfile {
            uid: auth.uid.clone(),
            display_name: auth.name.clone().unwrap_or_else(|| "Usuario".to_string()),
            photo_url: auth.photo_url.clone(),
            groups: vec![],
            blocked_days: HashMap::new(),
            confirmed_plans: HashMap::new(),
            last_seen_messages: HashMap::new(),
            created_at: now.clone(),
            last_active: now,
        };
        self.db.upsert_user(&profile).await?;

        tracing::info!(uid = %auth.uid, "Profile created on first sign-in");
        Ok(profile)
    }

    /// Raise the seen-message watermark for a group and day key (or
    /// `_general`). The watermark is monotonic: a lower or equal count
    /// never writes.
    pub async fn mark_messages_read(
        &self,
        profile: &UserProfile,
        group_id: &str,
        key: &str,
        count: u32,
    ) -> Result<()> {
        if count == 0 || count <= profile.seen_count(group_id, key) {
            return Ok(());
        }

        let mut updated = profile.clone();
        updated
            .last_seen_messages
            .entry(group_id.to_string())
            .or_default()
            .insert(key.to_string(), count);

        self.db.set_user_last_seen(&updated).await
    }
}
