// SPDX-License-Identifier: MIT

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Groups (shared calendars: members, votes, stars, confirmed days)
//! - Users (profiles: memberships, blocks, confirmed plans, watermarks)
//!
//! All partial writes go through field masks so concurrent edits to
//! unrelated fields of the same document are never clobbered. Per-day
//! entries of the vote/star/confirmed maps are addressed individually
//! (`votes.2025-06-01`), so two members toggling different dates never
//! race on the whole map. Entries themselves are read-modify-write
//! without optimistic locking; last write wins at field-path
//! granularity.

use crate::db::collections;
use crate::error::AppError;
use crate::models::{Group, UserProfile};
use firestore::paths;

/// Field path for one day's entry in a map field.
///
/// Day keys contain `-`, so the segment needs backtick quoting per the
/// Firestore field-path grammar.
fn day_field(map: &str, date: &str) -> String {
    format!("{}.`{}`", map, date)
}

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // If the emulator environment variable is set, use unauthenticated connection
        // to avoid local credential warnings and leakage.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Write only the named top-level fields of a group document.
    async fn update_group_fields(
        &self,
        group_id: &str,
        group: &Group,
        fields: Vec<String>,
    ) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(fields)
            .in_col(collections::GROUPS)
            .document_id(group_id)
            .object(group)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Write only the named top-level fields of a user profile.
    async fn update_user_fields(
        &self,
        profile: &UserProfile,
        fields: Vec<String>,
    ) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .fields(fields)
            .in_col(collections::USERS)
            .document_id(&profile.uid)
            .object(profile)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    // ─── Group Operations ────────────────────────────────────────

    /// Get a group by its code.
    pub async fn get_group(&self, group_id: &str) -> Result<Option<Group>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::GROUPS)
            .obj()
            .one(group_id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a group document (whole-document write).
    pub async fn create_group(&self, group_id: &str, group: &Group) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::GROUPS)
            .document_id(group_id)
            .object(group)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Write one day's entry of a group's `votes` map.
    ///
    /// Masking the per-date path keeps concurrent toggles on OTHER
    /// dates intact even when this caller's snapshot predates them.
    /// When the date key is absent from `group` (last vote removed),
    /// the masked write deletes the field on the server.
    pub async fn set_group_day_votes(
        &self,
        group_id: &str,
        group: &Group,
        date: &str,
    ) -> Result<(), AppError> {
        self.update_group_fields(group_id, group, vec![day_field("votes", date)])
            .await
    }

    /// Write one day's entry of a group's `stars` map.
    pub async fn set_group_day_stars(
        &self,
        group_id: &str,
        group: &Group,
        date: &str,
    ) -> Result<(), AppError> {
        self.update_group_fields(group_id, group, vec![day_field("stars", date)])
            .await
    }

    /// Write one day's entry of a group's `confirmed_days` map.
    pub async fn set_group_day_confirmed(
        &self,
        group_id: &str,
        group: &Group,
        date: &str,
    ) -> Result<(), AppError> {
        self.update_group_fields(group_id, group, vec![day_field("confirmed_days", date)])
            .await
    }

    /// Write a group's member list.
    pub async fn set_group_members(&self, group_id: &str, group: &Group) -> Result<(), AppError> {
        self.update_group_fields(group_id, group, paths!(Group::{members}))
            .await
    }

    /// Write a group's member list and votes together (used by leave,
    /// which strips the member and their votes on every date in one
    /// step, so the whole-map mask is intentional here).
    pub async fn set_group_membership(
        &self,
        group_id: &str,
        group: &Group,
    ) -> Result<(), AppError> {
        self.update_group_fields(group_id, group, paths!(Group::{members, votes}))
            .await
    }

    /// Write a group's name and description.
    pub async fn set_group_info(&self, group_id: &str, group: &Group) -> Result<(), AppError> {
        self.update_group_fields(group_id, group, paths!(Group::{name, description}))
            .await
    }

    // ─── User Operations ─────────────────────────────────────────

    /// Get a user profile by uid.
    pub async fn get_user(&self, uid: &str) -> Result<Option<UserProfile>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collections::USERS)
            .obj()
            .one(uid)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or fully overwrite a user profile.
    pub async fn upsert_user(&self, profile: &UserProfile) -> Result<(), AppError> {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collections::USERS)
            .document_id(&profile.uid)
            .object(profile)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Write a user's group membership list.
    pub async fn set_user_groups(&self, profile: &UserProfile) -> Result<(), AppError> {
        self.update_user_fields(profile, paths!(UserProfile::{groups}))
            .await
    }

    /// Write a user's blocked-days map.
    pub async fn set_user_blocked_days(&self, profile: &UserProfile) -> Result<(), AppError> {
        self.update_user_fields(profile, paths!(UserProfile::{blocked_days}))
            .await
    }

    /// Write a user's confirmed-plans map.
    pub async fn set_user_confirmed_plans(&self, profile: &UserProfile) -> Result<(), AppError> {
        self.update_user_fields(profile, paths!(UserProfile::{confirmed_plans}))
            .await
    }

    /// Write a user's seen-message watermarks.
    pub async fn set_user_last_seen(&self, profile: &UserProfile) -> Result<(), AppError> {
        self.update_user_fields(profile, paths!(UserProfile::{last_seen_messages}))
            .await
    }

    /// Refresh the mutable identity fields on sign-in.
    pub async fn set_user_identity(&self, profile: &UserProfile) -> Result<(), AppError> {
        self.update_user_fields(
            profile,
            paths!(UserProfile::{display_name, photo_url, last_active}),
        )
        .await
    }
}
