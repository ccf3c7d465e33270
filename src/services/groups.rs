// SPDX-License-Identifier: MIT

//! Group lifecycle: create, join, leave, edit.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::{Group, Member, UserProfile};
use crate::time_utils::now_rfc3339;
use ring::rand::{SecureRandom, SystemRandom};
use std::collections::HashMap;

const CODE_LEN: usize = 6;
const CODE_ALPHABET: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Group lifecycle operations.
#[derive(Clone)]
pub struct GroupService {
    db: FirestoreDb,
}

impl GroupService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Create a group with the caller as its only member. Returns the
    /// generated group code.
    pub async fn create_group(
        &self,
        profile: &UserProfile,
        name: &str,
        description: &str,
    ) -> Result<String> {
        let group_id = generate_group_code()?;

        let group = Group {
            name: name.trim().to_string(),
            description: description.trim().to_string(),
            members: vec![Member {
                uid: profile.uid.clone(),
                name: profile.display_name.clone(),
                photo_url: profile.photo_url.clone(),
            }],
            votes: HashMap::new(),
            stars: HashMap::new(),
            messages: HashMap::new(),
            general_chat: vec![],
            confirmed_days: HashMap::new(),
            created_at: now_rfc3339(),
        };

        self.db.create_group(&group_id, &group).await?;

        let mut updated = profile.clone();
        updated.groups.push(group_id.clone());
        self.db.set_user_groups(&updated).await?;

        tracing::info!(uid = %profile.uid, group_id = %group_id, "Group created");
        Ok(group_id)
    }

    /// Join a group by code. Joining a group you already belong to is a
    /// no-op. Returns the normalized code.
    pub async fn join_group(&self, profile: &UserProfile, code: &str) -> Result<String> {
        let group_id = code.trim().to_uppercase();

        let mut group = self
            .db
            .get_group(&group_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Invalid group code".to_string()))?;

        if !group.is_member(&profile.uid) {
            group.members.push(Member {
                uid: profile.uid.clone(),
                name: profile.display_name.clone(),
                photo_url: profile.photo_url.clone(),
            });
            self.db.set_group_members(&group_id, &group).await?;
        }

        if !profile.groups.contains(&group_id) {
            let mut updated = profile.clone();
            updated.groups.push(group_id.clone());
            self.db.set_user_groups(&updated).await?;
        }

        tracing::info!(uid = %profile.uid, group_id = %group_id, "Group joined");
        Ok(group_id)
    }

    /// Leave a group: the member entry and every one of the user's
    /// votes go; the group itself stays for the remaining members.
    pub async fn leave_group(&self, profile: &UserProfile, group_id: &str) -> Result<()> {
        if let Some(mut group) = self.db.get_group(group_id).await? {
            group.members.retain(|m| m.uid != profile.uid);
            for votes in group.votes.values_mut() {
                votes.retain(|v| v != &profile.uid);
            }
            group.votes.retain(|_, votes| !votes.is_empty());
            self.db.set_group_membership(group_id, &group).await?;
        }

        let mut updated = profile.clone();
        updated.groups.retain(|g| g != group_id);
        self.db.set_user_groups(&updated).await?;

        tracing::info!(uid = %profile.uid, group_id, "Group left");
        Ok(())
    }

    /// Update a group's name and description. Members only.
    pub async fn update_group_info(
        &self,
        profile: &UserProfile,
        group_id: &str,
        name: &str,
        description: &str,
    ) -> Result<()> {
        let mut group = self
            .db
            .get_group(group_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Group {} not found", group_id)))?;

        if !group.is_member(&profile.uid) {
            return Err(AppError::BadRequest(
                "Not a member of this group".to_string(),
            ));
        }

        group.name = name.trim().to_string();
        group.description = description.trim().to_string();
        self.db.set_group_info(group_id, &group).await
    }
}

/// Generate a 6-character uppercase base-36 group code.
///
/// No collision check against existing groups; at expected scale the
/// probability is negligible.
fn generate_group_code() -> Result<String> {
    let rng = SystemRandom::new();
    let mut bytes = [0u8; CODE_LEN];
    rng.fill(&mut bytes)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("RNG failure generating group code")))?;

    Ok(bytes
        .iter()
        .map(|b| CODE_ALPHABET[*b as usize % CODE_ALPHABET.len()] as char)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group_code_shape() {
        for _ in 0..50 {
            let code = generate_group_code().unwrap();
            assert_eq!(code.len(), CODE_LEN);
            assert!(code
                .chars()
                .all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
        }
    }

    #[test]
    fn test_group_codes_vary() {
        let a = generate_group_code().unwrap();
        let b = generate_group_code().unwrap();
        // 36^6 possibilities; two identical draws mean a broken RNG
        assert_ne!(a, b);
    }
}
