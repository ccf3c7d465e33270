// SPDX-License-Identifier: MIT

//! User-level day blocks.
//!
//! A block marks a date off-limits across ALL groups. Blocking writes
//! the profile entry first (authoritative), then fans out over the
//! user's groups removing any availability vote for that date. The
//! fan-out is best effort: a failed group write leaves the day blocked
//! and is logged, not retried.

use crate::db::FirestoreDb;
use crate::error::Result;
use crate::models::{BlockedDay, UserProfile};
use crate::time_utils::now_rfc3339;

/// Blocks and unblocks days on the user profile, cascading into groups.
#[derive(Clone)]
pub struct BlockService {
    db: FirestoreDb,
}

impl BlockService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Block `date` for the user and strip their votes for it everywhere.
    pub async fn block_day(&self, profile: &UserProfile, date: &str, reason: &str) -> Result<()> {
        let mut updated = profile.clone();
        updated.blocked_days.insert(
            date.to_string(),
            BlockedDay {
                reason: reason.trim().to_string(),
                blocked_at: now_rfc3339(),
            },
        );

        // Profile first: the block must hold even if every group write
        // below fails.
        self.db.set_user_blocked_days(&updated).await?;

        let removed = self.remove_votes_everywhere(profile, date).await;

        tracing::info!(
            uid = %profile.uid,
            date,
            groups_cleared = removed,
            "Day blocked"
        );

        Ok(())
    }

    /// Remove the block for `date`. Votes removed by the block cascade
    /// are NOT restored; re-marking availability is a manual action.
    pub async fn unblock_day(&self, profile: &UserProfile, date: &str) -> Result<()> {
        let mut updated = profile.clone();
        if updated.blocked_days.remove(date).is_none() {
            return Ok(());
        }

        self.db.set_user_blocked_days(&updated).await?;

        tracing::info!(uid = %profile.uid, date, "Day unblocked");
        Ok(())
    }

    /// Best-effort removal of the user's vote for `date` in every group
    /// they belong to. Returns how many groups were actually cleared.
    async fn remove_votes_everywhere(&self, profile: &UserProfile, date: &str) -> usize {
        let mut removed = 0;

        for group_id in &profile.groups {
            match self.db.get_group(group_id).await {
                Ok(Some(mut group)) => {
                    if !group.has_vote(date, &profile.uid) {
                        continue;
                    }
                    super::availability::apply_vote_toggle(&mut group, date, &profile.uid, false);
                    match self.db.set_group_day_votes(group_id, &group, date).await {
                        Ok(()) => removed += 1,
                        Err(e) => {
                            tracing::warn!(
                                group_id = %group_id,
                                date,
                                error = %e,
                                "Failed to remove vote during block cascade"
                            );
                        }
                    }
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(
                        group_id = %group_id,
                        date,
                        error = %e,
                        "Failed to read group during block cascade"
                    );
                }
            }
        }

        removed
    }
}
