// SPDX-License-Identifier: MIT

//! Confirmed plans.
//!
//! Confirming promotes mere availability into a commitment: the profile
//! records which group owns the date (at most one plan per date,
//! enforced by overwrite), the group records the attendee, and the
//! user's availability in every OTHER group is cascaded away so they
//! never appear double-booked. The cascade shares the best-effort
//! semantics of the block cascade.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::{ConfirmedAttendee, ConfirmedPlan, UserProfile};
use crate::time_utils::now_rfc3339;

/// Confirms and cancels plans, cascading vote removal.
#[derive(Clone)]
pub struct PlanService {
    db: FirestoreDb,
}

impl PlanService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Commit the user to `date` in this group.
    pub async fn confirm_plan(
        &self,
        profile: &UserProfile,
        group_id: &str,
        date: &str,
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

        let now = now_rfc3339();

        // Profile entry first. Overwriting keeps the one-plan-per-date
        // invariant: confirming in a second group for the same date
        // replaces the record, never appends.
        let mut updated = profile.clone();
        updated.confirmed_plans.insert(
            date.to_string(),
            ConfirmedPlan {
                group_id: group_id.to_string(),
                group_name: group.display_name(group_id),
                confirmed_at: now.clone(),
            },
        );
        self.db.set_user_confirmed_plans(&updated).await?;

        // Group-side attendee list is uid-unique but shared: other
        // members' confirmations stay untouched.
        let attendees = group.confirmed_days.entry(date.to_string()).or_default();
        attendees.retain(|a| a.uid != profile.uid);
        attendees.push(ConfirmedAttendee {
            uid: profile.uid.clone(),
            name: profile.display_name.clone(),
            photo_url: profile.photo_url.clone(),
            confirmed_at: now,
        });
        self.db.set_group_day_confirmed(group_id, &group, date).await?;

        let cleared = self.cascade_vote_removal(profile, group_id, date).await;

        tracing::info!(
            uid = %profile.uid,
            group_id,
            date,
            other_groups_cleared = cleared,
            "Plan confirmed"
        );

        Ok(())
    }

    /// Withdraw the user's confirmation for `date` in this group.
    ///
    /// Votes cascaded away at confirmation time are not restored.
    pub async fn cancel_confirmed_plan(
        &self,
        profile: &UserProfile,
        group_id: &str,
        date: &str,
    ) -> Result<()> {
        let mut updated = profile.clone();
        updated.confirmed_plans.remove(date);
        self.db.set_user_confirmed_plans(&updated).await?;

        let mut group = self
            .db
            .get_group(group_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Group {} not found", group_id)))?;

        if let Some(attendees) = group.confirmed_days.get_mut(date) {
            attendees.retain(|a| a.uid != profile.uid);
            // Drop the date key entirely rather than keeping an empty list
            if attendees.is_empty() {
                group.confirmed_days.remove(date);
            }
            self.db.set_group_day_confirmed(group_id, &group, date).await?;
        }

        tracing::info!(uid = %profile.uid, group_id, date, "Plan cancelled");
        Ok(())
    }

    /// Remove the user's vote for `date` from every group EXCEPT the
    /// one they just committed to. Best effort, same as the block
    /// cascade: failures are logged and skipped.
    async fn cascade_vote_removal(
        &self,
        profile: &UserProfile,
        confirmed_group_id: &str,
        date: &str,
    ) -> usize {
        let mut cleared = 0;

        for group_id in &profile.groups {
            if group_id == confirmed_group_id {
                continue;
            }

            match self.db.get_group(group_id).await {
                Ok(Some(mut group)) => {
                    if !group.has_vote(date, &profile.uid) {
                        continue;
                    }
                    super::availability::apply_vote_toggle(&mut group, date, &profile.uid, false);
                    match self.db.set_group_day_votes(group_id, &group, date).await {
                        Ok(()) => cleared += 1,
                        Err(e) => {
                            tracing::warn!(
                                group_id = %group_id,
                                date,
                                error = %e,
                                "Failed to remove vote during confirm cascade"
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
                        "Failed to read group during confirm cascade"
                    );
                }
            }
        }

        cleared
    }
}
