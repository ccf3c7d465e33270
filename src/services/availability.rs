// SPDX-License-Identifier: MIT

//! Availability toggling and cross-group conflict resolution.
//!
//! Marking a day available is the only guarded mutation in the system:
//! a blocked day is a hard stop, and a competing commitment (confirmed
//! plan or availability in another group) is surfaced as a conflict the
//! user may explicitly override. Unmarking is never guarded.

use crate::db::FirestoreDb;
use crate::error::{AppError, Result};
use crate::models::{Group, UserProfile};
use serde::{Deserialize, Serialize};

/// Whether to run the cross-group conflict check before marking.
///
/// `Override` is the explicit user choice after seeing the conflicts;
/// it bypasses conflict detection but NOT the day block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckMode {
    #[default]
    Enforce,
    Override,
}

/// Kind of competing commitment found for a date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConflictKind {
    /// The user already confirmed a plan for this date in another group
    ConfirmedElsewhere,
    /// The user is marked available for this date in another group
    AvailableElsewhere,
}

/// One detected conflict, with enough detail to present the override choice.
#[derive(Debug, Clone, Serialize)]
pub struct Conflict {
    pub kind: ConflictKind,
    pub group_id: String,
    pub group_name: String,
}

/// Outcome of an availability toggle.
///
/// Rejections are data, not errors: the HTTP layer returns them with a
/// 200 and the client decides what to ask the user.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum ToggleOutcome {
    /// The vote was flipped
    Toggled { now_available: bool },
    /// The day is blocked by the user; never bypassable
    Blocked,
    /// Competing commitments found; retry with `CheckMode::Override` to proceed
    Conflicts { conflicts: Vec<Conflict> },
}

/// Availability votes and stars for days in a group.
#[derive(Clone)]
pub struct AvailabilityService {
    db: FirestoreDb,
}

impl AvailabilityService {
    pub fn new(db: FirestoreDb) -> Self {
        Self { db }
    }

    /// Toggle the user's availability vote for `date` in a group.
    ///
    /// Conflict checks only run when the toggle would MARK the day and
    /// `mode` is `Enforce`. The block check runs on every mark attempt
    /// regardless of mode. Unmarking applies unconditionally.
    pub async fn toggle_availability(
        &self,
        profile: &UserProfile,
        group_id: &str,
        date: &str,
        mode: CheckMode,
    ) -> Result<ToggleOutcome> {
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

        let marking = !group.has_vote(date, &profile.uid);

        if marking {
            if profile.is_blocked(date) {
                return Ok(ToggleOutcome::Blocked);
            }

            if mode == CheckMode::Enforce {
                if let Some(conflict) = plan_conflict(profile, group_id, date) {
                    return Ok(ToggleOutcome::Conflicts {
                        conflicts: vec![conflict],
                    });
                }

                let conflicts = self.availability_conflicts(profile, group_id, date).await;
                if !conflicts.is_empty() {
                    return Ok(ToggleOutcome::Conflicts { conflicts });
                }
            }
        }

        apply_vote_toggle(&mut group, date, &profile.uid, marking);
        self.db.set_group_day_votes(group_id, &group, date).await?;

        tracing::info!(
            uid = %profile.uid,
            group_id,
            date,
            now_available = marking,
            "Availability toggled"
        );

        Ok(ToggleOutcome::Toggled {
            now_available: marking,
        })
    }

    /// Scan the user's OTHER groups for availability on `date`.
    ///
    /// Reads are sequential. A failed read degrades detection for that
    /// one group only; it is logged and skipped rather than aborting
    /// the whole check.
    async fn availability_conflicts(
        &self,
        profile: &UserProfile,
        target_group_id: &str,
        date: &str,
    ) -> Vec<Conflict> {
        let mut conflicts = Vec::new();

        for other_id in &profile.groups {
            if other_id == target_group_id {
                continue;
            }

            let other = match self.db.get_group(other_id).await {
                Ok(Some(g)) => g,
                Ok(None) => continue,
                Err(e) => {
                    tracing::warn!(
                        group_id = %other_id,
                        error = %e,
                        "Skipping group in conflict check (read failed)"
                    );
                    continue;
                }
            };

            if let Some(conflict) = availability_conflict_in(other_id, &other, &profile.uid, date) {
                conflicts.push(conflict);
            }
        }

        conflicts
    }

    /// Toggle the user's star on a date. Stars carry no commitments, so
    /// no checks apply.
    pub async fn toggle_star(
        &self,
        profile: &UserProfile,
        group_id: &str,
        date: &str,
    ) -> Result<bool> {
        let mut group = self
            .db
            .get_group(group_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Group {} not found", group_id)))?;

        let starred = group.stars_for(date).iter().any(|s| s == &profile.uid);
        if starred {
            if let Some(stars) = group.stars.get_mut(date) {
                stars.retain(|s| s != &profile.uid);
                if stars.is_empty() {
                    group.stars.remove(date);
                }
            }
        } else {
            group
                .stars
                .entry(date.to_string())
                .or_default()
                .push(profile.uid.clone());
        }

        self.db.set_group_day_stars(group_id, &group, date).await?;
        Ok(!starred)
    }
}

/// Conflict against the user's confirmed plan for `date`, if the plan
/// lives in a different group.
fn plan_conflict(profile: &UserProfile, target_group_id: &str, date: &str) -> Option<Conflict> {
    let plan = profile.confirmed_plan(date)?;
    if plan.group_id == target_group_id {
        return None;
    }
    Some(Conflict {
        kind: ConflictKind::ConfirmedElsewhere,
        group_id: plan.group_id.clone(),
        group_name: plan.group_name.clone(),
    })
}

/// Conflict against availability already marked in one other group.
fn availability_conflict_in(
    other_group_id: &str,
    other_group: &Group,
    uid: &str,
    date: &str,
) -> Option<Conflict> {
    if !other_group.has_vote(date, uid) {
        return None;
    }
    Some(Conflict {
        kind: ConflictKind::AvailableElsewhere,
        group_id: other_group_id.to_string(),
        group_name: other_group.display_name(other_group_id),
    })
}

/// Flip the uid's membership in `votes[date]`, dropping the key when
/// the last vote goes away so the sparse map stays clean.
pub(crate) fn apply_vote_toggle(group: &mut Group, date: &str, uid: &str, marking: bool) {
    if marking {
        group
            .votes
            .entry(date.to_string())
            .or_default()
            .push(uid.to_string());
    } else if let Some(votes) = group.votes.get_mut(date) {
        votes.retain(|v| v != uid);
        if votes.is_empty() {
            group.votes.remove(date);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConfirmedPlan, Member};
    use std::collections::HashMap;

    const DATE: &str = "2025-07-04";

    fn profile_in(groups: &[&str]) -> UserProfile {
        UserProfile {
            uid: "u1".to_string(),
            display_name: "Ana".to_string(),
            photo_url: None,
            groups: groups.iter().map(|g| g.to_string()).collect(),
            blocked_days: HashMap::new(),
            confirmed_plans: HashMap::new(),
            last_seen_messages: HashMap::new(),
            created_at: "2025-01-01T00:00:00Z".to_string(),
            last_active: "2025-01-01T00:00:00Z".to_string(),
        }
    }

    fn group_named(name: &str, votes: &[&str]) -> Group {
        let mut vote_map = HashMap::new();
        if !votes.is_empty() {
            vote_map.insert(
                DATE.to_string(),
                votes.iter().map(|v| v.to_string()).collect(),
            );
        }
        Group {
            name: name.to_string(),
            description: String::new(),
            members: vec![Member {
                uid: "u1".to_string(),
                name: "Ana".to_string(),
                photo_url: None,
            }],
            votes: vote_map,
            stars: HashMap::new(),
            messages: HashMap::new(),
            general_chat: vec![],
            confirmed_days: HashMap::new(),
            created_at: "2025-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_plan_in_other_group_conflicts() {
        let mut p = profile_in(&["AAA111", "BBB222"]);
        p.confirmed_plans.insert(
            DATE.to_string(),
            ConfirmedPlan {
                group_id: "BBB222".to_string(),
                group_name: "Escalada".to_string(),
                confirmed_at: "2025-06-01T00:00:00Z".to_string(),
            },
        );

        let conflict = plan_conflict(&p, "AAA111", DATE).expect("should conflict");
        assert_eq!(conflict.kind, ConflictKind::ConfirmedElsewhere);
        assert_eq!(conflict.group_id, "BBB222");
        assert_eq!(conflict.group_name, "Escalada");
    }

    #[test]
    fn test_plan_in_target_group_does_not_conflict() {
        let mut p = profile_in(&["AAA111"]);
        p.confirmed_plans.insert(
            DATE.to_string(),
            ConfirmedPlan {
                group_id: "AAA111".to_string(),
                group_name: "Test".to_string(),
                confirmed_at: "2025-06-01T00:00:00Z".to_string(),
            },
        );
        assert!(plan_conflict(&p, "AAA111", DATE).is_none());
    }

    #[test]
    fn test_no_plan_no_conflict() {
        let p = profile_in(&["AAA111"]);
        assert!(plan_conflict(&p, "AAA111", DATE).is_none());
    }

    #[test]
    fn test_availability_elsewhere_conflicts() {
        let other = group_named("Senderismo", &["u1"]);
        let conflict =
            availability_conflict_in("CCC333", &other, "u1", DATE).expect("should conflict");
        assert_eq!(conflict.kind, ConflictKind::AvailableElsewhere);
        assert_eq!(conflict.group_id, "CCC333");
        assert_eq!(conflict.group_name, "Senderismo");
    }

    #[test]
    fn test_unnamed_group_conflict_uses_code_fallback() {
        let mut other = group_named("", &["u1"]);
        other.name = String::new();
        let conflict = availability_conflict_in("CCC333", &other, "u1", DATE).unwrap();
        assert_eq!(conflict.group_name, "Grupo CCC333");
    }

    #[test]
    fn test_no_vote_elsewhere_no_conflict() {
        let other = group_named("Senderismo", &["u2"]);
        assert!(availability_conflict_in("CCC333", &other, "u1", DATE).is_none());
    }

    #[test]
    fn test_apply_vote_toggle_marks_and_unmarks() {
        let mut g = group_named("Test", &[]);
        apply_vote_toggle(&mut g, DATE, "u1", true);
        assert!(g.has_vote(DATE, "u1"));

        apply_vote_toggle(&mut g, DATE, "u1", false);
        assert!(!g.has_vote(DATE, "u1"));
        // Last vote removed -> key dropped, not left as an empty array
        assert!(!g.votes.contains_key(DATE));
    }

    #[test]
    fn test_apply_vote_toggle_keeps_other_votes() {
        let mut g = group_named("Test", &["u1", "u2"]);
        apply_vote_toggle(&mut g, DATE, "u1", false);
        assert!(!g.has_vote(DATE, "u1"));
        assert!(g.has_vote(DATE, "u2"));
    }

    #[test]
    fn test_check_mode_deserializes_lowercase() {
        assert_eq!(
            serde_json::from_str::<CheckMode>("\"enforce\"").unwrap(),
            CheckMode::Enforce
        );
        assert_eq!(
            serde_json::from_str::<CheckMode>("\"override\"").unwrap(),
            CheckMode::Override
        );
    }

    #[test]
    fn test_outcome_serializes_with_tag() {
        let json = serde_json::to_value(ToggleOutcome::Conflicts {
            conflicts: vec![Conflict {
                kind: ConflictKind::AvailableElsewhere,
                group_id: "CCC333".to_string(),
                group_name: "Senderismo".to_string(),
            }],
        })
        .unwrap();
        assert_eq!(json["result"], "conflicts");
        assert_eq!(json["conflicts"][0]["kind"], "available_elsewhere");
    }
}
