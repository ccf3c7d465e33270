// SPDX-License-Identifier: MIT

//! Day status engine.
//!
//! Computes the traffic-light status of one calendar day for one user
//! in one group, from the group document and the user profile. Pure:
//! no store access, no clock, no side effects. Everything the UI shows
//! for a day cell comes out of this one function.

use crate::models::{ConfirmedAttendee, ConfirmedPlan, Group, UserProfile};
use serde::Serialize;

/// Traffic-light classification for a day.
///
/// Priority: a user-level block overrides everything; otherwise green
/// needs full turnout with at least one vote, yellow needs at least
/// half, red is the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DayStatusType {
    Blocked,
    Green,
    Yellow,
    Red,
}

/// Aggregate status of one day, as seen by one user.
#[derive(Debug, Clone, Serialize)]
pub struct DayStatus {
    pub status_type: DayStatusType,
    pub vote_count: u32,
    pub total_members: u32,
    /// vote_count / total_members, 0 for memberless groups (never NaN)
    pub percentage: f64,
    pub is_user_available: bool,
    pub is_starred: bool,
    pub star_count: u32,
    pub is_blocked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<String>,
    /// The user's confirmed plan for this date is in THIS group
    pub is_confirmed_here: bool,
    /// The user's confirmed plan for this date is in another group
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirmed_elsewhere: Option<ConfirmedPlan>,
    pub confirmed_attendees: Vec<ConfirmedAttendee>,
    pub confirmed_count: u32,
    pub message_count: u32,
    pub has_my_message: bool,
    pub unread_count: u32,
}

/// Compute the status of `date` in `group` as seen by the user `uid`.
///
/// `profile` may be absent (freshly signed-in user whose profile read
/// raced the group read); absent profile state reads as "no blocks, no
/// plans, nothing seen".
pub fn compute_day_status(
    date: &str,
    group_id: &str,
    group: &Group,
    profile: Option<&UserProfile>,
    uid: &str,
) -> DayStatus {
    let total_members = group.members.len() as u32;
    let votes = group.votes_for(date);
    let vote_count = votes.len() as u32;
    let percentage = if total_members > 0 {
        f64::from(vote_count) / f64::from(total_members)
    } else {
        0.0
    };

    let is_user_available = votes.iter().any(|v| v == uid);

    let stars = group.stars_for(date);
    let star_count = stars.len() as u32;
    let is_starred = stars.iter().any(|s| s == uid);

    let message_count = group.message_count_for(date);
    let has_my_message = group
        .messages
        .get(date)
        .map(|m| m.has_message_from(uid))
        .unwrap_or(false);

    let is_blocked = profile.is_some_and(|p| p.is_blocked(date));
    let block_reason = profile
        .and_then(|p| p.block_reason(date))
        .map(str::to_string);

    let plan = profile.and_then(|p| p.confirmed_plan(date));
    let is_confirmed_here = plan.is_some_and(|p| p.group_id == group_id);
    let confirmed_elsewhere = plan.filter(|p| p.group_id != group_id).cloned();

    let confirmed_attendees = group.confirmed_for(date).to_vec();
    let confirmed_count = confirmed_attendees.len() as u32;

    let seen = profile.map(|p| p.seen_count(group_id, date)).unwrap_or(0);
    let unread_count = message_count.saturating_sub(seen);

    // Integer comparisons, so full turnout is exact rather than a
    // float equality check.
    let status_type = if is_blocked {
        DayStatusType::Blocked
    } else if vote_count > 0 && vote_count == total_members {
        DayStatusType::Green
    } else if total_members > 0 && vote_count * 2 >= total_members {
        DayStatusType::Yellow
    } else {
        DayStatusType::Red
    };

    DayStatus {
        status_type,
        vote_count,
        total_members,
        percentage,
        is_user_available,
        is_starred,
        star_count,
        is_blocked,
        block_reason,
        is_confirmed_here,
        confirmed_elsewhere,
        confirmed_attendees,
        confirmed_count,
        message_count,
        has_my_message,
        unread_count,
    }
}

/// Unread count for a group's general chat.
pub fn general_chat_unread(group_id: &str, group: &Group, profile: Option<&UserProfile>) -> u32 {
    use crate::models::GENERAL_CHAT_KEY;

    let total = group.general_chat.len() as u32;
    let seen = profile
        .map(|p| p.seen_count(group_id, GENERAL_CHAT_KEY))
        .unwrap_or(0);
    total.saturating_sub(seen)
}
