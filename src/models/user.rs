// SPDX-License-Identifier: MIT

//! User profile model.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Watermark key for the general chat inside `last_seen_messages`.
pub const GENERAL_CHAT_KEY: &str = "_general";

/// A user-level day block: the day is off-limits in every group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockedDay {
    #[serde(default)]
    pub reason: String,
    /// RFC3339
    pub blocked_at: String,
}

/// A user-level committed plan: this date belongs to this group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmedPlan {
    pub group_id: String,
    pub group_name: String,
    /// RFC3339
    pub confirmed_at: String,
}

/// User profile stored in `users/{uid}`.
///
/// Created on first authenticated request; the `uid` doubles as the
/// document ID.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserProfile {
    pub uid: String,
    pub display_name: String,
    pub photo_url: Option<String>,
    /// Codes of the groups the user belongs to
    #[serde(default)]
    pub groups: Vec<String>,
    /// date -> block entry. A blocked date can never be marked available.
    #[serde(default)]
    pub blocked_days: HashMap<String, BlockedDay>,
    /// date -> confirmed plan. At most one plan per date, enforced by overwrite.
    #[serde(default)]
    pub confirmed_plans: HashMap<String, ConfirmedPlan>,
    /// group id -> (date or "_general") -> messages-seen watermark
    #[serde(default)]
    pub last_seen_messages: HashMap<String, HashMap<String, u32>>,
    /// RFC3339
    pub created_at: String,
    /// RFC3339
    pub last_active: String,
}

impl UserProfile {
    pub fn is_blocked(&self, date: &str) -> bool {
        self.blocked_days.contains_key(date)
    }

    pub fn block_reason(&self, date: &str) -> Option<&str> {
        self.blocked_days.get(date).map(|b| b.reason.as_str())
    }

    pub fn confirmed_plan(&self, date: &str) -> Option<&ConfirmedPlan> {
        self.confirmed_plans.get(date)
    }

    /// Messages-seen watermark for a group and day key (0 if never read).
    pub fn seen_count(&self, group_id: &str, key: &str) -> u32 {
        self.last_seen_messages
            .get(group_id)
            .and_then(|per_day| per_day.get(key))
            .copied()
            .unwrap_or(0)
    }
}
