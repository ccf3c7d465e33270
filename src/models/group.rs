// SPDX-License-Identifier: MIT

//! Group document model.
//!
//! A group is one shared calendar: its members, their per-day
//! availability votes, stars, day-thread messages and confirmed
//! attendees. All per-day maps are keyed by `YYYY-MM-DD` strings and
//! are sparse: absent keys mean "nothing recorded for that day".

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A user's participation record within one group.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub uid: String,
    pub name: String,
    pub photo_url: Option<String>,
}

/// One message in a day thread or the general chat.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayMessage {
    pub uid: String,
    pub name: String,
    pub photo_url: Option<String>,
    pub text: String,
    /// RFC3339
    pub timestamp: String,
}

/// Messages stored for one day.
///
/// Old documents hold a `{uid: text}` map (one message per member);
/// newer ones hold an ordered array. Both shapes stay readable: we
/// count them rather than migrating on read.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DayMessages {
    Thread(Vec<DayMessage>),
    Legacy(HashMap<String, String>),
}

impl DayMessages {
    pub fn count(&self) -> u32 {
        match self {
            DayMessages::Thread(msgs) => msgs.len() as u32,
            DayMessages::Legacy(map) => map.len() as u32,
        }
    }

    pub fn has_message_from(&self, uid: &str) -> bool {
        match self {
            DayMessages::Thread(msgs) => msgs.iter().any(|m| m.uid == uid),
            DayMessages::Legacy(map) => map.contains_key(uid),
        }
    }
}

/// One member's confirmed attendance for a day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmedAttendee {
    pub uid: String,
    pub name: String,
    pub photo_url: Option<String>,
    /// RFC3339
    pub confirmed_at: String,
}

/// Group document stored in `calendar_groups/{code}`.
///
/// The document ID is the 6-character group code; it is not repeated
/// inside the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub members: Vec<Member>,
    /// date -> uids available that day
    #[serde(default)]
    pub votes: HashMap<String, Vec<String>>,
    /// date -> uids who starred the day
    #[serde(default)]
    pub stars: HashMap<String, Vec<String>>,
    /// date -> day-thread messages (current or legacy shape)
    #[serde(default)]
    pub messages: HashMap<String, DayMessages>,
    #[serde(default)]
    pub general_chat: Vec<DayMessage>,
    /// date -> members who confirmed the plan for that day
    #[serde(default)]
    pub confirmed_days: HashMap<String, Vec<ConfirmedAttendee>>,
    /// RFC3339
    pub created_at: String,
}

impl Group {
    /// Votes recorded for a day; absent entries read as empty.
    pub fn votes_for(&self, date: &str) -> &[String] {
        self.votes.get(date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn has_vote(&self, date: &str, uid: &str) -> bool {
        self.votes_for(date).iter().any(|v| v == uid)
    }

    pub fn stars_for(&self, date: &str) -> &[String] {
        self.stars.get(date).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn confirmed_for(&self, date: &str) -> &[ConfirmedAttendee] {
        self.confirmed_days
            .get(date)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn is_member(&self, uid: &str) -> bool {
        self.members.iter().any(|m| m.uid == uid)
    }

    pub fn message_count_for(&self, date: &str) -> u32 {
        self.messages.get(date).map(DayMessages::count).unwrap_or(0)
    }

    /// Display name, falling back to the group code for unnamed groups.
    pub fn display_name(&self, group_id: &str) -> String {
        if self.name.trim().is_empty() {
            format!("Grupo {}", group_id)
        } else {
            self.name.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn group_with_votes(date: &str, uids: &[&str]) -> Group {
        let mut votes = HashMap::new();
        votes.insert(
            date.to_string(),
            uids.iter().map(|u| u.to_string()).collect(),
        );
        Group {
            name: "Test".to_string(),
            description: String::new(),
            members: vec![],
            votes,
            stars: HashMap::new(),
            messages: HashMap::new(),
            general_chat: vec![],
            confirmed_days: HashMap::new(),
            created_at: "2025-01-01T00:00:00Z".to_string(),
        }
    }

    #[test]
    fn test_votes_for_missing_date_is_empty() {
        let group = group_with_votes("2025-06-01", &["a"]);
        assert!(group.votes_for("2025-06-02").is_empty());
        assert!(!group.has_vote("2025-06-02", "a"));
        assert!(group.has_vote("2025-06-01", "a"));
    }

    #[test]
    fn test_legacy_messages_count() {
        let legacy: DayMessages = serde_json::from_value(serde_json::json!({
            "uid-1": "nos vemos!",
            "uid-2": "yo llego tarde"
        }))
        .unwrap();
        assert_eq!(legacy.count(), 2);
        assert!(legacy.has_message_from("uid-1"));
        assert!(!legacy.has_message_from("uid-3"));
    }

    #[test]
    fn test_thread_messages_count() {
        let thread: DayMessages = serde_json::from_value(serde_json::json!([
            {"uid": "uid-1", "name": "Ana", "photo_url": null,
             "text": "hola", "timestamp": "2025-06-01T10:00:00Z"}
        ]))
        .unwrap();
        assert_eq!(thread.count(), 1);
        assert!(thread.has_message_from("uid-1"));
    }

    #[test]
    fn test_display_name_fallback() {
        let mut group = group_with_votes("2025-06-01", &[]);
        group.name = "  ".to_string();
        assert_eq!(group.display_name("ABC123"), "Grupo ABC123");
        group.name = "Escalada".to_string();
        assert_eq!(group.display_name("ABC123"), "Escalada");
    }
}
