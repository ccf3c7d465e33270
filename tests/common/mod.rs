// SPDX-License-Identifier: MIT

use agenda_grupal::config::Config;
use agenda_grupal::db::FirestoreDb;
use agenda_grupal::models::{Group, Member, UserProfile};
use agenda_grupal::routes::create_router;
use agenda_grupal::AppState;
use std::collections::HashMap;
use std::sync::Arc;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Create a mock database connection (offline).
#[allow(dead_code)]
pub fn test_db_offline() -> FirestoreDb {
    FirestoreDb::new_mock()
}

/// Create a test app with offline mock dependencies.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    let config = Config::test_default();
    let state = Arc::new(AppState::new(config, test_db_offline()));
    (create_router(state.clone()), state)
}

/// Mint a session JWT the way the auth layer expects it.
#[allow(dead_code)]
pub fn create_test_jwt(uid: &str, signing_key: &[u8]) -> String {
    agenda_grupal::middleware::auth::create_jwt(uid, Some("Test User"), None, signing_key)
        .expect("JWT creation failed")
}

/// Unique suffix for test isolation against a shared emulator.
#[allow(dead_code)]
pub fn unique_suffix() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    format!(
        "{}",
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    )
}

/// Build a profile fixture belonging to the given groups.
#[allow(dead_code)]
pub fn test_profile(uid: &str, groups: &[&str]) -> UserProfile {
    UserProfile {
        uid: uid.to_string(),
        display_name: "Test User".to_string(),
        photo_url: None,
        groups: groups.iter().map(|g| g.to_string()).collect(),
        blocked_days: HashMap::new(),
        confirmed_plans: HashMap::new(),
        last_seen_messages: HashMap::new(),
        created_at: "2025-01-01T00:00:00Z".to_string(),
        last_active: "2025-01-01T00:00:00Z".to_string(),
    }
}

/// Build a group fixture with the given members.
#[allow(dead_code)]
pub fn test_group(name: &str, member_uids: &[&str]) -> Group {
    Group {
        name: name.to_string(),
        description: String::new(),
        members: member_uids
            .iter()
            .map(|uid| Member {
                uid: uid.to_string(),
                name: format!("User {}", uid),
                photo_url: None,
            })
            .collect(),
        votes: HashMap::new(),
        stars: HashMap::new(),
        messages: HashMap::new(),
        general_chat: vec![],
        confirmed_days: HashMap::new(),
        created_at: "2025-01-01T00:00:00Z".to_string(),
    }
}
