// SPDX-License-Identifier: MIT

//! Database layer (Firestore).

pub mod firestore;

pub use firestore::FirestoreDb;

/// Collection names as constants.
pub mod collections {
    /// Group documents, keyed by 6-character group code
    pub const GROUPS: &str = "calendar_groups";
    /// User profiles, keyed by uid
    pub const USERS: &str = "users";
}
