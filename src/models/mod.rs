// SPDX-License-Identifier: MIT

//! Data models for the application.

pub mod group;
pub mod user;

pub use group::{ConfirmedAttendee, DayMessage, DayMessages, Group, Member};
pub use user::{BlockedDay, ConfirmedPlan, UserProfile, GENERAL_CHAT_KEY};
