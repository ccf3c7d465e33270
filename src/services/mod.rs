// SPDX-License-Identifier: MIT

//! Services module - business logic layer.

pub mod availability;
pub mod blocks;
pub mod day_status;
pub mod groups;
pub mod plans;
pub mod users;

pub use availability::{AvailabilityService, CheckMode, Conflict, ConflictKind, ToggleOutcome};
pub use blocks::BlockService;
pub use day_status::{compute_day_status, general_chat_unread, DayStatus, DayStatusType};
pub use groups::GroupService;
pub use plans::PlanService;
pub use users::UserService;
