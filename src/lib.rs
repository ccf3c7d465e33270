// SPDX-License-Identifier: MIT

//! AgendaGrupal: coordinate group availability across shared calendars.
//!
//! This crate provides the backend API for the group planner: members
//! vote on calendar days, day status aggregates into a traffic light,
//! and blocks/confirmed plans keep one user's commitments consistent
//! across all their groups.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::FirestoreDb;
use services::{AvailabilityService, BlockService, GroupService, PlanService, UserService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: FirestoreDb,
    pub availability: AvailabilityService,
    pub blocks: BlockService,
    pub plans: PlanService,
    pub groups: GroupService,
    pub users: UserService,
}

impl AppState {
    /// Wire up the service layer around one database handle.
    pub fn new(config: Config, db: FirestoreDb) -> Self {
        Self {
            config,
            availability: AvailabilityService::new(db.clone()),
            blocks: BlockService::new(db.clone()),
            plans: PlanService::new(db.clone()),
            groups: GroupService::new(db.clone()),
            users: UserService::new(db.clone()),
            db,
        }
    }
}
