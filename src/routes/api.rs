// SPDX-License-Identifier: MIT

//! API routes for authenticated users.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Group, UserProfile, GENERAL_CHAT_KEY};
use crate::services::{compute_day_status, general_chat_unread, CheckMode, DayStatus, ToggleOutcome};
use crate::time_utils::is_valid_day_key;
use crate::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

/// API routes (require authentication via JWT).
/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/me", get(get_me))
        .route("/api/me/blocked-days/{date}", put(block_day).delete(unblock_day))
        .route("/api/groups", post(create_group))
        .route("/api/groups/join", post(join_group))
        .route("/api/groups/{id}", get(get_group).patch(update_group))
        .route("/api/groups/{id}/leave", post(leave_group))
        .route("/api/groups/{id}/chat/seen", post(mark_general_chat_seen))
        .route("/api/groups/{id}/days/{date}", get(get_day_status))
        .route(
            "/api/groups/{id}/days/{date}/availability",
            post(toggle_availability),
        )
        .route("/api/groups/{id}/days/{date}/star", post(toggle_star))
        .route(
            "/api/groups/{id}/days/{date}/confirm",
            post(confirm_plan).delete(cancel_plan),
        )
        .route("/api/groups/{id}/days/{date}/seen", post(mark_day_seen))
}

/// Load the caller's profile, bootstrapping it on first sight.
async fn require_profile(state: &AppState, auth: &AuthUser) -> Result<UserProfile> {
    match state.db.get_user(&auth.uid).await? {
        Some(profile) => Ok(profile),
        None => state.users.ensure_profile(auth).await,
    }
}

/// Reject malformed day keys before they touch the store.
fn check_date(date: &str) -> Result<()> {
    if is_valid_day_key(date) {
        Ok(())
    } else {
        Err(AppError::BadRequest(format!(
            "Invalid date '{}', expected YYYY-MM-DD",
            date
        )))
    }
}

fn check_payload<T: Validate>(payload: &T) -> Result<()> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))
}

// ─── User Profile ────────────────────────────────────────────

/// Get (or create) the current user's profile.
async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
) -> Result<Json<UserProfile>> {
    let profile = state.users.ensure_profile(&auth).await?;
    Ok(Json(profile))
}

// ─── Day Blocks ──────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct BlockDayRequest {
    #[serde(default)]
    #[validate(length(max = 200))]
    pub reason: String,
}

#[derive(Serialize)]
pub struct OkResponse {
    pub ok: bool,
}

/// Block a day across all groups, cascading vote removal.
async fn block_day(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(date): Path<String>,
    Json(payload): Json<BlockDayRequest>,
) -> Result<Json<OkResponse>> {
    check_date(&date)?;
    check_payload(&payload)?;

    let profile = require_profile(&state, &auth).await?;
    state.blocks.block_day(&profile, &date, &payload.reason).await?;
    Ok(Json(OkResponse { ok: true }))
}

/// Unblock a day. Previously removed votes are not restored.
async fn unblock_day(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(date): Path<String>,
) -> Result<Json<OkResponse>> {
    check_date(&date)?;

    let profile = require_profile(&state, &auth).await?;
    state.blocks.unblock_day(&profile, &date).await?;
    Ok(Json(OkResponse { ok: true }))
}

// ─── Groups ──────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
pub struct CreateGroupRequest {
    #[validate(length(min = 1, max = 60))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 300))]
    pub description: String,
}

#[derive(Serialize)]
pub struct GroupCreatedResponse {
    pub group_id: String,
}

async fn create_group(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<CreateGroupRequest>,
) -> Result<Json<GroupCreatedResponse>> {
    check_payload(&payload)?;

    let profile = require_profile(&state, &auth).await?;
    let group_id = state
        .groups
        .create_group(&profile, &payload.name, &payload.description)
        .await?;
    Ok(Json(GroupCreatedResponse { group_id }))
}

#[derive(Deserialize, Validate)]
pub struct JoinGroupRequest {
    #[validate(length(min = 4, max = 10))]
    pub code: String,
}

async fn join_group(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Json(payload): Json<JoinGroupRequest>,
) -> Result<Json<GroupCreatedResponse>> {
    check_payload(&payload)?;

    let profile = require_profile(&state, &auth).await?;
    let group_id = state.groups.join_group(&profile, &payload.code).await?;
    Ok(Json(GroupCreatedResponse { group_id }))
}

/// Full group document plus derived per-user fields.
#[derive(Serialize)]
pub struct GroupResponse {
    pub id: String,
    #[serde(flatten)]
    pub group: Group,
    pub general_chat_unread: u32,
}

async fn get_group(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(group_id): Path<String>,
) -> Result<Json<GroupResponse>> {
    let group = state
        .db
        .get_group(&group_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Group {} not found", group_id)))?;

    let profile = state.db.get_user(&auth.uid).await?;
    let general_chat_unread = general_chat_unread(&group_id, &group, profile.as_ref());

    Ok(Json(GroupResponse {
        id: group_id,
        group,
        general_chat_unread,
    }))
}

#[derive(Deserialize, Validate)]
pub struct UpdateGroupRequest {
    #[validate(length(min = 1, max = 60))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 300))]
    pub description: String,
}

async fn update_group(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(group_id): Path<String>,
    Json(payload): Json<UpdateGroupRequest>,
) -> Result<Json<OkResponse>> {
    check_payload(&payload)?;

    let profile = require_profile(&state, &auth).await?;
    state
        .groups
        .update_group_info(&profile, &group_id, &payload.name, &payload.description)
        .await?;
    Ok(Json(OkResponse { ok: true }))
}

async fn leave_group(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(group_id): Path<String>,
) -> Result<Json<OkResponse>> {
    let profile = require_profile(&state, &auth).await?;
    state.groups.leave_group(&profile, &group_id).await?;
    Ok(Json(OkResponse { ok: true }))
}

// ─── Day Status ──────────────────────────────────────────────

async fn get_day_status(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((group_id, date)): Path<(String, String)>,
) -> Result<Json<DayStatus>> {
    check_date(&date)?;

    let group = state
        .db
        .get_group(&group_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Group {} not found", group_id)))?;
    let profile = state.db.get_user(&auth.uid).await?;

    let status = compute_day_status(&date, &group_id, &group, profile.as_ref(), &auth.uid);
    Ok(Json(status))
}

// ─── Availability & Stars ────────────────────────────────────

#[derive(Deserialize, Default)]
pub struct ToggleAvailabilityRequest {
    #[serde(default)]
    pub mode: CheckMode,
}

/// Toggle availability. A 200 response carries the structured outcome;
/// rejections (blocked day, conflicts) are outcomes, not HTTP errors.
async fn toggle_availability(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((group_id, date)): Path<(String, String)>,
    Json(payload): Json<ToggleAvailabilityRequest>,
) -> Result<Json<ToggleOutcome>> {
    check_date(&date)?;

    let profile = require_profile(&state, &auth).await?;
    let outcome = state
        .availability
        .toggle_availability(&profile, &group_id, &date, payload.mode)
        .await?;
    Ok(Json(outcome))
}

#[derive(Serialize)]
pub struct StarResponse {
    pub starred: bool,
}

async fn toggle_star(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((group_id, date)): Path<(String, String)>,
) -> Result<Json<StarResponse>> {
    check_date(&date)?;

    let profile = require_profile(&state, &auth).await?;
    let starred = state
        .availability
        .toggle_star(&profile, &group_id, &date)
        .await?;
    Ok(Json(StarResponse { starred }))
}

// ─── Confirmed Plans ─────────────────────────────────────────

async fn confirm_plan(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((group_id, date)): Path<(String, String)>,
) -> Result<Json<OkResponse>> {
    check_date(&date)?;

    let profile = require_profile(&state, &auth).await?;
    state.plans.confirm_plan(&profile, &group_id, &date).await?;
    Ok(Json(OkResponse { ok: true }))
}

async fn cancel_plan(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((group_id, date)): Path<(String, String)>,
) -> Result<Json<OkResponse>> {
    check_date(&date)?;

    let profile = require_profile(&state, &auth).await?;
    state
        .plans
        .cancel_confirmed_plan(&profile, &group_id, &date)
        .await?;
    Ok(Json(OkResponse { ok: true }))
}

// ─── Seen Watermarks ─────────────────────────────────────────

#[derive(Deserialize)]
pub struct MarkSeenRequest {
    pub count: u32,
}

async fn mark_day_seen(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path((group_id, date)): Path<(String, String)>,
    Json(payload): Json<MarkSeenRequest>,
) -> Result<Json<OkResponse>> {
    check_date(&date)?;

    let profile = require_profile(&state, &auth).await?;
    state
        .users
        .mark_messages_read(&profile, &group_id, &date, payload.count)
        .await?;
    Ok(Json(OkResponse { ok: true }))
}

async fn mark_general_chat_seen(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<AuthUser>,
    Path(group_id): Path<String>,
    Json(payload): Json<MarkSeenRequest>,
) -> Result<Json<OkResponse>> {
    let profile = require_profile(&state, &auth).await?;
    state
        .users
        .mark_messages_read(&profile, &group_id, GENERAL_CHAT_KEY, payload.count)
        .await?;
    Ok(Json(OkResponse { ok: true }))
}
