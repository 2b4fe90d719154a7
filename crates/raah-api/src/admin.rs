use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use raah_types::api::AdminStats;
use raah_types::models::{AccountType, Verification};

use crate::consultants::map_consultant;
use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::{AppState, user_public};

// Admin surface is unauthenticated in this version.
// TODO: put require_auth plus a role check in front of these routes before
// exposing the service outside the trusted network.

pub async fn get_all_users(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let rows = state.db.list_users()?;
    Ok(ApiResponse::success(
        StatusCode::OK,
        "Users fetched",
        rows.iter().map(user_public).collect::<Vec<_>>(),
    ))
}

pub async fn get_users_by_account_type(
    State(state): State<AppState>,
    Path(account_type): Path<AccountType>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.db.list_users_by_account_type(account_type.as_str())?;
    Ok(ApiResponse::success(
        StatusCode::OK,
        "Users fetched",
        rows.iter().map(user_public).collect::<Vec<_>>(),
    ))
}

pub async fn ban_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    set_banned(&state, user_id, true).await
}

pub async fn unban_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    set_banned(&state, user_id, false).await
}

async fn set_banned(
    state: &AppState,
    user_id: Uuid,
    banned: bool,
) -> Result<(StatusCode, axum::Json<crate::response::ApiResponse<raah_types::api::UserPublic>>), ApiError>
{
    if !state.db.set_user_banned(&user_id.to_string(), banned)? {
        return Err(ApiError::not_found("User not found"));
    }
    let user = state
        .db
        .get_user_by_id(&user_id.to_string())?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    let message = if banned { "User banned" } else { "User unbanned" };
    Ok(ApiResponse::success(StatusCode::OK, message, user_public(&user)))
}

pub async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.db.delete_user(&user_id.to_string())? {
        return Err(ApiError::not_found("User not found"));
    }
    Ok(ApiResponse::success(
        StatusCode::OK,
        "User deleted",
        serde_json::json!({ "deleted": true }),
    ))
}

pub async fn get_pending_consultants(
    State(state): State<AppState>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.db.pending_consultants()?;
    Ok(ApiResponse::success(
        StatusCode::OK,
        "Pending consultants fetched",
        rows.iter().map(map_consultant).collect::<Vec<_>>(),
    ))
}

pub async fn verify_consultant(
    State(state): State<AppState>,
    Path(consultant_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    settle_verification(&state, consultant_id, Verification::Verified, "Consultant verified").await
}

pub async fn decline_consultant(
    State(state): State<AppState>,
    Path(consultant_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    settle_verification(&state, consultant_id, Verification::Declined, "Consultant declined").await
}

async fn settle_verification(
    state: &AppState,
    consultant_id: Uuid,
    verification: Verification,
    message: &str,
) -> Result<
    (StatusCode, axum::Json<crate::response::ApiResponse<raah_types::api::ConsultantResponse>>),
    ApiError,
> {
    if !state
        .db
        .set_consultant_verification(&consultant_id.to_string(), verification.as_str())?
    {
        return Err(ApiError::not_found("Consultant not found"));
    }
    let row = state
        .db
        .get_consultant(&consultant_id.to_string())?
        .ok_or_else(|| ApiError::not_found("Consultant not found"))?;

    Ok(ApiResponse::success(StatusCode::OK, message, map_consultant(&row)))
}

pub async fn get_admin_stats(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let stats = state.db.admin_stats()?;
    Ok(ApiResponse::success(
        StatusCode::OK,
        "Stats fetched",
        AdminStats {
            total_users: stats.total_users,
            total_buyers: stats.total_buyers,
            total_consultants: stats.total_consultants,
            verified_consultants: stats.verified_consultants,
            pending_consultants: stats.pending_consultants,
            total_jobs: stats.total_jobs,
            open_jobs: stats.open_jobs,
            total_proposals: stats.total_proposals,
            total_reviews: stats.total_reviews,
            total_messages: stats.total_messages,
        },
    ))
}
