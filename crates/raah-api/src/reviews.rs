use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use raah_db::models::ReviewRow;
use raah_db::queries::reviews::ReviewCreate;
use raah_types::api::{Claims, CreateReviewRequest, ReviewResponse};

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::{AppState, identity, parse_datetime, parse_uuid};

pub async fn create_review(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateReviewRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !(1..=5).contains(&req.rating) {
        return Err(ApiError::invalid_argument("Rating must be between 1 and 5"));
    }

    let job = state
        .db
        .get_job(&req.job_id.to_string())?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;
    if job.buyer.id != claims.sub.to_string() {
        return Err(ApiError::permission_denied("Only the job owner can review it"));
    }

    let consultant = state
        .db
        .get_consultant(&req.consultant_id.to_string())?
        .ok_or_else(|| ApiError::not_found("Consultant not found"))?;
    if consultant.user.id == claims.sub.to_string() {
        return Err(ApiError::invalid_argument("Cannot review your own job"));
    }

    let review_id = Uuid::new_v4();
    let outcome = state.db.create_review(
        &review_id.to_string(),
        &req.job_id.to_string(),
        &claims.sub.to_string(),
        &req.consultant_id.to_string(),
        req.rating,
        &req.comment,
    )?;
    if outcome == ReviewCreate::Duplicate {
        return Err(ApiError::conflict("Review already submitted for this job"));
    }

    let row = state
        .db
        .get_review(&review_id.to_string())?
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("review vanished after insert")))?;

    Ok(ApiResponse::success(StatusCode::CREATED, "Review submitted", map_review(&row)))
}

pub async fn reviews_by_consultant(
    State(state): State<AppState>,
    Path(consultant_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.db.reviews_by_consultant(&consultant_id.to_string())?;
    Ok(ApiResponse::success(
        StatusCode::OK,
        "Reviews fetched",
        rows.iter().map(map_review).collect::<Vec<_>>(),
    ))
}

pub async fn reviews_by_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.db.reviews_by_job(&job_id.to_string())?;
    Ok(ApiResponse::success(
        StatusCode::OK,
        "Reviews fetched",
        rows.iter().map(map_review).collect::<Vec<_>>(),
    ))
}

pub async fn delete_review(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let existing = state
        .db
        .get_review(&id.to_string())?
        .ok_or_else(|| ApiError::not_found("Review not found"))?;
    if existing.buyer.id != claims.sub.to_string() {
        return Err(ApiError::permission_denied("Cannot delete another buyer's review"));
    }

    state.db.delete_review(&id.to_string())?;
    Ok(ApiResponse::success(
        StatusCode::OK,
        "Review deleted",
        serde_json::json!({ "deleted": true }),
    ))
}

fn map_review(row: &ReviewRow) -> ReviewResponse {
    ReviewResponse {
        id: parse_uuid(&row.id, "review"),
        job_id: parse_uuid(&row.job_id, "job"),
        buyer: identity(&row.buyer),
        consultant_id: parse_uuid(&row.consultant_id, "consultant"),
        rating: row.rating,
        comment: row.comment.clone(),
        created_at: parse_datetime(&row.created_at),
    }
}
