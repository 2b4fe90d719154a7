use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use raah_db::models::ProposalRow;
use raah_db::queries::proposals::ProposalCreate;
use raah_types::api::{
    Budget, Claims, ConsultantBrief, CreateProposalRequest, JobBrief, ProposalListResponse,
    ProposalResponse, UpdateProposalRequest,
};
use raah_types::models::{JobStatus, ProposalStatus};

use crate::error::ApiError;
use crate::response::{ApiResponse, paginate};
use crate::{AppState, identity, parse_datetime, parse_job_status, parse_proposal_status, parse_uuid};

#[derive(Debug, Deserialize)]
pub struct ProposalQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub status: Option<ProposalStatus>,
}

fn default_page() -> u64 {
    1
}

fn default_limit() -> u64 {
    20
}

pub async fn create_proposal(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateProposalRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let job = state
        .db
        .get_job(&req.job_id.to_string())?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;
    if parse_job_status(&job.status) != JobStatus::Open {
        return Err(ApiError::invalid_argument("Job is not open for proposals"));
    }
    if job.buyer.id == claims.sub.to_string() {
        return Err(ApiError::invalid_argument("Cannot submit a proposal to your own job"));
    }

    // The bidder is resolved from the token; only consultants hold a record.
    let consultant = state
        .db
        .get_consultant_by_user(&claims.sub.to_string())?
        .ok_or_else(|| ApiError::not_found("Consultant profile not found"))?;

    let proposal_id = Uuid::new_v4();
    let outcome = state.db.create_proposal(
        &proposal_id.to_string(),
        &req.job_id.to_string(),
        &consultant.id,
        req.bid_amount,
        &req.delivery_time,
        &req.cover_letter,
    )?;
    if outcome == ProposalCreate::Duplicate {
        return Err(ApiError::conflict("Proposal already submitted for this job"));
    }

    let row = state
        .db
        .get_proposal(&proposal_id.to_string())?
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("proposal vanished after insert")))?;

    Ok(ApiResponse::success(StatusCode::CREATED, "Proposal submitted", map_proposal(&row)))
}

pub async fn list_proposals(
    State(state): State<AppState>,
    Query(query): Query<ProposalQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = query.page.max(1);
    let limit = query.limit.clamp(1, 100);

    let status = query.status.map(|s| s.as_str());
    let (rows, total) = state.db.list_proposals(status, limit, (page - 1) * limit)?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Proposals fetched",
        ProposalListResponse {
            proposals: rows.iter().map(map_proposal).collect(),
            pagination: paginate(total, page, limit),
        },
    ))
}

pub async fn get_proposal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state
        .db
        .get_proposal(&id.to_string())?
        .ok_or_else(|| ApiError::not_found("Proposal not found"))?;

    Ok(ApiResponse::success(StatusCode::OK, "Proposal fetched", map_proposal(&row)))
}

pub async fn proposals_by_job(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.db.proposals_by_job(&job_id.to_string())?;
    Ok(ApiResponse::success(
        StatusCode::OK,
        "Proposals fetched",
        rows.iter().map(map_proposal).collect::<Vec<_>>(),
    ))
}

pub async fn proposals_by_consultant(
    State(state): State<AppState>,
    Path(consultant_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.db.proposals_by_consultant(&consultant_id.to_string())?;
    Ok(ApiResponse::success(
        StatusCode::OK,
        "Proposals fetched",
        rows.iter().map(map_proposal).collect::<Vec<_>>(),
    ))
}

/// Everything bid across this buyer's jobs.
pub async fn proposals_by_buyer(
    State(state): State<AppState>,
    Path(buyer_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.db.proposals_by_buyer(&buyer_id.to_string())?;
    Ok(ApiResponse::success(
        StatusCode::OK,
        "Proposals fetched",
        rows.iter().map(map_proposal).collect::<Vec<_>>(),
    ))
}

pub async fn update_proposal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateProposalRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let existing = state
        .db
        .get_proposal(&id.to_string())?
        .ok_or_else(|| ApiError::not_found("Proposal not found"))?;
    if existing.consultant.user.id != claims.sub.to_string() {
        return Err(ApiError::permission_denied("Cannot modify another consultant's proposal"));
    }
    if parse_proposal_status(&existing.status) != ProposalStatus::Pending {
        return Err(ApiError::invalid_argument("Only pending proposals can be updated"));
    }

    let bid_amount = req.bid_amount.unwrap_or(existing.bid_amount);
    let delivery_time = req.delivery_time.unwrap_or(existing.delivery_time);
    let cover_letter = req.cover_letter.unwrap_or(existing.cover_letter);

    state.db.update_proposal(&id.to_string(), bid_amount, &delivery_time, &cover_letter)?;

    let row = state
        .db
        .get_proposal(&id.to_string())?
        .ok_or_else(|| ApiError::not_found("Proposal not found"))?;

    Ok(ApiResponse::success(StatusCode::OK, "Proposal updated", map_proposal(&row)))
}

/// Accepting settles the job: the proposal wins, pending siblings are
/// rejected, and the job moves to in_progress with the consultant hired.
pub async fn accept_proposal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let proposal = state
        .db
        .get_proposal(&id.to_string())?
        .ok_or_else(|| ApiError::not_found("Proposal not found"))?;
    let job = state
        .db
        .get_job(&proposal.job.id)?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;
    if job.buyer.id != claims.sub.to_string() {
        return Err(ApiError::permission_denied("Only the job owner can accept proposals"));
    }
    if parse_proposal_status(&proposal.status) != ProposalStatus::Pending {
        return Err(ApiError::invalid_argument("Proposal is not pending"));
    }

    state.db.accept_proposal(&id.to_string())?;

    let row = state
        .db
        .get_proposal(&id.to_string())?
        .ok_or_else(|| ApiError::not_found("Proposal not found"))?;

    Ok(ApiResponse::success(StatusCode::OK, "Proposal accepted", map_proposal(&row)))
}

pub async fn reject_proposal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let proposal = state
        .db
        .get_proposal(&id.to_string())?
        .ok_or_else(|| ApiError::not_found("Proposal not found"))?;
    let job = state
        .db
        .get_job(&proposal.job.id)?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;
    if job.buyer.id != claims.sub.to_string() {
        return Err(ApiError::permission_denied("Only the job owner can reject proposals"));
    }

    state
        .db
        .set_proposal_status(&id.to_string(), ProposalStatus::Rejected.as_str())?;

    let row = state
        .db
        .get_proposal(&id.to_string())?
        .ok_or_else(|| ApiError::not_found("Proposal not found"))?;

    Ok(ApiResponse::success(StatusCode::OK, "Proposal rejected", map_proposal(&row)))
}

pub async fn delete_proposal(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let existing = state
        .db
        .get_proposal(&id.to_string())?
        .ok_or_else(|| ApiError::not_found("Proposal not found"))?;
    if existing.consultant.user.id != claims.sub.to_string() {
        return Err(ApiError::permission_denied("Cannot delete another consultant's proposal"));
    }

    state.db.delete_proposal(&id.to_string())?;
    Ok(ApiResponse::success(
        StatusCode::OK,
        "Proposal deleted",
        serde_json::json!({ "deleted": true }),
    ))
}

pub(crate) fn map_proposal(row: &ProposalRow) -> ProposalResponse {
    ProposalResponse {
        id: parse_uuid(&row.id, "proposal"),
        job: JobBrief {
            id: parse_uuid(&row.job.id, "job"),
            title: row.job.title.clone(),
            category: row.job.category.clone(),
            description: row.job.description.clone(),
            budget: Budget { min: row.job.budget_min, max: row.job.budget_max },
            status: parse_job_status(&row.job.status),
        },
        consultant: ConsultantBrief {
            id: parse_uuid(&row.consultant.id, "consultant"),
            user: identity(&row.consultant.user),
            title: row.consultant.title.clone(),
            hourly_rate: row.consultant.hourly_rate,
            rating: row.consultant.rating,
        },
        bid_amount: row.bid_amount,
        delivery_time: row.delivery_time.clone(),
        cover_letter: row.cover_letter.clone(),
        status: parse_proposal_status(&row.status),
        created_at: parse_datetime(&row.created_at),
        updated_at: parse_datetime(&row.updated_at),
    }
}
