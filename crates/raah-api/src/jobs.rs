use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use raah_db::models::JobRow;
use raah_db::queries::jobs::JobFilter;
use raah_types::api::{Budget, Claims, CreateJobRequest, JobListResponse, JobResponse, UpdateJobRequest};
use raah_types::models::JobStatus;

use crate::error::ApiError;
use crate::response::{ApiResponse, paginate};
use crate::{AppState, decode_list, encode_list, identity, parse_datetime, parse_job_status, parse_uuid};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub category: Option<String>,
    pub status: Option<JobStatus>,
    pub min_budget: Option<f64>,
    pub max_budget: Option<f64>,
    pub location: Option<String>,
}

fn default_page() -> u64 {
    1
}

fn default_limit() -> u64 {
    20
}

pub async fn create_job(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateJobRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.db.user_exists(&claims.sub.to_string())? {
        return Err(ApiError::not_found("User not found"));
    }
    validate_budget(&req.budget)?;

    let job_id = Uuid::new_v4();
    state.db.create_job(
        &job_id.to_string(),
        &claims.sub.to_string(),
        &req.category,
        req.title.trim(),
        &req.description,
        req.budget.min,
        req.budget.max,
        &req.timeline,
        &req.location,
        &encode_list(&req.skills),
        &encode_list(&req.attachments),
    )?;

    let row = state
        .db
        .get_job(&job_id.to_string())?
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("job vanished after insert")))?;

    Ok(ApiResponse::success(StatusCode::CREATED, "Job created", map_job(&row)))
}

pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<JobQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = query.page.max(1);
    let limit = query.limit.clamp(1, 100);

    let filter = JobFilter {
        category: query.category,
        status: query.status.map(|s| s.as_str().to_string()),
        min_budget: query.min_budget,
        max_budget: query.max_budget,
        location: query.location,
    };
    let (rows, total) = state.db.list_jobs(&filter, limit, (page - 1) * limit)?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Jobs fetched",
        JobListResponse {
            jobs: rows.iter().map(map_job).collect(),
            pagination: paginate(total, page, limit),
        },
    ))
}

pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state
        .db
        .get_job(&id.to_string())?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;

    Ok(ApiResponse::success(StatusCode::OK, "Job fetched", map_job(&row)))
}

pub async fn jobs_by_buyer(
    State(state): State<AppState>,
    Path(buyer_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let rows = state.db.jobs_by_buyer(&buyer_id.to_string())?;
    Ok(ApiResponse::success(
        StatusCode::OK,
        "Jobs fetched",
        rows.iter().map(map_job).collect::<Vec<_>>(),
    ))
}

pub async fn update_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateJobRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let existing = state
        .db
        .get_job(&id.to_string())?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;
    if existing.buyer.id != claims.sub.to_string() {
        return Err(ApiError::permission_denied("Cannot modify another buyer's job"));
    }

    let budget = req.budget.unwrap_or(Budget { min: existing.budget_min, max: existing.budget_max });
    validate_budget(&budget)?;

    let category = req.category.unwrap_or(existing.category);
    let title = req.title.unwrap_or(existing.title);
    let description = req.description.unwrap_or(existing.description);
    let timeline = req.timeline.unwrap_or(existing.timeline);
    let location = req.location.unwrap_or(existing.location);
    let skills = req.skills.map(|s| encode_list(&s)).unwrap_or(existing.skills);
    let attachments = req.attachments.map(|a| encode_list(&a)).unwrap_or(existing.attachments);
    let status = req
        .status
        .map(|s| s.as_str().to_string())
        .unwrap_or(existing.status);

    state.db.update_job(
        &id.to_string(),
        &category,
        title.trim(),
        &description,
        budget.min,
        budget.max,
        &timeline,
        &location,
        &skills,
        &attachments,
        &status,
    )?;

    let row = state
        .db
        .get_job(&id.to_string())?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;

    Ok(ApiResponse::success(StatusCode::OK, "Job updated", map_job(&row)))
}

pub async fn delete_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let existing = state
        .db
        .get_job(&id.to_string())?
        .ok_or_else(|| ApiError::not_found("Job not found"))?;
    if existing.buyer.id != claims.sub.to_string() {
        return Err(ApiError::permission_denied("Cannot delete another buyer's job"));
    }

    state.db.delete_job(&id.to_string())?;
    Ok(ApiResponse::success(
        StatusCode::OK,
        "Job deleted",
        serde_json::json!({ "deleted": true }),
    ))
}

fn validate_budget(budget: &Budget) -> Result<(), ApiError> {
    if budget.min < 0.0 || budget.max < 0.0 {
        return Err(ApiError::invalid_argument("Budget cannot be negative"));
    }
    if budget.min > budget.max {
        return Err(ApiError::invalid_argument("Budget minimum cannot exceed maximum"));
    }
    Ok(())
}

pub(crate) fn map_job(row: &JobRow) -> JobResponse {
    JobResponse {
        id: parse_uuid(&row.id, "job"),
        buyer: identity(&row.buyer),
        category: row.category.clone(),
        title: row.title.clone(),
        description: row.description.clone(),
        budget: Budget { min: row.budget_min, max: row.budget_max },
        timeline: row.timeline.clone(),
        location: row.location.clone(),
        skills: decode_list(&row.skills),
        attachments: decode_list(&row.attachments),
        status: parse_job_status(&row.status),
        proposals_count: row.proposals_count,
        hired_consultant_id: row.hired_consultant_id.as_deref().map(|id| parse_uuid(id, "consultant")),
        created_at: parse_datetime(&row.created_at),
        updated_at: parse_datetime(&row.updated_at),
    }
}

#[cfg(test)]
mod tests {
    use super::validate_budget;
    use raah_types::api::Budget;

    #[test]
    fn budget_ranges_are_checked() {
        assert!(validate_budget(&Budget { min: 100.0, max: 500.0 }).is_ok());
        assert!(validate_budget(&Budget { min: 0.0, max: 0.0 }).is_ok());
        assert!(validate_budget(&Budget { min: 500.0, max: 100.0 }).is_err());
        assert!(validate_budget(&Budget { min: -1.0, max: 100.0 }).is_err());
    }
}
