use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use raah_db::models::ConsultantRow;
use raah_db::queries::consultants::ConsultantFilter;
use raah_types::api::{
    Claims, ConsultantListResponse, ConsultantResponse, CreateConsultantRequest,
    UpdateConsultantRequest, UploadDocumentsRequest,
};
use raah_types::models::{Availability, Verification};

use crate::error::ApiError;
use crate::response::{ApiResponse, paginate};
use crate::{
    AppState, decode_list, encode_list, identity, parse_availability, parse_datetime, parse_uuid,
    parse_verification,
};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultantQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
    pub specialization: Option<String>,
    pub availability: Option<Availability>,
    pub min_rating: Option<f64>,
    pub is_verified: Option<bool>,
}

fn default_page() -> u64 {
    1
}

fn default_limit() -> u64 {
    20
}

pub async fn create_consultant(
    State(state): State<AppState>,
    Json(req): Json<CreateConsultantRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.db.user_exists(&req.user_id.to_string())? {
        return Err(ApiError::not_found("User not found"));
    }
    if state.db.get_consultant_by_user(&req.user_id.to_string())?.is_some() {
        return Err(ApiError::conflict("Consultant profile already exists for this user"));
    }

    let consultant_id = Uuid::new_v4();
    state.db.create_consultant(
        &consultant_id.to_string(),
        &req.user_id.to_string(),
        req.title.trim(),
        &req.bio,
        &encode_list(&req.specialization),
        req.hourly_rate,
        &req.experience,
        &encode_list(&req.skills),
    )?;

    let row = state
        .db
        .get_consultant(&consultant_id.to_string())?
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("consultant vanished after insert")))?;

    Ok(ApiResponse::success(StatusCode::CREATED, "Consultant profile created", map_consultant(&row)))
}

pub async fn list_consultants(
    State(state): State<AppState>,
    Query(query): Query<ConsultantQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = query.page.max(1);
    let limit = query.limit.clamp(1, 100);

    let filter = ConsultantFilter {
        specialization: query.specialization,
        availability: query.availability.map(|a| a.as_str().to_string()),
        min_rating: query.min_rating,
        verified: query.is_verified,
    };
    let (rows, total) = state.db.list_consultants(&filter, limit, (page - 1) * limit)?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Consultants fetched",
        ConsultantListResponse {
            consultants: rows.iter().map(map_consultant).collect(),
            pagination: paginate(total, page, limit),
        },
    ))
}

pub async fn get_consultant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state
        .db
        .get_consultant(&id.to_string())?
        .ok_or_else(|| ApiError::not_found("Consultant not found"))?;

    Ok(ApiResponse::success(StatusCode::OK, "Consultant fetched", map_consultant(&row)))
}

/// "No consultant record yet" is a normal answer here, so the data field is
/// null rather than a 404 — registration and consultant onboarding are
/// separate steps.
pub async fn get_consultant_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let row = state.db.get_consultant_by_user(&user_id.to_string())?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Consultant fetched",
        row.as_ref().map(map_consultant),
    ))
}

pub async fn update_consultant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateConsultantRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let existing = state
        .db
        .get_consultant(&id.to_string())?
        .ok_or_else(|| ApiError::not_found("Consultant not found"))?;
    if existing.user.id != claims.sub.to_string() {
        return Err(ApiError::permission_denied("Cannot modify another consultant's profile"));
    }

    let title = req.title.unwrap_or(existing.title);
    let bio = req.bio.unwrap_or(existing.bio);
    let specialization = req
        .specialization
        .map(|s| encode_list(&s))
        .unwrap_or(existing.specialization);
    let hourly_rate = req.hourly_rate.unwrap_or(existing.hourly_rate);
    let availability = req
        .availability
        .map(|a| a.as_str().to_string())
        .unwrap_or(existing.availability);
    let experience = req.experience.unwrap_or(existing.experience);
    let skills = req.skills.map(|s| encode_list(&s)).unwrap_or(existing.skills);

    state.db.update_consultant(
        &id.to_string(),
        title.trim(),
        &bio,
        &specialization,
        hourly_rate,
        &availability,
        &experience,
        &skills,
    )?;

    let row = state
        .db
        .get_consultant(&id.to_string())?
        .ok_or_else(|| ApiError::not_found("Consultant not found"))?;

    Ok(ApiResponse::success(StatusCode::OK, "Consultant updated", map_consultant(&row)))
}

/// Uploading identity documents enters the admin verification queue.
pub async fn upload_documents(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UploadDocumentsRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let existing = state
        .db
        .get_consultant(&id.to_string())?
        .ok_or_else(|| ApiError::not_found("Consultant not found"))?;
    if existing.user.id != claims.sub.to_string() {
        return Err(ApiError::permission_denied("Cannot modify another consultant's profile"));
    }

    // New uploads replace missing slots only; existing documents stay.
    let id_card_front = req.id_card_front.or(existing.id_card_front);
    let id_card_back = req.id_card_back.or(existing.id_card_back);
    let supporting = if req.supporting_documents.is_empty() {
        existing.supporting_documents
    } else {
        encode_list(&req.supporting_documents)
    };

    state.db.set_consultant_documents(
        &id.to_string(),
        id_card_front.as_deref(),
        id_card_back.as_deref(),
        &supporting,
    )?;

    let row = state
        .db
        .get_consultant(&id.to_string())?
        .ok_or_else(|| ApiError::not_found("Consultant not found"))?;

    Ok(ApiResponse::success(StatusCode::OK, "Documents uploaded", map_consultant(&row)))
}

pub async fn verify_consultant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    if !state
        .db
        .set_consultant_verification(&id.to_string(), Verification::Verified.as_str())?
    {
        return Err(ApiError::not_found("Consultant not found"));
    }
    let row = state
        .db
        .get_consultant(&id.to_string())?
        .ok_or_else(|| ApiError::not_found("Consultant not found"))?;

    Ok(ApiResponse::success(StatusCode::OK, "Consultant verified", map_consultant(&row)))
}

pub async fn delete_consultant(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let existing = state
        .db
        .get_consultant(&id.to_string())?
        .ok_or_else(|| ApiError::not_found("Consultant not found"))?;
    if existing.user.id != claims.sub.to_string() {
        return Err(ApiError::permission_denied("Cannot delete another consultant's profile"));
    }

    state.db.delete_consultant(&id.to_string())?;
    Ok(ApiResponse::success(
        StatusCode::OK,
        "Consultant profile deleted",
        serde_json::json!({ "deleted": true }),
    ))
}

pub(crate) fn map_consultant(row: &ConsultantRow) -> ConsultantResponse {
    let verification = parse_verification(&row.verification);
    ConsultantResponse {
        id: parse_uuid(&row.id, "consultant"),
        user: identity(&row.user),
        title: row.title.clone(),
        bio: row.bio.clone(),
        specialization: decode_list(&row.specialization),
        hourly_rate: row.hourly_rate,
        availability: parse_availability(&row.availability),
        experience: row.experience.clone(),
        skills: decode_list(&row.skills),
        id_card_front: row.id_card_front.clone(),
        id_card_back: row.id_card_back.clone(),
        supporting_documents: decode_list(&row.supporting_documents),
        verification,
        is_verified: verification == Verification::Verified,
        rating: row.rating,
        total_projects: row.total_projects,
        total_earnings: row.total_earnings,
        created_at: parse_datetime(&row.created_at),
        updated_at: parse_datetime(&row.updated_at),
    }
}
