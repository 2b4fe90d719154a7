use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use uuid::Uuid;

use raah_db::models::ProfileRow;
use raah_types::api::{Claims, CreateProfileRequest, ProfileResponse, UpdateProfileRequest};

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::{AppState, decode_list, encode_list, parse_datetime, parse_uuid, user_public};

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .get_user_by_id(&id.to_string())?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    Ok(ApiResponse::success(StatusCode::OK, "User fetched", user_public(&user)))
}

pub async fn create_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if claims.sub != user_id {
        return Err(ApiError::permission_denied("Cannot modify another user's profile"));
    }
    if !state.db.user_exists(&user_id.to_string())? {
        return Err(ApiError::not_found("User not found"));
    }
    if state.db.get_profile_by_user(&user_id.to_string())?.is_some() {
        return Err(ApiError::conflict("Profile already exists for this user"));
    }
    validate_links(&req.portfolio_links)?;

    let profile_id = Uuid::new_v4();
    state.db.create_profile(
        &profile_id.to_string(),
        &user_id.to_string(),
        req.fullname.trim(),
        &req.bio,
        &req.contact_number,
        &encode_list(&req.portfolio_links),
        &encode_list(&req.verification_docs),
    )?;

    let profile = state
        .db
        .get_profile_by_user(&user_id.to_string())?
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("profile vanished after insert")))?;

    Ok(ApiResponse::success(StatusCode::CREATED, "Profile created", map_profile(&profile)))
}

pub async fn get_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let profile = state
        .db
        .get_profile_by_user(&user_id.to_string())?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;

    Ok(ApiResponse::success(StatusCode::OK, "Profile fetched", map_profile(&profile)))
}

pub async fn update_profile(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if claims.sub != user_id {
        return Err(ApiError::permission_denied("Cannot modify another user's profile"));
    }

    let existing = state
        .db
        .get_profile_by_user(&user_id.to_string())?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;

    // Merge partial input into the stored row.
    let fullname = req.fullname.unwrap_or(existing.fullname);
    let bio = req.bio.unwrap_or(existing.bio);
    let contact_number = req.contact_number.unwrap_or(existing.contact_number);
    let portfolio_links =
        req.portfolio_links.unwrap_or_else(|| decode_list(&existing.portfolio_links));
    let verification_docs =
        req.verification_docs.unwrap_or_else(|| decode_list(&existing.verification_docs));
    validate_links(&portfolio_links)?;

    state.db.update_profile(
        &user_id.to_string(),
        fullname.trim(),
        &bio,
        &contact_number,
        &encode_list(&portfolio_links),
        &encode_list(&verification_docs),
    )?;

    let profile = state
        .db
        .get_profile_by_user(&user_id.to_string())?
        .ok_or_else(|| ApiError::not_found("Profile not found"))?;

    Ok(ApiResponse::success(StatusCode::OK, "Profile updated", map_profile(&profile)))
}

fn validate_links(links: &[String]) -> Result<(), ApiError> {
    let all_valid = links
        .iter()
        .all(|link| link.starts_with("http://") || link.starts_with("https://"));
    if all_valid {
        Ok(())
    } else {
        Err(ApiError::invalid_argument("Invalid URL format in portfolio links"))
    }
}

fn map_profile(row: &ProfileRow) -> ProfileResponse {
    ProfileResponse {
        id: parse_uuid(&row.id, "profile"),
        user_id: parse_uuid(&row.user_id, "user"),
        fullname: row.fullname.clone(),
        bio: row.bio.clone(),
        contact_number: row.contact_number.clone(),
        portfolio_links: decode_list(&row.portfolio_links),
        verification_docs: decode_list(&row.verification_docs),
        created_at: parse_datetime(&row.created_at),
        updated_at: parse_datetime(&row.updated_at),
    }
}

#[cfg(test)]
mod tests {
    use super::validate_links;

    #[test]
    fn only_http_links_pass() {
        assert!(validate_links(&[]).is_ok());
        assert!(validate_links(&["https://portfolio.dev/work".into()]).is_ok());
        assert!(validate_links(&["http://old.site".into(), "https://new.site".into()]).is_ok());
        assert!(validate_links(&["ftp://files.example".into()]).is_err());
        assert!(validate_links(&["javascript:alert(1)".into()]).is_err());
    }
}
