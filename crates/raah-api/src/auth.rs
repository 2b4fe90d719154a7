use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use raah_db::models::UserRow;
use raah_types::api::{AuthResponse, Claims, LoginRequest, RegisterRequest};

use crate::error::ApiError;
use crate::response::ApiResponse;
use crate::{AppState, parse_account_type, parse_uuid, user_public};

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    // Validate input
    if req.name.trim().is_empty() {
        return Err(ApiError::invalid_argument("Name is required"));
    }
    if !req.email.contains('@') {
        return Err(ApiError::invalid_argument("Invalid email address"));
    }
    if req.password.len() < 8 {
        return Err(ApiError::invalid_argument("Password must be at least 8 characters"));
    }

    // Check if email is taken
    if state.db.get_user_by_email(&req.email)?.is_some() {
        return Err(ApiError::conflict("Email already registered"));
    }

    let password_hash = hash_password(&req.password)?;
    let user_id = Uuid::new_v4();

    // Consultants register as plain accounts; the consultant record is
    // created later through the verification flow.
    state.db.create_user(
        &user_id.to_string(),
        req.name.trim(),
        &req.email,
        &password_hash,
        req.account_type.as_str(),
        "[]",
    )?;

    let user = state
        .db
        .get_user_by_id(&user_id.to_string())?
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("user vanished after insert")))?;
    let token = create_token(&state.jwt_secret, &user)?;

    Ok(ApiResponse::success(
        StatusCode::CREATED,
        "Registration successful",
        AuthResponse { token, user: user_public(&user) },
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = state
        .db
        .get_user_by_email(&req.email)?
        .ok_or_else(|| ApiError::unauthorized("Invalid email or password"))?;

    if user.is_banned {
        return Err(ApiError::permission_denied("Account is banned"));
    }

    // Verify password
    let parsed_hash = PasswordHash::new(&user.password)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("stored hash unreadable: {e}")))?;
    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::unauthorized("Invalid email or password"))?;

    state.db.set_user_online(&user.id, true)?;
    let user = state
        .db
        .get_user_by_id(&user.id)?
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("user vanished during login")))?;

    let token = create_token(&state.jwt_secret, &user)?;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Login successful",
        AuthResponse { token, user: user_public(&user) },
    ))
}

/// Argon2id hash, also used for bootstrap and guest provisioning.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("password hashing failed: {e}")))?;
    Ok(hash.to_string())
}

fn create_token(secret: &str, user: &UserRow) -> Result<String, ApiError> {
    let claims = Claims {
        sub: parse_uuid(&user.id, "user"),
        name: user.name.clone(),
        account_type: parse_account_type(&user.account_type),
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(anyhow::anyhow!("token encoding failed: {e}")))?;

    Ok(token)
}

#[cfg(test)]
mod tests {
    use super::hash_password;
    use argon2::{Argon2, PasswordHash, PasswordVerifier};

    #[test]
    fn hashes_verify_and_are_salted() {
        let first = hash_password("correct horse battery").unwrap();
        let second = hash_password("correct horse battery").unwrap();
        assert_ne!(first, second);

        let parsed = PasswordHash::new(&first).unwrap();
        assert!(Argon2::default().verify_password(b"correct horse battery", &parsed).is_ok());
        assert!(Argon2::default().verify_password(b"wrong", &parsed).is_err());
    }
}
