use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use uuid::Uuid;

use raah_types::api::ContactRequest;
use raah_types::models::AccountType;

use crate::auth::hash_password;
use crate::error::ApiError;
use crate::messaging::deliver_message;
use crate::response::ApiResponse;
use crate::{AppState, parse_uuid};

/// Support-desk inbox: routes a contact-form submission as a direct message
/// from a guest account to the bootstrap admin account. Guest provisioning
/// is idempotent per email; the admin account is never created here — see
/// the startup bootstrap.
pub async fn send_contact_message(
    State(state): State<AppState>,
    Json(req): Json<ContactRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !req.email.contains('@') {
        return Err(ApiError::invalid_argument("Invalid email address"));
    }

    let admin = state
        .db
        .find_admin_user()?
        .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("support account not provisioned")))?;

    let guest = match state.db.get_user_by_email(&req.email)? {
        Some(user) => user,
        None => {
            let guest_id = Uuid::new_v4();
            let name = format!("{} {}", req.first_name, req.last_name);
            let name = name.trim();
            let name = if name.is_empty() { "Guest" } else { name };
            // Throwaway credential; guests log in only if they later register.
            let password_hash = hash_password(&format!("guest_{}", Uuid::new_v4()))?;
            state.db.create_user(
                &guest_id.to_string(),
                name,
                &req.email,
                &password_hash,
                AccountType::Buyer.as_str(),
                "[\"guest\"]",
            )?;
            state
                .db
                .get_user_by_id(&guest_id.to_string())?
                .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("guest vanished after insert")))?
        }
    };

    let content = format!(
        "Contact Form Message:\n\nFrom: {} {}\nEmail: {}\n\n{}",
        req.first_name, req.last_name, req.email, req.message
    );

    let message = deliver_message(
        &state,
        parse_uuid(&guest.id, "user"),
        parse_uuid(&admin.id, "user"),
        &content,
        &[],
    )
    .await?;

    Ok(ApiResponse::success(StatusCode::CREATED, "Message sent to admin successfully", message))
}
