use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::error;
use uuid::Uuid;

use raah_db::models::{ConversationListRow, MessageRow};
use raah_db::queries::messaging::DeleteMessage;
use raah_types::api::{
    Claims, ConversationResponse, MessageResponse, MessagesPageResponse, SendMessageRequest,
    UnreadCountResponse,
};

use crate::error::ApiError;
use crate::response::{ApiResponse, paginate};
use crate::{AppState, decode_list, encode_list, identity, parse_datetime, parse_datetime_opt, parse_uuid};

/// Conversation previews keep this many characters of the latest message.
const PREVIEW_CHARS: usize = 100;

#[derive(Debug, Deserialize)]
pub struct MessageQuery {
    #[serde(default = "default_page")]
    pub page: u64,
    #[serde(default = "default_limit")]
    pub limit: u64,
}

fn default_page() -> u64 {
    1
}

fn default_limit() -> u64 {
    50
}

pub async fn send_message(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let message =
        deliver_message(&state, claims.sub, req.receiver_id, &req.content, &req.attachments).await?;
    Ok(ApiResponse::success(StatusCode::CREATED, "Message sent", message))
}

/// The one write path for messages; the contact form reuses it. Validates
/// both parties, then hands the conversation bookkeeping to the store as a
/// single transaction.
pub(crate) async fn deliver_message(
    state: &AppState,
    sender_id: Uuid,
    receiver_id: Uuid,
    content: &str,
    attachments: &[String],
) -> Result<MessageResponse, ApiError> {
    if sender_id == receiver_id {
        return Err(ApiError::invalid_argument("Cannot send message to yourself"));
    }
    if !state.db.user_exists(&sender_id.to_string())?
        || !state.db.user_exists(&receiver_id.to_string())?
    {
        return Err(ApiError::not_found("User not found"));
    }

    let message_id = Uuid::new_v4();
    let new_conversation_id = Uuid::new_v4();
    let preview = truncate_preview(content, PREVIEW_CHARS);
    let content = content.to_string();
    let attachments_json = encode_list(attachments);

    // Run blocking DB writes off the async runtime
    let db = state.clone();
    let message = tokio::task::spawn_blocking(move || {
        db.db.send_message(
            &message_id.to_string(),
            &new_conversation_id.to_string(),
            &sender_id.to_string(),
            &receiver_id.to_string(),
            &content,
            &preview,
            &attachments_json,
        )?;
        db.db.get_message(&message_id.to_string())
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal(anyhow::anyhow!("blocking task failed: {e}"))
    })??
    .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("message vanished after insert")))?;

    Ok(map_message(&message))
}

pub async fn get_conversations(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let user_id = claims.sub.to_string();
    let rows = tokio::task::spawn_blocking(move || db.db.conversations_for_user(&user_id))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(anyhow::anyhow!("blocking task failed: {e}"))
        })??;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Conversations fetched",
        rows.iter().map(map_conversation).collect::<Vec<_>>(),
    ))
}

pub async fn get_messages(
    State(state): State<AppState>,
    Path(other_user_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = query.page.max(1);
    let limit = query.limit.clamp(1, 200);

    let db = state.clone();
    let user_id = claims.sub.to_string();
    let other_id = other_user_id.to_string();

    let (conversation_id, rows, total) = tokio::task::spawn_blocking(move || {
        let Some(conversation) = db.db.find_conversation(&user_id, &other_id)? else {
            return Ok::<_, anyhow::Error>((None, Vec::new(), 0));
        };
        let total = db.db.count_messages(&conversation.id)?;
        let rows = db.db.messages_page(&conversation.id, limit, (page - 1) * limit)?;
        Ok((Some(conversation.id), rows, total))
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal(anyhow::anyhow!("blocking task failed: {e}"))
    })??;

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Messages fetched",
        MessagesPageResponse {
            messages: rows.iter().map(map_message).collect(),
            pagination: paginate(total, page, limit),
            conversation_id: conversation_id.as_deref().map(|id| parse_uuid(id, "conversation")),
        },
    ))
}

pub async fn mark_messages_read(
    State(state): State<AppState>,
    Path(other_user_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let user_id = claims.sub.to_string();
    let other_id = other_user_id.to_string();
    let found = tokio::task::spawn_blocking(move || db.db.mark_messages_read(&user_id, &other_id))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(anyhow::anyhow!("blocking task failed: {e}"))
        })??;

    if !found {
        return Err(ApiError::not_found("Conversation not found"));
    }

    Ok(ApiResponse::success(
        StatusCode::OK,
        "Messages marked as read",
        serde_json::json!({ "success": true }),
    ))
}

pub async fn get_unread_count(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let count = state.db.unread_total(&claims.sub.to_string())?;
    Ok(ApiResponse::success(StatusCode::OK, "Unread count fetched", UnreadCountResponse { count }))
}

pub async fn delete_message(
    State(state): State<AppState>,
    Path(message_id): Path<Uuid>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    match state.db.delete_message(&message_id.to_string(), &claims.sub.to_string())? {
        DeleteMessage::NotFound => Err(ApiError::not_found("Message not found")),
        DeleteMessage::NotSender => {
            Err(ApiError::permission_denied("Unauthorized to delete this message"))
        }
        DeleteMessage::Deleted => Ok(ApiResponse::success(
            StatusCode::OK,
            "Message deleted",
            serde_json::json!({ "success": true }),
        )),
    }
}

/// First `max_chars` characters of the content, never splitting a code point.
fn truncate_preview(content: &str, max_chars: usize) -> String {
    content.chars().take(max_chars).collect()
}

pub(crate) fn map_message(row: &MessageRow) -> MessageResponse {
    MessageResponse {
        id: parse_uuid(&row.id, "message"),
        conversation_id: parse_uuid(&row.conversation_id, "conversation"),
        sender: identity(&row.sender),
        receiver: identity(&row.receiver),
        content: row.content.clone(),
        is_read: row.is_read,
        attachments: decode_list(&row.attachments),
        created_at: parse_datetime(&row.created_at),
    }
}

fn map_conversation(row: &ConversationListRow) -> ConversationResponse {
    ConversationResponse {
        id: parse_uuid(&row.id, "conversation"),
        other_user: identity(&row.other_user),
        last_message: row.last_message.clone(),
        last_message_at: parse_datetime_opt(row.last_message_at.as_deref()),
        unread_count: row.unread_count,
        created_at: parse_datetime(&row.created_at),
        updated_at: parse_datetime(&row.updated_at),
    }
}

#[cfg(test)]
mod tests {
    use super::truncate_preview;

    #[test]
    fn preview_counts_characters_not_bytes() {
        let short = "hello";
        assert_eq!(truncate_preview(short, 100), "hello");

        let long = "x".repeat(250);
        assert_eq!(truncate_preview(&long, 100).len(), 100);

        // multibyte content must not be split mid-code-point
        let nepali = "नमस्ते ".repeat(40);
        let preview = truncate_preview(&nepali, 100);
        assert_eq!(preview.chars().count(), 100);
        assert!(nepali.starts_with(&preview));
    }

    #[test]
    fn preview_at_exact_boundary() {
        let exactly = "a".repeat(100);
        assert_eq!(truncate_preview(&exactly, 100), exactly);
    }
}
