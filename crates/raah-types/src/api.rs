use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{AccountType, Availability, JobStatus, ProposalStatus, Verification};

// -- JWT Claims --

/// JWT claims shared by token issuance (auth) and validation (middleware).
/// Canonical definition lives here in raah-types to eliminate duplication.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: Uuid,
    pub name: String,
    pub account_type: AccountType,
    pub exp: usize,
}

// -- Shared projections --

/// The identity fields other entities are populated with. Matches the
/// projection the store returns when joining against users.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentity {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub profile_image: Option<String>,
    pub is_online: bool,
    pub account_type: AccountType,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserPublic {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub account_type: AccountType,
    pub roles: Vec<String>,
    pub profile_image: Option<String>,
    pub phone: Option<String>,
    pub is_verified: bool,
    pub is_banned: bool,
    pub is_online: bool,
    pub created_at: DateTime<Utc>,
}

/// 1-based page window plus totals; `pages = ceil(total / limit)`.
#[derive(Debug, Clone, Serialize)]
pub struct Pagination {
    pub total: u64,
    pub page: u64,
    pub limit: u64,
    pub pages: u64,
}

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub account_type: AccountType,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: UserPublic,
}

// -- Profiles --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateProfileRequest {
    pub fullname: String,
    #[serde(default)]
    pub bio: String,
    pub contact_number: String,
    #[serde(default)]
    pub portfolio_links: Vec<String>,
    #[serde(default)]
    pub verification_docs: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateProfileRequest {
    pub fullname: Option<String>,
    pub bio: Option<String>,
    pub contact_number: Option<String>,
    pub portfolio_links: Option<Vec<String>>,
    pub verification_docs: Option<Vec<String>>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub fullname: String,
    pub bio: String,
    pub contact_number: String,
    pub portfolio_links: Vec<String>,
    pub verification_docs: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// -- Consultants --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateConsultantRequest {
    pub user_id: Uuid,
    pub title: String,
    pub bio: String,
    pub specialization: Vec<String>,
    pub hourly_rate: f64,
    pub experience: String,
    pub skills: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateConsultantRequest {
    pub title: Option<String>,
    pub bio: Option<String>,
    pub specialization: Option<Vec<String>>,
    pub hourly_rate: Option<f64>,
    pub availability: Option<Availability>,
    pub experience: Option<String>,
    pub skills: Option<Vec<String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UploadDocumentsRequest {
    pub id_card_front: Option<String>,
    pub id_card_back: Option<String>,
    #[serde(default)]
    pub supporting_documents: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultantResponse {
    pub id: Uuid,
    pub user: UserIdentity,
    pub title: String,
    pub bio: String,
    pub specialization: Vec<String>,
    pub hourly_rate: f64,
    pub availability: Availability,
    pub experience: String,
    pub skills: Vec<String>,
    pub id_card_front: Option<String>,
    pub id_card_back: Option<String>,
    pub supporting_documents: Vec<String>,
    pub verification: Verification,
    pub is_verified: bool,
    pub rating: f64,
    pub total_projects: i64,
    pub total_earnings: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultantListResponse {
    pub consultants: Vec<ConsultantResponse>,
    pub pagination: Pagination,
}

// -- Jobs --

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Budget {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateJobRequest {
    pub category: String,
    pub title: String,
    pub description: String,
    pub budget: Budget,
    pub timeline: String,
    pub location: String,
    pub skills: Vec<String>,
    #[serde(default)]
    pub attachments: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateJobRequest {
    pub category: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub budget: Option<Budget>,
    pub timeline: Option<String>,
    pub location: Option<String>,
    pub skills: Option<Vec<String>>,
    pub attachments: Option<Vec<String>>,
    pub status: Option<JobStatus>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    pub id: Uuid,
    pub buyer: UserIdentity,
    pub category: String,
    pub title: String,
    pub description: String,
    pub budget: Budget,
    pub timeline: String,
    pub location: String,
    pub skills: Vec<String>,
    pub attachments: Vec<String>,
    pub status: JobStatus,
    pub proposals_count: i64,
    pub hired_consultant_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobListResponse {
    pub jobs: Vec<JobResponse>,
    pub pagination: Pagination,
}

// -- Proposals --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateProposalRequest {
    pub job_id: Uuid,
    pub bid_amount: f64,
    pub delivery_time: String,
    pub cover_letter: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateProposalRequest {
    pub bid_amount: Option<f64>,
    pub delivery_time: Option<String>,
    pub cover_letter: Option<String>,
}

/// The slice of a job a proposal listing needs.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobBrief {
    pub id: Uuid,
    pub title: String,
    pub category: String,
    pub description: String,
    pub budget: Budget,
    pub status: JobStatus,
}

/// The slice of a consultant a proposal listing needs.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsultantBrief {
    pub id: Uuid,
    pub user: UserIdentity,
    pub title: String,
    pub hourly_rate: f64,
    pub rating: f64,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalResponse {
    pub id: Uuid,
    pub job: JobBrief,
    pub consultant: ConsultantBrief,
    pub bid_amount: f64,
    pub delivery_time: String,
    pub cover_letter: String,
    pub status: ProposalStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProposalListResponse {
    pub proposals: Vec<ProposalResponse>,
    pub pagination: Pagination,
}

// -- Reviews --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CreateReviewRequest {
    pub job_id: Uuid,
    pub consultant_id: Uuid,
    pub rating: i64,
    pub comment: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub id: Uuid,
    pub job_id: Uuid,
    pub buyer: UserIdentity,
    pub consultant_id: Uuid,
    pub rating: i64,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

// -- Messaging --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SendMessageRequest {
    pub receiver_id: Uuid,
    pub content: String,
    #[serde(default)]
    pub attachments: Vec<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageResponse {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub sender: UserIdentity,
    pub receiver: UserIdentity,
    pub content: String,
    pub is_read: bool,
    pub attachments: Vec<String>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationResponse {
    pub id: Uuid,
    pub other_user: UserIdentity,
    pub last_message: Option<String>,
    pub last_message_at: Option<DateTime<Utc>>,
    pub unread_count: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// `conversation_id` is null until the pair has exchanged a first message;
/// that is a normal state, not an error.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagesPageResponse {
    pub messages: Vec<MessageResponse>,
    pub pagination: Pagination,
    pub conversation_id: Option<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct UnreadCountResponse {
    pub count: i64,
}

// -- Contact form --

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct ContactRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub message: String,
}

// -- Admin --

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminStats {
    pub total_users: i64,
    pub total_buyers: i64,
    pub total_consultants: i64,
    pub verified_consultants: i64,
    pub pending_consultants: i64,
    pub total_jobs: i64,
    pub open_jobs: i64,
    pub total_proposals: i64,
    pub total_reviews: i64,
    pub total_messages: i64,
}
