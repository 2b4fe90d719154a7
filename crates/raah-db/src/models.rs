/// Database row types — these map directly to SQLite rows.
/// Distinct from raah-types API models to keep the DB layer independent.
/// List-valued columns (roles, skills, attachments, ...) stay as raw JSON
/// text here; the API layer decodes them.

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub password: String,
    pub account_type: String,
    pub roles: String,
    pub profile_image: Option<String>,
    pub phone: Option<String>,
    pub is_verified: bool,
    pub is_banned: bool,
    pub is_online: bool,
    pub created_at: String,
    pub updated_at: String,
}

/// The projection joined onto other rows when a referenced user is populated.
#[derive(Debug, Clone)]
pub struct IdentityRow {
    pub id: String,
    pub name: String,
    pub email: String,
    pub profile_image: Option<String>,
    pub is_online: bool,
    pub account_type: String,
}

#[derive(Debug, Clone)]
pub struct ProfileRow {
    pub id: String,
    pub user_id: String,
    pub fullname: String,
    pub bio: String,
    pub contact_number: String,
    pub portfolio_links: String,
    pub verification_docs: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct ConsultantRow {
    pub id: String,
    pub user: IdentityRow,
    pub title: String,
    pub bio: String,
    pub specialization: String,
    pub hourly_rate: f64,
    pub availability: String,
    pub experience: String,
    pub skills: String,
    pub id_card_front: Option<String>,
    pub id_card_back: Option<String>,
    pub supporting_documents: String,
    pub verification: String,
    pub rating: f64,
    pub total_projects: i64,
    pub total_earnings: f64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct JobRow {
    pub id: String,
    pub buyer: IdentityRow,
    pub category: String,
    pub title: String,
    pub description: String,
    pub budget_min: f64,
    pub budget_max: f64,
    pub timeline: String,
    pub location: String,
    pub skills: String,
    pub attachments: String,
    pub status: String,
    pub proposals_count: i64,
    pub hired_consultant_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct JobBriefRow {
    pub id: String,
    pub title: String,
    pub category: String,
    pub description: String,
    pub budget_min: f64,
    pub budget_max: f64,
    pub status: String,
}

#[derive(Debug, Clone)]
pub struct ConsultantBriefRow {
    pub id: String,
    pub user: IdentityRow,
    pub title: String,
    pub hourly_rate: f64,
    pub rating: f64,
}

#[derive(Debug, Clone)]
pub struct ProposalRow {
    pub id: String,
    pub job: JobBriefRow,
    pub consultant: ConsultantBriefRow,
    pub bid_amount: f64,
    pub delivery_time: String,
    pub cover_letter: String,
    pub status: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct ReviewRow {
    pub id: String,
    pub job_id: String,
    pub buyer: IdentityRow,
    pub consultant_id: String,
    pub rating: i64,
    pub comment: String,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct ConversationRow {
    pub id: String,
    pub participant_a: String,
    pub participant_b: String,
    pub last_message: Option<String>,
    pub last_message_at: Option<String>,
    pub unread_a: i64,
    pub unread_b: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// A conversation as seen by one participant: their unread counter and the
/// other participant's identity.
#[derive(Debug, Clone)]
pub struct ConversationListRow {
    pub id: String,
    pub other_user: IdentityRow,
    pub last_message: Option<String>,
    pub last_message_at: Option<String>,
    pub unread_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone)]
pub struct MessageRow {
    pub id: String,
    pub conversation_id: String,
    pub sender: IdentityRow,
    pub receiver: IdentityRow,
    pub content: String,
    pub is_read: bool,
    pub attachments: String,
    pub created_at: String,
}

#[derive(Debug, Clone, Copy)]
pub struct StatsRow {
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
