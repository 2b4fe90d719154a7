pub mod admin;
pub mod auth;
pub mod consultants;
pub mod contact;
pub mod error;
pub mod jobs;
pub mod messaging;
pub mod middleware;
pub mod proposals;
pub mod response;
pub mod reviews;
pub mod users;

use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Utc};
use tracing::warn;
use uuid::Uuid;

use raah_db::Database;
use raah_db::models::{IdentityRow, UserRow};
use raah_types::api::{UserIdentity, UserPublic};
use raah_types::models::{AccountType, Availability, JobStatus, ProposalStatus, Verification};

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
}

// ── Row-to-API mapping helpers ──────────────────────────────────────────
//
// Stored values are trusted but not blindly: a corrupt id, timestamp, or
// enum tag is logged and replaced with a neutral default instead of
// poisoning the whole response.

pub(crate) fn parse_uuid(value: &str, what: &str) -> Uuid {
    value.parse().unwrap_or_else(|e| {
        warn!("Corrupt {} id '{}': {}", what, value, e);
        Uuid::default()
    })
}

pub(crate) fn parse_datetime(value: &str) -> DateTime<Utc> {
    value
        .parse::<DateTime<Utc>>()
        .or_else(|_| {
            // SQLite stores timestamps as "YYYY-MM-DD HH:MM:SS" without timezone.
            // Parse as naive UTC and convert.
            NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S").map(|ndt| ndt.and_utc())
        })
        .unwrap_or_else(|e| {
            warn!("Corrupt timestamp '{}': {}", value, e);
            DateTime::default()
        })
}

pub(crate) fn parse_datetime_opt(value: Option<&str>) -> Option<DateTime<Utc>> {
    value.map(parse_datetime)
}

pub(crate) fn decode_list(json: &str) -> Vec<String> {
    serde_json::from_str(json).unwrap_or_else(|e| {
        warn!("Corrupt JSON list column '{}': {}", json, e);
        Vec::new()
    })
}

pub(crate) fn encode_list(items: &[String]) -> String {
    serde_json::to_string(items).unwrap_or_else(|_| "[]".into())
}

pub(crate) fn parse_account_type(value: &str) -> AccountType {
    value.parse().unwrap_or_else(|e| {
        warn!("{}", e);
        AccountType::Buyer
    })
}

pub(crate) fn parse_availability(value: &str) -> Availability {
    value.parse().unwrap_or_else(|e| {
        warn!("{}", e);
        Availability::Available
    })
}

pub(crate) fn parse_job_status(value: &str) -> JobStatus {
    value.parse().unwrap_or_else(|e| {
        warn!("{}", e);
        JobStatus::Open
    })
}

pub(crate) fn parse_proposal_status(value: &str) -> ProposalStatus {
    value.parse().unwrap_or_else(|e| {
        warn!("{}", e);
        ProposalStatus::Pending
    })
}

pub(crate) fn parse_verification(value: &str) -> Verification {
    value.parse().unwrap_or_else(|e| {
        warn!("{}", e);
        Verification::Unverified
    })
}

pub(crate) fn identity(row: &IdentityRow) -> UserIdentity {
    UserIdentity {
        id: parse_uuid(&row.id, "user"),
        name: row.name.clone(),
        email: row.email.clone(),
        profile_image: row.profile_image.clone(),
        is_online: row.is_online,
        account_type: parse_account_type(&row.account_type),
    }
}

pub(crate) fn user_public(row: &UserRow) -> UserPublic {
    UserPublic {
        id: parse_uuid(&row.id, "user"),
        name: row.name.clone(),
        email: row.email.clone(),
        account_type: parse_account_type(&row.account_type),
        roles: decode_list(&row.roles),
        profile_image: row.profile_image.clone(),
        phone: row.phone.clone(),
        is_verified: row.is_verified,
        is_banned: row.is_banned,
        is_online: row.is_online,
        created_at: parse_datetime(&row.created_at),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn datetime_accepts_both_stored_formats() {
        let sqlite = parse_datetime("2026-08-06 10:30:00");
        let rfc = parse_datetime("2026-08-06T10:30:00Z");
        assert_eq!(sqlite, rfc);
    }

    #[test]
    fn corrupt_values_fall_back() {
        assert_eq!(parse_uuid("not-a-uuid", "user"), Uuid::default());
        assert!(decode_list("not json").is_empty());
        assert_eq!(parse_job_status("hired"), JobStatus::Open);
    }

    #[test]
    fn list_round_trip() {
        let items = vec!["https://a.dev".to_string(), "https://b.dev".to_string()];
        assert_eq!(decode_list(&encode_list(&items)), items);
        assert_eq!(encode_list(&[]), "[]");
    }
}
