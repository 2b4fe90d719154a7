use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{delete, get, patch, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use uuid::Uuid;

use raah_api::middleware::require_auth;
use raah_api::{AppState, AppStateInner, admin, auth, consultants, contact, jobs, messaging, proposals, reviews, users};
use raah_db::Database;
use raah_types::models::AccountType;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "raah=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret =
        std::env::var("RAAH_JWT_SECRET").unwrap_or_else(|_| "dev-secret-change-me".into());
    let db_path = std::env::var("RAAH_DB_PATH").unwrap_or_else(|_| "raah.db".into());
    let host = std::env::var("RAAH_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("RAAH_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;
    let admin_email =
        std::env::var("RAAH_ADMIN_EMAIL").unwrap_or_else(|_| "admin@raah.dev".into());
    let admin_password =
        std::env::var("RAAH_ADMIN_PASSWORD").unwrap_or_else(|_| "admin-change-me".into());

    // Init database
    let db = Database::open(&PathBuf::from(&db_path))?;

    // The contact form routes mail to this account; provision it up front
    // rather than on first use.
    bootstrap_admin(&db, &admin_email, &admin_password)?;

    // Shared state
    let app_state: AppState = Arc::new(AppStateInner { db, jwt_secret: jwt_secret.clone() });

    // Routes
    let public_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/contact", post(contact::send_contact_message))
        .with_state(app_state.clone());

    // Admin surface ships unauthenticated in this version; known gap.
    let admin_routes = Router::new()
        .route("/admin/users", get(admin::get_all_users))
        .route(
            "/admin/users/{user_id}",
            get(admin::get_users_by_account_type).delete(admin::delete_user),
        )
        .route("/admin/users/{user_id}/ban", patch(admin::ban_user))
        .route("/admin/users/{user_id}/unban", patch(admin::unban_user))
        .route("/admin/consultants/pending", get(admin::get_pending_consultants))
        .route("/admin/consultants/{consultant_id}/verify", patch(admin::verify_consultant))
        .route("/admin/consultants/{consultant_id}/decline", patch(admin::decline_consultant))
        .route("/admin/stats", get(admin::get_admin_stats))
        .with_state(app_state.clone());

    let protected_routes = Router::new()
        .route("/users/{id}", get(users::get_user))
        .route(
            "/users/{id}/profile",
            post(users::create_profile).get(users::get_profile).put(users::update_profile),
        )
        .route(
            "/consultants",
            post(consultants::create_consultant).get(consultants::list_consultants),
        )
        .route("/consultants/user/{user_id}", get(consultants::get_consultant_by_user))
        .route("/consultants/{id}/verify", patch(consultants::verify_consultant))
        .route("/consultants/{id}/documents", patch(consultants::upload_documents))
        .route(
            "/consultants/{id}",
            get(consultants::get_consultant)
                .put(consultants::update_consultant)
                .patch(consultants::update_consultant)
                .delete(consultants::delete_consultant),
        )
        .route("/jobs", post(jobs::create_job).get(jobs::list_jobs))
        .route("/jobs/buyer/{buyer_id}", get(jobs::jobs_by_buyer))
        .route(
            "/jobs/{id}",
            get(jobs::get_job).put(jobs::update_job).delete(jobs::delete_job),
        )
        .route(
            "/proposals",
            post(proposals::create_proposal).get(proposals::list_proposals),
        )
        .route("/proposals/job/{job_id}", get(proposals::proposals_by_job))
        .route("/proposals/consultant/{consultant_id}", get(proposals::proposals_by_consultant))
        .route("/proposals/buyer/{buyer_id}", get(proposals::proposals_by_buyer))
        .route("/proposals/{id}/accept", patch(proposals::accept_proposal))
        .route("/proposals/{id}/reject", patch(proposals::reject_proposal))
        .route(
            "/proposals/{id}",
            get(proposals::get_proposal)
                .put(proposals::update_proposal)
                .delete(proposals::delete_proposal),
        )
        .route("/reviews", post(reviews::create_review))
        .route("/reviews/consultant/{consultant_id}", get(reviews::reviews_by_consultant))
        .route("/reviews/job/{job_id}", get(reviews::reviews_by_job))
        .route("/reviews/{id}", delete(reviews::delete_review))
        .route("/messages", post(messaging::send_message))
        .route("/messages/conversations", get(messaging::get_conversations))
        .route("/messages/unread/count", get(messaging::get_unread_count))
        .route("/messages/message/{message_id}", delete(messaging::delete_message))
        .route("/messages/{other_user_id}", get(messaging::get_messages))
        .route("/messages/{other_user_id}/read", patch(messaging::mark_messages_read))
        .layer(middleware::from_fn(require_auth))
        .with_state(app_state);

    let app = Router::new()
        .merge(public_routes)
        .merge(admin_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Raah server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Config-driven support-account provisioning. Runs once at startup so the
/// contact form never creates privileged accounts as a side effect.
fn bootstrap_admin(db: &Database, email: &str, password: &str) -> anyhow::Result<()> {
    if db.find_admin_user()?.is_some() {
        return Ok(());
    }

    let password_hash = raah_api::auth::hash_password(password)?;
    let admin_id = Uuid::new_v4();
    db.create_user(
        &admin_id.to_string(),
        "Raah Support",
        email,
        &password_hash,
        AccountType::Buyer.as_str(),
        "[\"admin\"]",
    )?;

    info!("Provisioned support admin account {}", email);
    Ok(())
}
