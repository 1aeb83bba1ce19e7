// ABOUTME: Main entry point for the claimdesk claim and evidence service
// ABOUTME: Sets up configuration, logging, storage, routes and the session sweeper

use axum::{
    Router,
    routing::{delete, get, patch, post, put},
};
use clap::Parser;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::EnvFilter;

mod access;
mod alerts;
mod api;
mod auth_helpers;
mod config;
mod entities;
mod error;
mod exhibits;
mod middleware;
mod migration;
mod session;
mod storage;
mod types;

#[cfg(test)]
mod integration_tests;
#[cfg(test)]
mod test_support;

use config::Config;
use session::SessionStore;
use storage::Storage;

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<Storage>,
    pub sessions: SessionStore,
    pub collaborator_limit: u64,
    pub secure_cookies: bool,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/session", post(api::start_session))
        .route("/logout", post(api::logout))
        .route("/profiles", post(api::create_profile))
        .route("/claims", get(api::list_claims).post(api::create_claim))
        .route("/shared-claims", get(api::list_shared_claims))
        .route("/claims/:case_number", get(api::get_claim))
        .route("/claims/:case_number/status", put(api::update_claim_status))
        .route(
            "/claims/:case_number/evidence",
            get(api::list_evidence).post(api::add_evidence),
        )
        .route(
            "/claims/:case_number/evidence/order",
            put(api::reorder_evidence),
        )
        .route(
            "/claims/:case_number/shares",
            get(api::list_shares).post(api::share_claim),
        )
        .route(
            "/claims/:case_number/todos",
            get(api::list_todos).post(api::create_todo),
        )
        .route(
            "/claims/:case_number/events",
            get(api::list_events).post(api::create_event),
        )
        .route("/evidence/clone", post(api::clone_evidence))
        .route("/evidence/share", post(api::share_evidence))
        .route("/evidence/:evidence_id", patch(api::update_evidence))
        .route("/shares/:share_id", delete(api::revoke_share))
        .route("/shares/:share_id/donation", put(api::update_donation))
        .route("/shares/:share_id/access", put(api::update_share_access))
        .route("/todos/:todo_id/complete", put(api::complete_todo))
        .route("/alerts", get(api::get_alerts))
        .route("/alerts/combined", get(api::get_combined_alerts))
        .layer(axum::middleware::from_fn(middleware::api_headers))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_new(&config.log)?)
        .init();

    info!(database = %config.database_url, "opening storage");
    let storage = Arc::new(Storage::new(&config.database_url).await?);

    let sessions = SessionStore::new();
    spawn_session_sweeper(sessions.clone());

    let app_state = AppState {
        storage,
        sessions,
        collaborator_limit: config.collaborator_limit,
        secure_cookies: config.secure_cookies,
    };

    let app = build_router(app_state);

    let address = config.bind_address();
    let listener = TcpListener::bind(&address).await?;
    info!("claimdesk listening on http://{}", address);

    axum::serve(listener, app).await?;
    Ok(())
}

fn spawn_session_sweeper(sessions: SessionStore) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(60 * 60));
        loop {
            interval.tick().await;
            let removed = sessions.cleanup_expired_sessions();
            if removed > 0 {
                info!(removed, "expired sessions removed");
            }
        }
    });
}
