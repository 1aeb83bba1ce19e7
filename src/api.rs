// ABOUTME: HTTP handlers for sessions, claims, evidence, sharing, tasks, calendar and alerts
// ABOUTME: Each handler resolves the acting user from the session and maps typed results to JSON

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
};
use axum_extra::extract::cookie::CookieJar;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::access;
use crate::alerts::{self, AlertScope, AlertsSummary, CombinedAlerts};
use crate::auth_helpers::current_user;
use crate::entities::{calendar_event, claim, claim_share, evidence, profile, todo};
use crate::error::{AppError, Result};
use crate::exhibits::{self, CloneReport, FanOutReport, next_exhibit_number};
use crate::types::*;
use crate::{AppState, session};

// Sessions and profiles

pub async fn start_session(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<CreateSessionRequest>,
) -> Result<(CookieJar, Json<SessionResponse>)> {
    let profile = state.storage.get_profile(req.profile_id).await?;

    let session_id = state.sessions.create_session(profile.id);
    let jar = jar.add(session::create_session_cookie(session_id, state.secure_cookies));

    tracing::info!(user_id = %profile.id, "session started");

    Ok((
        jar,
        Json(SessionResponse {
            success: true,
            user_id: profile.id,
        }),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    jar: CookieJar,
) -> (CookieJar, Json<serde_json::Value>) {
    if let Some(session_cookie) = jar.get(session::SESSION_COOKIE_NAME) {
        state.sessions.remove_session(session_cookie.value());
    }

    let jar = jar.add(session::create_logout_cookie());
    (jar, Json(json!({"success": true})))
}

pub async fn create_profile(
    State(state): State<AppState>,
    Json(req): Json<CreateProfileRequest>,
) -> Result<(StatusCode, Json<profile::Model>)> {
    if req.email.trim().is_empty() {
        return Err(AppError::BadRequest("Email is required".to_string()));
    }

    let profile = state
        .storage
        .create_profile(req.email.trim(), &req.display_name)
        .await?;

    Ok((StatusCode::CREATED, Json(profile)))
}

// Claims

pub async fn create_claim(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<CreateClaimRequest>,
) -> Result<(StatusCode, Json<claim::Model>)> {
    let user_id = current_user(&jar, &state)?;
    let claim = state.storage.create_claim(user_id, &req).await?;

    tracing::info!(case_number = %claim.case_number, "claim created");
    Ok((StatusCode::CREATED, Json(claim)))
}

pub async fn list_claims(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<Vec<claim::Model>>> {
    let user_id = current_user(&jar, &state)?;
    Ok(Json(state.storage.get_claims_for_user(user_id).await?))
}

#[derive(Debug, Serialize)]
pub struct SharedClaimsResponse {
    pub shared_with_me: Vec<claim::Model>,
    pub shared_by_me: Vec<claim::Model>,
}

pub async fn list_shared_claims(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<SharedClaimsResponse>> {
    let user_id = current_user(&jar, &state)?;
    let (shared_with_me, shared_by_me) = tokio::try_join!(
        state.storage.get_claims_shared_with(user_id),
        state.storage.get_claims_shared_by(user_id),
    )?;

    Ok(Json(SharedClaimsResponse {
        shared_with_me,
        shared_by_me,
    }))
}

pub async fn get_claim(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(case_number): Path<String>,
) -> Result<Json<claim::Model>> {
    let user_id = current_user(&jar, &state)?;
    let claim = state.storage.get_claim_by_case_number(&case_number).await?;
    access::require_view(&state.storage, user_id, &claim).await?;

    Ok(Json(claim))
}

pub async fn update_claim_status(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(case_number): Path<String>,
    Json(req): Json<UpdateClaimStatusRequest>,
) -> Result<Json<claim::Model>> {
    let user_id = current_user(&jar, &state)?;
    let claim = state.storage.get_claim_by_case_number(&case_number).await?;
    access::require_owner(user_id, &claim)?;

    Ok(Json(state.storage.update_claim_status(claim.id, req.status).await?))
}

// Evidence

pub async fn list_evidence(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(case_number): Path<String>,
) -> Result<Json<Vec<evidence::Model>>> {
    let user_id = current_user(&jar, &state)?;
    let claim = state.storage.get_claim_by_case_number(&case_number).await?;

    if !access::require_view(&state.storage, user_id, &claim)
        .await?
        .can_view_evidence()
    {
        return Err(AppError::Forbidden(format!(
            "Evidence of {} is not shared with you",
            claim.case_number
        )));
    }

    Ok(Json(state.storage.get_evidence_for_claim(claim.id).await?))
}

pub async fn add_evidence(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(case_number): Path<String>,
    Json(req): Json<AddEvidenceRequest>,
) -> Result<(StatusCode, Json<evidence::Model>)> {
    let user_id = current_user(&jar, &state)?;
    let claim = state.storage.get_claim_by_case_number(&case_number).await?;
    access::require_edit(&state.storage, user_id, &claim).await?;

    let exhibit_number = next_exhibit_number(state.storage.get_exhibit_numbers(claim.id).await?);
    let evidence = state
        .storage
        .add_evidence(user_id, &claim, &req, exhibit_number)
        .await?;

    Ok((StatusCode::CREATED, Json(evidence)))
}

pub async fn reorder_evidence(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(case_number): Path<String>,
    Json(req): Json<ReorderEvidenceRequest>,
) -> Result<Json<Vec<evidence::Model>>> {
    let user_id = current_user(&jar, &state)?;
    let claim = state.storage.get_claim_by_case_number(&case_number).await?;
    access::require_edit(&state.storage, user_id, &claim).await?;

    Ok(Json(
        state
            .storage
            .reorder_evidence(claim.id, &req.evidence_ids)
            .await?,
    ))
}

pub async fn update_evidence(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(evidence_id): Path<Uuid>,
    Json(req): Json<UpdateEvidenceRequest>,
) -> Result<Json<evidence::Model>> {
    let user_id = current_user(&jar, &state)?;
    let item = state.storage.get_evidence(evidence_id).await?;

    match &item.case_number {
        Some(case_number) => {
            let claim = state.storage.get_claim_by_case_number(case_number).await?;
            access::require_edit(&state.storage, user_id, &claim).await?;
        }
        None if item.user_id == user_id => {}
        None => return Err(AppError::not_found(format!("Evidence {}", evidence_id))),
    }

    Ok(Json(state.storage.update_evidence(evidence_id, &req).await?))
}

#[derive(Debug, Serialize)]
pub struct CloneResponse {
    pub message: String,
    #[serde(flatten)]
    pub report: CloneReport,
}

pub async fn clone_evidence(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<CloneEvidenceRequest>,
) -> Result<Json<CloneResponse>> {
    let user_id = current_user(&jar, &state)?;
    if req.evidence_ids.is_empty() {
        return Err(AppError::BadRequest("No evidence selected".to_string()));
    }

    let report = exhibits::clone_evidence(
        &state.storage,
        user_id,
        &req.evidence_ids,
        &req.destination_case_number,
    )
    .await?;

    Ok(Json(CloneResponse {
        message: report.message(),
        report,
    }))
}

#[derive(Debug, Serialize)]
pub struct ShareEvidenceResponse {
    pub message: String,
    #[serde(flatten)]
    pub report: FanOutReport,
}

pub async fn share_evidence(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<ShareEvidenceRequest>,
) -> Result<Json<ShareEvidenceResponse>> {
    let user_id = current_user(&jar, &state)?;
    if req.evidence_ids.is_empty() {
        return Err(AppError::BadRequest("No evidence selected".to_string()));
    }

    let report =
        exhibits::share_to_shared_claim(&state.storage, user_id, &req.evidence_ids, &req.case_number)
            .await?;

    Ok(Json(ShareEvidenceResponse {
        message: report.host.message(),
        report,
    }))
}

// Shares

pub async fn list_shares(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(case_number): Path<String>,
) -> Result<Json<Vec<claim_share::Model>>> {
    let user_id = current_user(&jar, &state)?;
    let claim = state.storage.get_claim_by_case_number(&case_number).await?;
    access::require_owner(user_id, &claim)?;

    Ok(Json(state.storage.get_shares_for_claim(claim.id).await?))
}

pub async fn share_claim(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(case_number): Path<String>,
    Json(req): Json<ShareClaimRequest>,
) -> Result<(StatusCode, Json<claim_share::Model>)> {
    let user_id = current_user(&jar, &state)?;
    let claim = state.storage.get_claim_by_case_number(&case_number).await?;
    access::require_owner(user_id, &claim)?;

    let share = state
        .storage
        .create_share(&claim, &req, state.collaborator_limit)
        .await?;

    tracing::info!(case_number = %claim.case_number, guest = %share.shared_with_id, "claim shared");
    Ok((StatusCode::CREATED, Json(share)))
}

/// Loads a share the user is party to, either as host or as guest.
async fn share_for_party(state: &AppState, user_id: Uuid, share_id: Uuid) -> Result<claim_share::Model> {
    let share = state.storage.get_share(share_id).await?;
    if share.owner_id != user_id && share.shared_with_id != user_id {
        return Err(AppError::not_found(format!("Share {}", share_id)));
    }
    Ok(share)
}

pub async fn update_donation(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(share_id): Path<Uuid>,
    Json(req): Json<UpdateDonationRequest>,
) -> Result<Json<claim_share::Model>> {
    let user_id = current_user(&jar, &state)?;
    share_for_party(&state, user_id, share_id).await?;

    Ok(Json(state.storage.update_donation(share_id, &req).await?))
}

pub async fn update_share_access(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(share_id): Path<Uuid>,
    Json(req): Json<UpdateShareAccessRequest>,
) -> Result<Json<claim_share::Model>> {
    let user_id = current_user(&jar, &state)?;
    let share = share_for_party(&state, user_id, share_id).await?;
    if share.owner_id != user_id {
        return Err(AppError::Forbidden("Only the host can change access".to_string()));
    }

    Ok(Json(state.storage.update_share_access(share_id, &req).await?))
}

pub async fn revoke_share(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(share_id): Path<Uuid>,
) -> Result<Json<serde_json::Value>> {
    let user_id = current_user(&jar, &state)?;
    let share = share_for_party(&state, user_id, share_id).await?;
    if share.owner_id != user_id {
        return Err(AppError::Forbidden("Only the host can revoke a share".to_string()));
    }

    state.storage.delete_share(share_id).await?;
    Ok(Json(json!({"success": true})))
}

// Todos and calendar

pub async fn list_todos(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(case_number): Path<String>,
) -> Result<Json<Vec<todo::Model>>> {
    let user_id = current_user(&jar, &state)?;
    let claim = state.storage.get_claim_by_case_number(&case_number).await?;
    access::require_view(&state.storage, user_id, &claim).await?;

    Ok(Json(state.storage.get_todos_for_case(&claim.case_number).await?))
}

pub async fn create_todo(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(case_number): Path<String>,
    Json(req): Json<CreateTodoRequest>,
) -> Result<(StatusCode, Json<todo::Model>)> {
    let user_id = current_user(&jar, &state)?;
    let claim = state.storage.get_claim_by_case_number(&case_number).await?;
    access::require_edit(&state.storage, user_id, &claim).await?;

    let todo = state
        .storage
        .create_todo(user_id, Some(&claim.case_number), &req)
        .await?;

    Ok((StatusCode::CREATED, Json(todo)))
}

pub async fn complete_todo(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(todo_id): Path<Uuid>,
) -> Result<Json<todo::Model>> {
    let user_id = current_user(&jar, &state)?;
    let todo = state.storage.get_todo(todo_id).await?;

    let assigned = alerts::is_assigned_to(todo.responsible_user_id, todo.user_id, user_id);
    if !assigned {
        let Some(case_number) = &todo.case_number else {
            return Err(AppError::not_found(format!("Todo {}", todo_id)));
        };
        let claim = state.storage.get_claim_by_case_number(case_number).await?;
        access::require_edit(&state.storage, user_id, &claim).await?;
    }

    Ok(Json(state.storage.set_todo_completed(todo_id, true).await?))
}

pub async fn list_events(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(case_number): Path<String>,
) -> Result<Json<Vec<calendar_event::Model>>> {
    let user_id = current_user(&jar, &state)?;
    let claim = state.storage.get_claim_by_case_number(&case_number).await?;
    access::require_view(&state.storage, user_id, &claim).await?;

    Ok(Json(state.storage.get_events_for_claim(claim.id).await?))
}

pub async fn create_event(
    State(state): State<AppState>,
    jar: CookieJar,
    Path(case_number): Path<String>,
    Json(req): Json<CreateEventRequest>,
) -> Result<(StatusCode, Json<calendar_event::Model>)> {
    let user_id = current_user(&jar, &state)?;
    let claim = state.storage.get_claim_by_case_number(&case_number).await?;
    access::require_edit(&state.storage, user_id, &claim).await?;

    let event = state.storage.create_event(user_id, claim.id, &req).await?;
    Ok((StatusCode::CREATED, Json(event)))
}

// Alerts

#[derive(Debug, Deserialize)]
pub struct AlertsQuery {
    pub scope: AlertScope,
}

pub async fn get_alerts(
    State(state): State<AppState>,
    jar: CookieJar,
    Query(query): Query<AlertsQuery>,
) -> Result<Json<AlertsSummary>> {
    let user_id = current_user(&jar, &state)?;
    let summary =
        alerts::alerts_for_scope(&state.storage, user_id, query.scope, chrono::Utc::now()).await?;

    Ok(Json(summary))
}

pub async fn get_combined_alerts(
    State(state): State<AppState>,
    jar: CookieJar,
) -> Result<Json<CombinedAlerts>> {
    let user_id = current_user(&jar, &state)?;
    Ok(Json(
        alerts::combined_alerts(&state.storage, user_id, chrono::Utc::now()).await?,
    ))
}
