// ABOUTME: Authentication helper functions for session validation in endpoints
// ABOUTME: Resolves the acting profile id from the session cookie

use crate::{AppState, error, session};
use axum_extra::extract::cookie::CookieJar;
use uuid::Uuid;

pub fn current_user(jar: &CookieJar, state: &AppState) -> error::Result<Uuid> {
    let session_data = session::extract_session_from_jar(jar, &state.sessions)?;
    Ok(session_data.user_id)
}
