// ABOUTME: Session management with HttpOnly cookies identifying the acting profile
// ABOUTME: Identity is verified upstream; this store only maps session ids to profile ids

use crate::error::{AppError, Result};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionData {
    pub user_id: Uuid,
    pub created_at: i64,
}

#[derive(Clone)]
pub struct SessionStore {
    sessions: Arc<RwLock<HashMap<String, SessionData>>>,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    pub fn create_session(&self, user_id: Uuid) -> String {
        let session_id = Uuid::new_v4().to_string();
        let session_data = SessionData {
            user_id,
            created_at: chrono::Utc::now().timestamp(),
        };

        if let Ok(mut sessions) = self.sessions.write() {
            sessions.insert(session_id.clone(), session_data);
        }

        session_id
    }

    pub fn get_session(&self, session_id: &str) -> Option<SessionData> {
        let sessions = self.sessions.read().ok()?;
        let session = sessions.get(session_id)?;

        if session.created_at <= chrono::Utc::now().timestamp() - SESSION_MAX_AGE {
            return None;
        }

        Some(session.clone())
    }

    pub fn remove_session(&self, session_id: &str) {
        if let Ok(mut sessions) = self.sessions.write() {
            sessions.remove(session_id);
        }
    }

    pub fn cleanup_expired_sessions(&self) -> usize {
        let cutoff = chrono::Utc::now().timestamp() - SESSION_MAX_AGE;

        match self.sessions.write() {
            Ok(mut sessions) => {
                let before = sessions.len();
                sessions.retain(|_, session| session.created_at > cutoff);
                before - sessions.len()
            }
            Err(_) => 0,
        }
    }
}

pub const SESSION_COOKIE_NAME: &str = "claimdesk_session";
pub const SESSION_MAX_AGE: i64 = 24 * 60 * 60; // 24 hours

pub fn create_session_cookie(session_id: String, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, session_id))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::seconds(SESSION_MAX_AGE))
        .path("/")
        .build()
}

pub fn create_logout_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE_NAME, ""))
        .http_only(true)
        .same_site(SameSite::Strict)
        .max_age(time::Duration::seconds(0))
        .path("/")
        .build()
}

pub fn extract_session_from_jar(
    jar: &CookieJar,
    session_store: &SessionStore,
) -> Result<SessionData> {
    let session_cookie = jar
        .get(SESSION_COOKIE_NAME)
        .ok_or_else(|| AppError::Unauthorized("No session cookie found".to_string()))?;

    let session_data = session_store
        .get_session(session_cookie.value())
        .ok_or_else(|| AppError::Unauthorized("Invalid session".to_string()))?;

    Ok(session_data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_roundtrip() {
        let store = SessionStore::new();
        let user_id = Uuid::new_v4();

        let session_id = store.create_session(user_id);
        assert_eq!(store.get_session(&session_id).unwrap().user_id, user_id);

        store.remove_session(&session_id);
        assert!(store.get_session(&session_id).is_none());
    }

    #[test]
    fn test_missing_cookie_is_unauthorized() {
        let store = SessionStore::new();
        let jar = CookieJar::new();

        let result = extract_session_from_jar(&jar, &store);
        assert!(matches!(result, Err(AppError::Unauthorized(_))));
    }

    #[test]
    fn test_cookie_resolves_session() {
        let store = SessionStore::new();
        let user_id = Uuid::new_v4();
        let session_id = store.create_session(user_id);
        let jar = CookieJar::new().add(create_session_cookie(session_id, false));

        let session = extract_session_from_jar(&jar, &store).unwrap();
        assert_eq!(session.user_id, user_id);
    }

    #[test]
    fn test_cleanup_keeps_fresh_sessions() {
        let store = SessionStore::new();
        store.create_session(Uuid::new_v4());
        assert_eq!(store.cleanup_expired_sessions(), 0);
    }
}
