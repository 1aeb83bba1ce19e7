// ABOUTME: Integration tests for API endpoints
// ABOUTME: Tests complete request/response flows, session handling and error mapping

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::test_support::*;
    use axum::http::{HeaderName, HeaderValue, StatusCode, header};
    use axum_test::TestServer;
    use serde_json::{Value, json};
    use tempfile::TempDir;
    use uuid::Uuid;

    struct TestApp {
        server: TestServer,
        state: AppState,
        _temp_dir: TempDir,
    }

    impl TestApp {
        fn cookie_for(&self, user_id: Uuid) -> (HeaderName, HeaderValue) {
            let session_id = self.state.sessions.create_session(user_id);
            let value = format!("{}={}", session::SESSION_COOKIE_NAME, session_id);
            (header::COOKIE, HeaderValue::from_str(&value).unwrap())
        }
    }

    async fn create_test_app(collaborator_limit: u64) -> TestApp {
        let (storage, temp_dir) = create_test_storage().await;

        let state = AppState {
            storage: Arc::new(storage),
            sessions: SessionStore::new(),
            collaborator_limit,
            secure_cookies: false,
        };

        let server = TestServer::new(build_router(state.clone())).unwrap();
        TestApp {
            server,
            state,
            _temp_dir: temp_dir,
        }
    }

    async fn create_profile_via_api(app: &TestApp, name: &str) -> Uuid {
        let response = app
            .server
            .post("/profiles")
            .json(&json!({"email": format!("{}@example.com", name), "display_name": name}))
            .await;
        response.assert_status(StatusCode::CREATED);

        let body: Value = response.json();
        body["id"].as_str().unwrap().parse().unwrap()
    }

    async fn create_claim_via_api(app: &TestApp, owner: Uuid, case_number: &str) {
        let (name, value) = app.cookie_for(owner);
        app.server
            .post("/claims")
            .add_header(name, value)
            .json(&json!({"case_number": case_number, "title": "Unpaid invoices"}))
            .await
            .assert_status(StatusCode::CREATED);
    }

    async fn add_evidence_via_api(app: &TestApp, owner: Uuid, case_number: &str, file_name: &str) -> Value {
        let (name, value) = app.cookie_for(owner);
        let response = app
            .server
            .post(&format!("/claims/{}/evidence", case_number))
            .add_header(name, value)
            .json(&json!({"file_name": file_name, "method": "Email", "description": "original notes"}))
            .await;
        response.assert_status(StatusCode::CREATED);
        response.json()
    }

    #[tokio::test]
    async fn test_requests_without_session_are_rejected() {
        let app = create_test_app(50).await;

        let response = app.server.get("/claims").await;
        response.assert_status(StatusCode::UNAUTHORIZED);

        let body: Value = response.json();
        assert_eq!(body["error"], "Authentication required");
        assert_eq!(body["status"], 401);
    }

    #[tokio::test]
    async fn test_session_start_sets_cookie() {
        let app = create_test_app(50).await;
        let profile_id = create_profile_via_api(&app, "alice").await;

        let response = app
            .server
            .post("/session")
            .json(&json!({"profile_id": profile_id}))
            .await;
        response.assert_status_ok();

        let cookie = response.cookie(session::SESSION_COOKIE_NAME);
        assert!(!cookie.value().is_empty());
        let session = app.state.sessions.get_session(cookie.value()).unwrap();
        assert_eq!(session.user_id, profile_id);
    }

    #[tokio::test]
    async fn test_session_for_unknown_profile_is_not_found() {
        let app = create_test_app(50).await;

        let response = app
            .server
            .post("/session")
            .json(&json!({"profile_id": Uuid::new_v4()}))
            .await;
        response.assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_claim_and_evidence_flow() {
        let app = create_test_app(50).await;
        let owner = create_profile_via_api(&app, "owner").await;
        create_claim_via_api(&app, owner, "CL-1").await;

        let first = add_evidence_via_api(&app, owner, "CL-1", "a.pdf").await;
        let second = add_evidence_via_api(&app, owner, "CL-1", "b.pdf").await;
        assert_eq!(first["exhibit_number"], 1);
        assert_eq!(second["exhibit_number"], 2);

        let (name, value) = app.cookie_for(owner);
        let response = app
            .server
            .put("/claims/CL-1/evidence/order")
            .add_header(name.clone(), value.clone())
            .json(&json!({"evidence_ids": [first["id"], second["id"]]}))
            .await;
        response.assert_status_ok();
        let reordered: Value = response.json();
        assert_eq!(reordered[0]["id"], first["id"]);
        assert_eq!(reordered[0]["exhibit_number"], 1);

        let response = app
            .server
            .get("/claims/CL-1/evidence")
            .add_header(name, value)
            .await;
        response.assert_status_ok();
        let listed: Value = response.json();
        assert_eq!(listed.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_duplicate_case_number_conflicts() {
        let app = create_test_app(50).await;
        let owner = create_profile_via_api(&app, "owner").await;
        create_claim_via_api(&app, owner, "CL-1").await;

        let (name, value) = app.cookie_for(owner);
        app.server
            .post("/claims")
            .add_header(name, value)
            .json(&json!({"case_number": "CL-1", "title": "Again"}))
            .await
            .assert_status(StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_clone_endpoint_reports_partial_success() {
        let app = create_test_app(50).await;
        let owner = create_profile_via_api(&app, "owner").await;
        create_claim_via_api(&app, owner, "SRC").await;
        create_claim_via_api(&app, owner, "DST").await;
        let item = add_evidence_via_api(&app, owner, "SRC", "a.pdf").await;

        let (name, value) = app.cookie_for(owner);
        let response = app
            .server
            .post("/evidence/clone")
            .add_header(name, value)
            .json(&json!({
                "evidence_ids": [item["id"], Uuid::new_v4()],
                "destination_case_number": "DST"
            }))
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["message"], "Partial Success: copied 1, 1 failed");
        assert_eq!(body["success_count"], 1);
        assert_eq!(body["error_count"], 1);
        assert_eq!(body["cloned"][0]["exhibit_number"], 1);
    }

    #[tokio::test]
    async fn test_clone_to_missing_claim_is_not_found() {
        let app = create_test_app(50).await;
        let owner = create_profile_via_api(&app, "owner").await;
        create_claim_via_api(&app, owner, "SRC").await;
        let item = add_evidence_via_api(&app, owner, "SRC", "a.pdf").await;

        let (name, value) = app.cookie_for(owner);
        app.server
            .post("/evidence/clone")
            .add_header(name, value)
            .json(&json!({"evidence_ids": [item["id"]], "destination_case_number": "NOPE"}))
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_sharing_and_guest_access() {
        let app = create_test_app(1).await;
        let host = create_profile_via_api(&app, "host").await;
        let guest = create_profile_via_api(&app, "guest").await;
        let extra = create_profile_via_api(&app, "extra").await;
        create_claim_via_api(&app, host, "SH-1").await;
        add_evidence_via_api(&app, host, "SH-1", "a.pdf").await;

        let (host_name, host_value) = app.cookie_for(host);
        let response = app
            .server
            .post("/claims/SH-1/shares")
            .add_header(host_name.clone(), host_value.clone())
            .json(&json!({"shared_with_id": guest, "permission": "view"}))
            .await;
        response.assert_status(StatusCode::CREATED);
        let share: Value = response.json();

        // Limit of one collaborator
        app.server
            .post("/claims/SH-1/shares")
            .add_header(host_name.clone(), host_value.clone())
            .json(&json!({"shared_with_id": extra}))
            .await
            .assert_status(StatusCode::CONFLICT);

        let (guest_name, guest_value) = app.cookie_for(guest);
        let response = app
            .server
            .get("/shared-claims")
            .add_header(guest_name.clone(), guest_value.clone())
            .await;
        let listing: Value = response.json();
        assert_eq!(listing["shared_with_me"][0]["case_number"], "SH-1");
        assert_eq!(listing["shared_by_me"], json!([]));

        app.server
            .get("/claims/SH-1")
            .add_header(guest_name.clone(), guest_value.clone())
            .await
            .assert_status_ok();
        app.server
            .get("/claims/SH-1/evidence")
            .add_header(guest_name.clone(), guest_value.clone())
            .await
            .assert_status(StatusCode::FORBIDDEN);

        let share_id = share["id"].as_str().unwrap();
        app.server
            .put(&format!("/shares/{}/access", share_id))
            .add_header(guest_name.clone(), guest_value.clone())
            .json(&json!({"can_view_evidence": true}))
            .await
            .assert_status(StatusCode::FORBIDDEN);
        app.server
            .put(&format!("/shares/{}/access", share_id))
            .add_header(host_name.clone(), host_value.clone())
            .json(&json!({"can_view_evidence": true}))
            .await
            .assert_status_ok();
        app.server
            .get("/claims/SH-1/evidence")
            .add_header(guest_name.clone(), guest_value.clone())
            .await
            .assert_status_ok();

        // Guest records their donation
        let response = app
            .server
            .put(&format!("/shares/{}/donation", share_id))
            .add_header(guest_name.clone(), guest_value.clone())
            .json(&json!({"donation_paid": true, "donation_amount": 1000}))
            .await;
        response.assert_status_ok();
        let updated: Value = response.json();
        assert_eq!(updated["donation_paid"], true);

        app.server
            .delete(&format!("/shares/{}", share_id))
            .add_header(host_name, host_value)
            .await
            .assert_status_ok();
        app.server
            .get("/claims/SH-1")
            .add_header(guest_name, guest_value)
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_share_evidence_fans_out() {
        let app = create_test_app(50).await;
        let host = create_profile_via_api(&app, "host").await;
        let guest = create_profile_via_api(&app, "guest").await;
        create_claim_via_api(&app, host, "HOST-1").await;
        create_claim_via_api(&app, host, "SH-1").await;
        create_claim_via_api(&app, guest, "GUEST-1").await;
        let item = add_evidence_via_api(&app, host, "HOST-1", "a.pdf").await;

        let (name, value) = app.cookie_for(host);
        app.server
            .post("/claims/SH-1/shares")
            .add_header(name.clone(), value.clone())
            .json(&json!({"shared_with_id": guest}))
            .await
            .assert_status(StatusCode::CREATED);

        let response = app
            .server
            .post("/evidence/share")
            .add_header(name, value)
            .json(&json!({"evidence_ids": [item["id"]], "case_number": "SH-1"}))
            .await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["host"]["success_count"], 1);
        assert_eq!(body["guests"][0]["status"], "cloned");
        assert_eq!(body["guests"][0]["report"]["case_number"], "GUEST-1");
        assert_eq!(body["guests"][0]["report"]["cloned"][0]["exhibit_number"], 1);
    }

    #[tokio::test]
    async fn test_alert_endpoints() {
        let app = create_test_app(50).await;
        let owner = create_profile_via_api(&app, "owner").await;
        create_claim_via_api(&app, owner, "CL-1").await;

        let (name, value) = app.cookie_for(owner);
        let response = app
            .server
            .post("/claims/CL-1/todos")
            .add_header(name.clone(), value.clone())
            .json(&json!({"title": "Chase payment", "due_date": "2020-01-01"}))
            .await;
        response.assert_status(StatusCode::CREATED);
        let todo: Value = response.json();

        let response = app
            .server
            .get("/alerts")
            .add_query_param("scope", "shared")
            .add_header(name.clone(), value.clone())
            .await;
        response.assert_status_ok();
        let shared: Value = response.json();
        assert_eq!(
            shared,
            json!({
                "todoAlerts": 0,
                "calendarAlerts": 0,
                "total": 0,
                "todos": [],
                "events": [],
                "perClaimAlerts": {}
            })
        );

        let response = app
            .server
            .get("/alerts/combined")
            .add_header(name.clone(), value.clone())
            .await;
        response.assert_status_ok();
        let combined: Value = response.json();
        assert_eq!(combined["privateTotal"], 1);
        assert_eq!(combined["myTasks"], 1);
        assert_eq!(combined["overdue"], 1);

        let todo_id = todo["id"].as_str().unwrap();
        app.server
            .put(&format!("/todos/{}/complete", todo_id))
            .add_header(name.clone(), value.clone())
            .await
            .assert_status_ok();

        let response = app
            .server
            .get("/alerts")
            .add_query_param("scope", "private")
            .add_header(name, value)
            .await;
        let private: Value = response.json();
        assert_eq!(private["total"], 0);
    }

    #[tokio::test]
    async fn test_responses_carry_api_headers() {
        let app = create_test_app(50).await;

        let response = app.server.get("/claims").await;
        assert_eq!(response.header("x-content-type-options"), "nosniff");
        assert_eq!(response.header("cache-control"), "no-store");
        assert_eq!(response.header("x-frame-options"), "DENY");
    }

    #[tokio::test]
    async fn test_logout_ends_session() {
        let app = create_test_app(50).await;
        let owner = create_profile_via_api(&app, "owner").await;

        let (name, value) = app.cookie_for(owner);
        app.server
            .post("/logout")
            .add_header(name.clone(), value.clone())
            .await
            .assert_status_ok();

        app.server
            .get("/claims")
            .add_header(name, value)
            .await
            .assert_status(StatusCode::UNAUTHORIZED);
    }
}
