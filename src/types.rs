// ABOUTME: Type definitions for API requests and responses
// ABOUTME: Covers sessions, profiles, claims, evidence, sharing, todos and calendar events

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::entities::{ClaimStatus, EvidenceMethod, SharePermission};

// Session types
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub profile_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionResponse {
    pub success: bool,
    pub user_id: Uuid,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateProfileRequest {
    pub email: String,
    pub display_name: String,
}

// Claim types
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateClaimRequest {
    pub case_number: String,
    pub title: String,
    pub court: Option<String>,
    pub plaintiff_name: Option<String>,
    pub defendant_name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ClaimStatus>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateClaimStatusRequest {
    pub status: ClaimStatus,
}

// Evidence types
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AddEvidenceRequest {
    pub file_name: String,
    pub file_url: Option<String>,
    pub file_size: Option<i64>,
    pub file_type: Option<String>,
    pub title: Option<String>,
    pub number_of_pages: Option<i32>,
    pub date_submitted: Option<NaiveDate>,
    pub method: Option<EvidenceMethod>,
    pub description: Option<String>,
    pub book_of_deeds_ref: Option<String>,
    pub url_link: Option<String>,
}

/// Per-claim annotations; absent fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEvidenceRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub method: Option<EvidenceMethod>,
    pub date_submitted: Option<NaiveDate>,
    pub book_of_deeds_ref: Option<String>,
    pub url_link: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ReorderEvidenceRequest {
    pub evidence_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CloneEvidenceRequest {
    pub evidence_ids: Vec<Uuid>,
    pub destination_case_number: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ShareEvidenceRequest {
    pub evidence_ids: Vec<Uuid>,
    pub case_number: String,
}

// Sharing types
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareClaimRequest {
    pub shared_with_id: Uuid,
    pub permission: Option<SharePermission>,
    #[serde(default)]
    pub can_view_evidence: bool,
    #[serde(default)]
    pub donation_required: bool,
    pub donation_amount: Option<i64>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateDonationRequest {
    pub donation_paid: bool,
    pub donation_amount: Option<i64>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateShareAccessRequest {
    pub permission: Option<SharePermission>,
    pub can_view_evidence: Option<bool>,
}

// Task and calendar types
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTodoRequest {
    pub title: String,
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub alarm_enabled: bool,
    pub alarm_time: Option<i64>,
    pub responsible_user_id: Option<Uuid>,
    pub evidence_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateEventRequest {
    pub title: String,
    pub description: Option<String>,
    pub start_time: i64,
    pub end_time: Option<i64>,
    pub responsible_user_id: Option<Uuid>,
}
