// ABOUTME: Shared fixtures for storage, exhibit, alert and HTTP tests
// ABOUTME: Each test gets its own migrated SQLite database inside a temp directory

use tempfile::TempDir;
use uuid::Uuid;

use crate::entities::{claim, evidence, profile};
use crate::storage::Storage;
use crate::types::{AddEvidenceRequest, CreateClaimRequest};

pub async fn create_test_storage() -> (Storage, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("test.db");

    let db_url = format!("sqlite:{}?mode=rwc", db_path.display());
    let storage = Storage::new(&db_url).await.unwrap();

    (storage, temp_dir)
}

pub async fn create_profile(storage: &Storage, name: &str) -> profile::Model {
    storage
        .create_profile(&format!("{}@example.com", name), name)
        .await
        .unwrap()
}

pub fn claim_request(case_number: &str) -> CreateClaimRequest {
    CreateClaimRequest {
        case_number: case_number.to_string(),
        title: format!("Claim {}", case_number),
        court: Some("County Court".to_string()),
        plaintiff_name: Some("A. Plaintiff".to_string()),
        defendant_name: Some("B. Defendant".to_string()),
        description: None,
        status: None,
    }
}

pub async fn create_claim(storage: &Storage, owner: Uuid, case_number: &str) -> claim::Model {
    storage
        .create_claim(owner, &claim_request(case_number))
        .await
        .unwrap()
}

pub async fn add_evidence(
    storage: &Storage,
    owner: Uuid,
    claim: &claim::Model,
    file_name: &str,
    exhibit_number: i32,
) -> evidence::Model {
    let request = AddEvidenceRequest {
        file_name: file_name.to_string(),
        file_url: Some(format!("evidence/{}", file_name)),
        file_size: Some(2048),
        file_type: Some("application/pdf".to_string()),
        number_of_pages: Some(3),
        ..Default::default()
    };

    storage
        .add_evidence(owner, claim, &request, exhibit_number)
        .await
        .unwrap()
}

pub fn exhibit_numbers(items: &[evidence::Model]) -> Vec<i32> {
    let mut numbers: Vec<i32> = items.iter().filter_map(|e| e.exhibit_number).collect();
    numbers.sort_unstable();
    numbers
}
