// ABOUTME: Evidence cloning across claims with independent per-claim exhibit numbering
// ABOUTME: Also fans a host's shared-claim evidence out into each guest's own private claim

use sea_orm::Set;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use crate::access::{self, ClaimAccess};
use crate::entities::{EvidenceMethod, claim, evidence};
use crate::error::{AppError, Result};
use crate::storage::Storage;

/// Reads a stored exhibit number, treating anything that is not a finite number as 0.
///
/// Numeric strings are accepted since older rows were written by clients that
/// sent the field as text.
pub fn coerce_exhibit_number(value: &serde_json::Value) -> i64 {
    let number = match value {
        serde_json::Value::Number(n) => n.as_i64().or_else(|| n.as_f64().map(|f| f.trunc() as i64)),
        serde_json::Value::String(s) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(|f| f.trunc() as i64),
        _ => None,
    };

    number.unwrap_or(0).max(0)
}

/// First exhibit number after the existing ones; 1 for an empty claim.
pub fn next_exhibit_number<I>(existing: I) -> i32
where
    I: IntoIterator<Item = i64>,
{
    let max = existing.into_iter().max().unwrap_or(0).max(0);
    i32::try_from(max + 1).unwrap_or(i32::MAX)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClonedExhibit {
    pub source_id: Uuid,
    pub evidence_id: Uuid,
    pub exhibit_number: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloneFailure {
    pub source_id: Uuid,
    pub reason: String,
}

/// Outcome of cloning a batch of evidence into one destination claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CloneReport {
    pub claim_id: Uuid,
    pub case_number: String,
    pub success_count: usize,
    pub error_count: usize,
    pub cloned: Vec<ClonedExhibit>,
    pub failures: Vec<CloneFailure>,
}

impl CloneReport {
    fn new(claim: &claim::Model) -> Self {
        Self {
            claim_id: claim.id,
            case_number: claim.case_number.clone(),
            success_count: 0,
            error_count: 0,
            cloned: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.error_count == 0
    }

    /// User-facing summary of the batch.
    pub fn message(&self) -> String {
        match (self.success_count, self.error_count) {
            (0, 0) => "No evidence selected".to_string(),
            (copied, 0) => format!("Copied {} item(s) to {}", copied, self.case_number),
            (0, failed) => format!("Failed to copy {} item(s) to {}", failed, self.case_number),
            (copied, failed) => format!("Partial Success: copied {}, {} failed", copied, failed),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum GuestCloneStatus {
    Cloned { report: CloneReport },
    Skipped { reason: String },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GuestCloneOutcome {
    pub guest_id: Uuid,
    #[serde(flatten)]
    pub status: GuestCloneStatus,
}

/// Outcome of sharing evidence into a shared claim and every guest's private claim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FanOutReport {
    pub host: CloneReport,
    pub guests: Vec<GuestCloneOutcome>,
}

/// Copies evidence into the claim identified by `destination_case_number`.
///
/// Each item becomes a new evidence row owned by `actor` with the next exhibit
/// number of the destination. Failed items are counted and skipped; items
/// cloned before a failure are kept.
#[tracing::instrument(skip(storage, source_ids), fields(items = source_ids.len()))]
pub async fn clone_evidence(
    storage: &Storage,
    actor: Uuid,
    source_ids: &[Uuid],
    destination_case_number: &str,
) -> Result<CloneReport> {
    let destination = storage.get_claim_by_case_number(destination_case_number).await?;

    if !access::claim_access(storage, actor, &destination).await?.can_edit() {
        return Err(AppError::Forbidden(format!(
            "No edit access to claim {}",
            destination.case_number
        )));
    }

    clone_into_claim(storage, actor, source_ids, &destination).await
}

/// Host-only: clones into the shared claim, then into one open private claim of each guest.
///
/// Every guest claim gets its own exhibit sequence. A failing guest is
/// recorded and the remaining guests are still processed.
#[tracing::instrument(skip(storage, source_ids), fields(items = source_ids.len()))]
pub async fn share_to_shared_claim(
    storage: &Storage,
    host: Uuid,
    source_ids: &[Uuid],
    case_number: &str,
) -> Result<FanOutReport> {
    let shared_claim = storage.get_claim_by_case_number(case_number).await?;

    if !matches!(
        access::claim_access(storage, host, &shared_claim).await?,
        ClaimAccess::Owner
    ) {
        return Err(AppError::Forbidden(format!(
            "Only the owner of {} can share evidence to its guests",
            shared_claim.case_number
        )));
    }

    let host_report = clone_into_claim(storage, host, source_ids, &shared_claim).await?;

    let shares = storage.get_shares_for_claim(shared_claim.id).await?;
    let mut guests = Vec::with_capacity(shares.len());
    for share in shares {
        let guest_id = share.shared_with_id;
        let result = clone_for_guest(storage, host, guest_id, source_ids, &shared_claim).await;
        guests.push(guest_outcome(guest_id, result));
    }

    info!(
        claim = %shared_claim.case_number,
        copied = host_report.success_count,
        guests = guests.len(),
        "shared evidence to claim guests"
    );

    Ok(FanOutReport {
        host: host_report,
        guests,
    })
}

/// Folds one guest's result into the report; an error stops only that guest.
fn guest_outcome(guest_id: Uuid, result: Result<GuestCloneStatus>) -> GuestCloneOutcome {
    let status = result.unwrap_or_else(|err| {
        warn!(%guest_id, error = %err, "guest fan-out failed");
        GuestCloneStatus::Failed {
            reason: err.to_string(),
        }
    });

    GuestCloneOutcome { guest_id, status }
}

/// Clones into the guest's open private claim. The host stays the acting user
/// and owner of the copies; the guest edits them through claim ownership.
async fn clone_for_guest(
    storage: &Storage,
    host: Uuid,
    guest_id: Uuid,
    source_ids: &[Uuid],
    shared_claim: &claim::Model,
) -> Result<GuestCloneStatus> {
    let Some(guest_claim) = storage
        .get_private_claim_for_guest(guest_id, shared_claim.id)
        .await?
    else {
        return Ok(GuestCloneStatus::Skipped {
            reason: "Guest has no open private claim".to_string(),
        });
    };

    let report = clone_into_claim(storage, host, source_ids, &guest_claim).await?;
    if !report.is_complete() {
        warn!(
            %guest_id,
            claim = %guest_claim.case_number,
            failed = report.error_count,
            "some evidence did not reach guest claim"
        );
    }

    Ok(GuestCloneStatus::Cloned { report })
}

/// Sequential clone loop. The exhibit counter is read once and advanced only
/// after a successful clone, so a batch never leaves gaps.
async fn clone_into_claim(
    storage: &Storage,
    actor: Uuid,
    source_ids: &[Uuid],
    destination: &claim::Model,
) -> Result<CloneReport> {
    let existing = storage.get_exhibit_numbers(destination.id).await?;
    let mut next_number = next_exhibit_number(existing);
    let mut report = CloneReport::new(destination);

    for &source_id in source_ids {
        match clone_one(storage, actor, source_id, destination, next_number).await {
            Ok(clone) => {
                report.cloned.push(ClonedExhibit {
                    source_id,
                    evidence_id: clone.id,
                    exhibit_number: next_number,
                });
                report.success_count += 1;
                next_number += 1;
            }
            Err(err) => {
                warn!(%source_id, claim = %destination.case_number, error = %err, "evidence clone failed");
                report.failures.push(CloneFailure {
                    source_id,
                    reason: err.to_string(),
                });
                report.error_count += 1;
            }
        }
    }

    Ok(report)
}

async fn clone_one(
    storage: &Storage,
    actor: Uuid,
    source_id: Uuid,
    destination: &claim::Model,
    exhibit_number: i32,
) -> Result<evidence::Model> {
    let source = storage.get_evidence(source_id).await?;

    // Unreadable rows look the same as missing ones
    if !storage.can_view_evidence(actor, &source).await? {
        return Err(AppError::not_found(format!("Evidence {}", source_id)));
    }

    storage
        .insert_linked_evidence(destination, clone_row(&source, actor, exhibit_number))
        .await
}

/// New row carrying only the file identity of `source`; annotations stay with the source claim.
fn clone_row(source: &evidence::Model, owner: Uuid, exhibit_number: i32) -> evidence::ActiveModel {
    evidence::ActiveModel {
        id: Set(Uuid::new_v4()),
        user_id: Set(owner),
        title: Set(source.title.clone().or_else(|| Some(source.file_name.clone()))),
        file_name: Set(source.file_name.clone()),
        file_url: Set(source.file_url.clone()),
        file_size: Set(source.file_size),
        file_type: Set(source.file_type.clone()),
        number_of_pages: Set(source.number_of_pages),
        date_submitted: Set(source.date_submitted),
        method: Set(EvidenceMethod::ToDo),
        exhibit_number: Set(Some(exhibit_number)),
        description: Set(None),
        book_of_deeds_ref: Set(None),
        url_link: Set(None),
        ..Default::default()
    }
}
