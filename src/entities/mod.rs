// ABOUTME: SeaORM entities module for claims, evidence, sharing, tasks and calendar rows
// ABOUTME: Exports all entity definitions plus the shared enum column types

pub mod calendar_event;
pub mod claim;
pub mod claim_share;
pub mod evidence;
pub mod evidence_claim;
pub mod profile;
pub mod todo;

pub use claim::ClaimStatus;
pub use claim_share::SharePermission;
pub use evidence::EvidenceMethod;
