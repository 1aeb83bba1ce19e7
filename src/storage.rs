// ABOUTME: SeaORM storage layer for profiles, claims, evidence, shares, todos and calendar events
// ABOUTME: Every read goes to the database; every mutation is an immediate write with no local cache

use chrono::NaiveDate;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, Database, DatabaseConnection, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, Set, TransactionTrait,
};
use sea_orm_migration::MigratorTrait;
use std::collections::HashSet;
use uuid::Uuid;

use crate::entities::{
    ClaimStatus, EvidenceMethod, SharePermission, calendar_event, claim, claim_share, evidence,
    evidence_claim, profile, todo,
};
use crate::error::{AppError, Result};
use crate::exhibits::coerce_exhibit_number;
use crate::migration::Migrator;
use crate::types::*;

pub fn now_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

pub struct Storage {
    pub db: DatabaseConnection,
}

impl Storage {
    pub async fn new(database_url: &str) -> anyhow::Result<Self> {
        let db = Database::connect(database_url).await?;

        // Bring the schema up to date before serving anything
        Migrator::up(&db, None).await?;

        let storage = Self { db };
        let repaired = storage.normalize_exhibit_numbers().await?;
        if repaired > 0 {
            tracing::info!(repaired, "normalized non-integer exhibit numbers");
        }

        Ok(storage)
    }

    /// Rewrites exhibit numbers stored as text or reals into integers.
    ///
    /// SQLite keeps whatever type a writer sent, and such rows cannot be read
    /// back as evidence models. Numeric text and reals keep their integer
    /// part, anything else becomes 0, and negatives clamp to 0.
    pub async fn normalize_exhibit_numbers(&self) -> Result<u64> {
        let result = self
            .db
            .execute_unprepared(
                "UPDATE evidence \
                 SET exhibit_number = MAX(0, CAST(CAST(exhibit_number AS REAL) AS INTEGER)) \
                 WHERE typeof(exhibit_number) IN ('text', 'real', 'blob')",
            )
            .await?;

        Ok(result.rows_affected())
    }

    // Profiles

    pub async fn create_profile(&self, email: &str, display_name: &str) -> Result<profile::Model> {
        let existing = profile::Entity::find()
            .filter(profile::Column::Email.eq(email))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict(format!("Profile {} already exists", email)));
        }

        let profile = profile::ActiveModel {
            id: Set(Uuid::new_v4()),
            email: Set(email.to_string()),
            display_name: Set(display_name.to_string()),
            created_at: Set(now_timestamp()),
        };

        Ok(profile.insert(&self.db).await?)
    }

    pub async fn get_profile(&self, profile_id: Uuid) -> Result<profile::Model> {
        profile::Entity::find_by_id(profile_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Profile {}", profile_id)))
    }

    // Claims

    pub async fn create_claim(&self, owner_id: Uuid, request: &CreateClaimRequest) -> Result<claim::Model> {
        let case_number = request.case_number.trim();
        if case_number.is_empty() {
            return Err(AppError::BadRequest("Case number is required".to_string()));
        }

        let existing = claim::Entity::find()
            .filter(claim::Column::CaseNumber.eq(case_number))
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(AppError::Conflict(format!(
                "Case number {} is already in use",
                case_number
            )));
        }

        let now = now_timestamp();
        let claim = claim::ActiveModel {
            id: Set(Uuid::new_v4()),
            case_number: Set(case_number.to_string()),
            title: Set(request.title.clone()),
            court: Set(request.court.clone()),
            plaintiff_name: Set(request.plaintiff_name.clone()),
            defendant_name: Set(request.defendant_name.clone()),
            description: Set(request.description.clone()),
            status: Set(request.status.unwrap_or(ClaimStatus::Active)),
            user_id: Set(owner_id),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(claim.insert(&self.db).await?)
    }

    pub async fn get_claim(&self, claim_id: Uuid) -> Result<claim::Model> {
        claim::Entity::find_by_id(claim_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Claim {}", claim_id)))
    }

    pub async fn get_claim_by_case_number(&self, case_number: &str) -> Result<claim::Model> {
        claim::Entity::find()
            .filter(claim::Column::CaseNumber.eq(case_number))
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Claim {}", case_number)))
    }

    pub async fn get_claims_for_user(&self, user_id: Uuid) -> Result<Vec<claim::Model>> {
        Ok(claim::Entity::find()
            .filter(claim::Column::UserId.eq(user_id))
            .order_by_asc(claim::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    pub async fn get_claims_by_ids(&self, claim_ids: &[Uuid]) -> Result<Vec<claim::Model>> {
        if claim_ids.is_empty() {
            return Ok(Vec::new());
        }

        Ok(claim::Entity::find()
            .filter(claim::Column::Id.is_in(claim_ids.iter().copied()))
            .order_by_asc(claim::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Claims other people have shared with this user.
    pub async fn get_claims_shared_with(&self, user_id: Uuid) -> Result<Vec<claim::Model>> {
        let claim_ids: Vec<Uuid> = claim_share::Entity::find()
            .filter(claim_share::Column::SharedWithId.eq(user_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|share| share.claim_id)
            .collect();

        self.get_claims_by_ids(&claim_ids).await
    }

    pub async fn get_claims_shared_by(&self, owner_id: Uuid) -> Result<Vec<claim::Model>> {
        let mut claim_ids: Vec<Uuid> = claim_share::Entity::find()
            .filter(claim_share::Column::OwnerId.eq(owner_id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|share| share.claim_id)
            .collect();
        claim_ids.sort();
        claim_ids.dedup();

        self.get_claims_by_ids(&claim_ids).await
    }

    /// The oldest claim a guest owns that is still open, skipping `exclude`.
    pub async fn get_private_claim_for_guest(
        &self,
        guest_id: Uuid,
        exclude: Uuid,
    ) -> Result<Option<claim::Model>> {
        Ok(claim::Entity::find()
            .filter(claim::Column::UserId.eq(guest_id))
            .filter(claim::Column::Status.ne(ClaimStatus::Closed))
            .filter(claim::Column::Id.ne(exclude))
            .order_by_asc(claim::Column::CreatedAt)
            .one(&self.db)
            .await?)
    }

    pub async fn update_claim_status(&self, claim_id: Uuid, status: ClaimStatus) -> Result<claim::Model> {
        let claim = self.get_claim(claim_id).await?;

        let mut active: claim::ActiveModel = claim.into();
        active.status = Set(status);
        active.updated_at = Set(now_timestamp());

        Ok(active.update(&self.db).await?)
    }

    // Evidence

    pub async fn get_evidence(&self, evidence_id: Uuid) -> Result<evidence::Model> {
        evidence::Entity::find_by_id(evidence_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Evidence {}", evidence_id)))
    }

    pub async fn get_evidence_for_claim(&self, claim_id: Uuid) -> Result<Vec<evidence::Model>> {
        Ok(evidence::Entity::find()
            .inner_join(evidence_claim::Entity)
            .filter(evidence_claim::Column::ClaimId.eq(claim_id))
            .order_by_asc(evidence::Column::DisplayOrder)
            .order_by_asc(evidence::Column::ExhibitNumber)
            .all(&self.db)
            .await?)
    }

    /// Exhibit numbers currently used in a claim, coerced to integers as they leave the database.
    pub async fn get_exhibit_numbers(&self, claim_id: Uuid) -> Result<Vec<i64>> {
        let rows = evidence::Entity::find()
            .select_only()
            .column(evidence::Column::ExhibitNumber)
            .inner_join(evidence_claim::Entity)
            .filter(evidence_claim::Column::ClaimId.eq(claim_id))
            .into_json()
            .all(&self.db)
            .await?;

        Ok(rows
            .iter()
            .map(|row| coerce_exhibit_number(&row["exhibit_number"]))
            .collect())
    }

    /// Display order that puts a new item at the top of the claim's list.
    async fn next_display_order(&self, claim_id: Uuid) -> Result<i32> {
        let first = evidence::Entity::find()
            .inner_join(evidence_claim::Entity)
            .filter(evidence_claim::Column::ClaimId.eq(claim_id))
            .order_by_asc(evidence::Column::DisplayOrder)
            .one(&self.db)
            .await?;

        Ok(first.map(|e| e.display_order - 1).unwrap_or(0))
    }

    /// Inserts an evidence row and its link to `claim`, placing it first in the claim's list.
    pub async fn insert_linked_evidence(
        &self,
        claim: &claim::Model,
        mut row: evidence::ActiveModel,
    ) -> Result<evidence::Model> {
        let now = now_timestamp();
        row.display_order = Set(self.next_display_order(claim.id).await?);
        row.case_number = Set(Some(claim.case_number.clone()));
        row.created_at = Set(now);
        row.updated_at = Set(now);

        // Row and link land together or not at all
        let txn = self.db.begin().await?;
        let inserted = row.insert(&txn).await?;
        let link = evidence_claim::ActiveModel {
            evidence_id: Set(inserted.id),
            claim_id: Set(claim.id),
            created_at: Set(now),
        };
        link.insert(&txn).await?;
        txn.commit().await?;

        Ok(inserted)
    }

    pub async fn add_evidence(
        &self,
        user_id: Uuid,
        claim: &claim::Model,
        request: &AddEvidenceRequest,
        exhibit_number: i32,
    ) -> Result<evidence::Model> {
        if request.file_name.trim().is_empty() {
            return Err(AppError::BadRequest("File name is required".to_string()));
        }

        let row = evidence::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            title: Set(request.title.clone()),
            file_name: Set(request.file_name.clone()),
            file_url: Set(request.file_url.clone()),
            file_size: Set(request.file_size),
            file_type: Set(request.file_type.clone()),
            exhibit_number: Set(Some(exhibit_number)),
            number_of_pages: Set(request.number_of_pages),
            date_submitted: Set(request.date_submitted),
            method: Set(request.method.unwrap_or(EvidenceMethod::Post)),
            description: Set(request.description.clone()),
            book_of_deeds_ref: Set(request.book_of_deeds_ref.clone()),
            url_link: Set(request.url_link.clone()),
            ..Default::default()
        };

        self.insert_linked_evidence(claim, row).await
    }

    pub async fn update_evidence(
        &self,
        evidence_id: Uuid,
        request: &UpdateEvidenceRequest,
    ) -> Result<evidence::Model> {
        let existing = self.get_evidence(evidence_id).await?;
        let mut active: evidence::ActiveModel = existing.into();

        if let Some(title) = &request.title {
            active.title = Set(Some(title.clone()));
        }
        if let Some(description) = &request.description {
            active.description = Set(Some(description.clone()));
        }
        if let Some(method) = request.method {
            active.method = Set(method);
        }
        if let Some(date) = request.date_submitted {
            active.date_submitted = Set(Some(date));
        }
        if let Some(reference) = &request.book_of_deeds_ref {
            active.book_of_deeds_ref = Set(Some(reference.clone()));
        }
        if let Some(link) = &request.url_link {
            active.url_link = Set(Some(link.clone()));
        }
        active.updated_at = Set(now_timestamp());

        Ok(active.update(&self.db).await?)
    }

    /// Rewrites display order and exhibit numbers (1..N) of a claim's evidence in the given order.
    ///
    /// `ordered_ids` must name exactly the evidence linked to the claim.
    pub async fn reorder_evidence(&self, claim_id: Uuid, ordered_ids: &[Uuid]) -> Result<Vec<evidence::Model>> {
        let current = self.get_evidence_for_claim(claim_id).await?;
        let linked: HashSet<Uuid> = current.iter().map(|e| e.id).collect();
        let requested: HashSet<Uuid> = ordered_ids.iter().copied().collect();

        if requested.len() != ordered_ids.len() || linked != requested {
            return Err(AppError::BadRequest(
                "Reorder must list every evidence item of the claim exactly once".to_string(),
            ));
        }

        let txn = self.db.begin().await?;
        let now = now_timestamp();
        for (position, evidence_id) in ordered_ids.iter().enumerate() {
            let position = position as i32;
            let row = evidence::ActiveModel {
                id: Set(*evidence_id),
                display_order: Set(position),
                exhibit_number: Set(Some(position + 1)),
                updated_at: Set(now),
                ..Default::default()
            };
            row.update(&txn).await?;
        }
        txn.commit().await?;

        self.get_evidence_for_claim(claim_id).await
    }

    /// Whether `user_id` may read (and therefore copy) the given evidence row.
    pub async fn can_view_evidence(&self, user_id: Uuid, item: &evidence::Model) -> Result<bool> {
        if item.user_id == user_id {
            return Ok(true);
        }

        let claim_ids: Vec<Uuid> = evidence_claim::Entity::find()
            .filter(evidence_claim::Column::EvidenceId.eq(item.id))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|link| link.claim_id)
            .collect();
        if claim_ids.is_empty() {
            return Ok(false);
        }

        let owned = claim::Entity::find()
            .filter(claim::Column::Id.is_in(claim_ids.iter().copied()))
            .filter(claim::Column::UserId.eq(user_id))
            .count(&self.db)
            .await?;
        if owned > 0 {
            return Ok(true);
        }

        let granted = claim_share::Entity::find()
            .filter(claim_share::Column::ClaimId.is_in(claim_ids))
            .filter(claim_share::Column::SharedWithId.eq(user_id))
            .filter(claim_share::Column::CanViewEvidence.eq(true))
            .count(&self.db)
            .await?;

        Ok(granted > 0)
    }

    // Shares

    pub async fn count_collaborators(&self, claim_id: Uuid) -> Result<u64> {
        Ok(claim_share::Entity::find()
            .filter(claim_share::Column::ClaimId.eq(claim_id))
            .count(&self.db)
            .await?)
    }

    /// Creates a share grant after checking the collaborator limit.
    pub async fn create_share(
        &self,
        claim: &claim::Model,
        request: &ShareClaimRequest,
        collaborator_limit: u64,
    ) -> Result<claim_share::Model> {
        if request.shared_with_id == claim.user_id {
            return Err(AppError::BadRequest("Cannot share a claim with its owner".to_string()));
        }

        // Guest must exist
        self.get_profile(request.shared_with_id).await?;

        if self.get_share_for_guest(claim.id, request.shared_with_id).await?.is_some() {
            return Err(AppError::Conflict("Claim is already shared with this user".to_string()));
        }

        let collaborators = self.count_collaborators(claim.id).await?;
        if collaborators >= collaborator_limit {
            return Err(AppError::Conflict(format!(
                "Claim {} already has the maximum of {} collaborators",
                claim.case_number, collaborator_limit
            )));
        }

        let now = now_timestamp();
        let share = claim_share::ActiveModel {
            id: Set(Uuid::new_v4()),
            claim_id: Set(claim.id),
            owner_id: Set(claim.user_id),
            shared_with_id: Set(request.shared_with_id),
            permission: Set(request.permission.unwrap_or(SharePermission::View)),
            can_view_evidence: Set(request.can_view_evidence),
            donation_required: Set(request.donation_required),
            donation_paid: Set(false),
            donation_amount: Set(request.donation_amount),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(share.insert(&self.db).await?)
    }

    pub async fn get_share(&self, share_id: Uuid) -> Result<claim_share::Model> {
        claim_share::Entity::find_by_id(share_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Share {}", share_id)))
    }

    pub async fn get_share_for_guest(
        &self,
        claim_id: Uuid,
        guest_id: Uuid,
    ) -> Result<Option<claim_share::Model>> {
        Ok(claim_share::Entity::find()
            .filter(claim_share::Column::ClaimId.eq(claim_id))
            .filter(claim_share::Column::SharedWithId.eq(guest_id))
            .one(&self.db)
            .await?)
    }

    pub async fn get_shares_for_claim(&self, claim_id: Uuid) -> Result<Vec<claim_share::Model>> {
        Ok(claim_share::Entity::find()
            .filter(claim_share::Column::ClaimId.eq(claim_id))
            .order_by_asc(claim_share::Column::CreatedAt)
            .all(&self.db)
            .await?)
    }

    /// Claim ids the user is related to through the share table, as host or as guest.
    pub async fn get_shared_claim_ids(&self, user_id: Uuid) -> Result<Vec<Uuid>> {
        let shares = claim_share::Entity::find()
            .filter(
                Condition::any()
                    .add(claim_share::Column::OwnerId.eq(user_id))
                    .add(claim_share::Column::SharedWithId.eq(user_id)),
            )
            .all(&self.db)
            .await?;

        let mut seen = HashSet::new();
        Ok(shares
            .into_iter()
            .map(|share| share.claim_id)
            .filter(|claim_id| seen.insert(*claim_id))
            .collect())
    }

    pub async fn update_donation(
        &self,
        share_id: Uuid,
        request: &UpdateDonationRequest,
    ) -> Result<claim_share::Model> {
        let share = self.get_share(share_id).await?;

        let mut active: claim_share::ActiveModel = share.into();
        active.donation_paid = Set(request.donation_paid);
        if request.donation_amount.is_some() {
            active.donation_amount = Set(request.donation_amount);
        }
        active.updated_at = Set(now_timestamp());

        Ok(active.update(&self.db).await?)
    }

    pub async fn update_share_access(
        &self,
        share_id: Uuid,
        request: &UpdateShareAccessRequest,
    ) -> Result<claim_share::Model> {
        let share = self.get_share(share_id).await?;

        let mut active: claim_share::ActiveModel = share.into();
        if let Some(permission) = request.permission {
            active.permission = Set(permission);
        }
        if let Some(can_view) = request.can_view_evidence {
            active.can_view_evidence = Set(can_view);
        }
        active.updated_at = Set(now_timestamp());

        Ok(active.update(&self.db).await?)
    }

    pub async fn delete_share(&self, share_id: Uuid) -> Result<()> {
        let result = claim_share::Entity::delete_by_id(share_id).exec(&self.db).await?;
        if result.rows_affected == 0 {
            return Err(AppError::not_found(format!("Share {}", share_id)));
        }

        Ok(())
    }

    // Todos

    pub async fn create_todo(
        &self,
        user_id: Uuid,
        case_number: Option<&str>,
        request: &CreateTodoRequest,
    ) -> Result<todo::Model> {
        if request.title.trim().is_empty() {
            return Err(AppError::BadRequest("Todo title is required".to_string()));
        }

        let todo = todo::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            title: Set(request.title.clone()),
            due_date: Set(request.due_date),
            alarm_enabled: Set(request.alarm_enabled),
            alarm_time: Set(request.alarm_time),
            completed: Set(false),
            responsible_user_id: Set(request.responsible_user_id),
            case_number: Set(case_number.map(str::to_string)),
            evidence_id: Set(request.evidence_id),
            created_at: Set(now_timestamp()),
        };

        Ok(todo.insert(&self.db).await?)
    }

    pub async fn get_todo(&self, todo_id: Uuid) -> Result<todo::Model> {
        todo::Entity::find_by_id(todo_id)
            .one(&self.db)
            .await?
            .ok_or_else(|| AppError::not_found(format!("Todo {}", todo_id)))
    }

    pub async fn set_todo_completed(&self, todo_id: Uuid, completed: bool) -> Result<todo::Model> {
        let todo = self.get_todo(todo_id).await?;

        let mut active: todo::ActiveModel = todo.into();
        active.completed = Set(completed);

        Ok(active.update(&self.db).await?)
    }

    pub async fn get_todos_for_case(&self, case_number: &str) -> Result<Vec<todo::Model>> {
        Ok(todo::Entity::find()
            .filter(todo::Column::CaseNumber.eq(case_number))
            .order_by_asc(todo::Column::DueDate)
            .all(&self.db)
            .await?)
    }

    /// Open todos on the given cases that are due on or before `today`.
    pub async fn get_todos_due_by(&self, case_numbers: &[String], today: NaiveDate) -> Result<Vec<todo::Model>> {
        if case_numbers.is_empty() {
            return Ok(Vec::new());
        }

        Ok(todo::Entity::find()
            .filter(todo::Column::CaseNumber.is_in(case_numbers.iter().cloned()))
            .filter(todo::Column::Completed.eq(false))
            .filter(todo::Column::DueDate.lte(today))
            .all(&self.db)
            .await?)
    }

    /// Open todos on the given cases whose enabled alarm has already gone off.
    pub async fn get_todos_alarmed(&self, case_numbers: &[String], now: i64) -> Result<Vec<todo::Model>> {
        if case_numbers.is_empty() {
            return Ok(Vec::new());
        }

        Ok(todo::Entity::find()
            .filter(todo::Column::CaseNumber.is_in(case_numbers.iter().cloned()))
            .filter(todo::Column::Completed.eq(false))
            .filter(todo::Column::AlarmEnabled.eq(true))
            .filter(todo::Column::AlarmTime.lte(now))
            .all(&self.db)
            .await?)
    }

    // Calendar

    pub async fn create_event(
        &self,
        user_id: Uuid,
        claim_id: Uuid,
        request: &CreateEventRequest,
    ) -> Result<calendar_event::Model> {
        if request.title.trim().is_empty() {
            return Err(AppError::BadRequest("Event title is required".to_string()));
        }
        if let Some(end) = request.end_time {
            if end < request.start_time {
                return Err(AppError::BadRequest("Event ends before it starts".to_string()));
            }
        }

        let event = calendar_event::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            title: Set(request.title.clone()),
            description: Set(request.description.clone()),
            start_time: Set(request.start_time),
            end_time: Set(request.end_time),
            claim_id: Set(Some(claim_id)),
            responsible_user_id: Set(request.responsible_user_id),
            created_at: Set(now_timestamp()),
        };

        Ok(event.insert(&self.db).await?)
    }

    pub async fn get_events_for_claim(&self, claim_id: Uuid) -> Result<Vec<calendar_event::Model>> {
        Ok(calendar_event::Entity::find()
            .filter(calendar_event::Column::ClaimId.eq(claim_id))
            .order_by_asc(calendar_event::Column::StartTime)
            .all(&self.db)
            .await?)
    }

    /// Events on the given claims starting at or after `now` and assigned to `user_id`.
    pub async fn get_upcoming_events(
        &self,
        claim_ids: &[Uuid],
        user_id: Uuid,
        now: i64,
    ) -> Result<Vec<calendar_event::Model>> {
        if claim_ids.is_empty() {
            return Ok(Vec::new());
        }

        let assigned = Condition::any()
            .add(calendar_event::Column::ResponsibleUserId.eq(user_id))
            .add(
                Condition::all()
                    .add(calendar_event::Column::ResponsibleUserId.is_null())
                    .add(calendar_event::Column::UserId.eq(user_id)),
            );

        Ok(calendar_event::Entity::find()
            .filter(calendar_event::Column::ClaimId.is_in(claim_ids.iter().copied()))
            .filter(calendar_event::Column::StartTime.gte(now))
            .filter(assigned)
            .all(&self.db)
            .await?)
    }
}
