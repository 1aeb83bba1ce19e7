// ABOUTME: Initial migration creating profiles, claims, evidence, links, shares, todos and events
// ABOUTME: Sets up foreign keys and the uniqueness rules the claim workflows rely on

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Profiles::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Profiles::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Profiles::Email).string().not_null().unique_key())
                    .col(ColumnDef::new(Profiles::DisplayName).string().not_null())
                    .col(ColumnDef::new(Profiles::CreatedAt).big_integer().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Claims::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Claims::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Claims::CaseNumber).string().not_null().unique_key())
                    .col(ColumnDef::new(Claims::Title).string().not_null())
                    .col(ColumnDef::new(Claims::Court).string())
                    .col(ColumnDef::new(Claims::PlaintiffName).string())
                    .col(ColumnDef::new(Claims::DefendantName).string())
                    .col(ColumnDef::new(Claims::Description).text())
                    .col(ColumnDef::new(Claims::Status).string().not_null().default("Active"))
                    .col(ColumnDef::new(Claims::UserId).uuid().not_null())
                    .col(ColumnDef::new(Claims::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Claims::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_claims_user_id")
                            .from(Claims::Table, Claims::UserId)
                            .to(Profiles::Table, Profiles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Evidence::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Evidence::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Evidence::CaseNumber).string())
                    .col(ColumnDef::new(Evidence::UserId).uuid().not_null())
                    .col(ColumnDef::new(Evidence::Title).string())
                    .col(ColumnDef::new(Evidence::FileName).string().not_null())
                    .col(ColumnDef::new(Evidence::FileUrl).string())
                    .col(ColumnDef::new(Evidence::FileSize).big_integer())
                    .col(ColumnDef::new(Evidence::FileType).string())
                    .col(ColumnDef::new(Evidence::ExhibitNumber).integer())
                    .col(ColumnDef::new(Evidence::NumberOfPages).integer())
                    .col(ColumnDef::new(Evidence::DateSubmitted).date())
                    .col(ColumnDef::new(Evidence::Method).string().not_null().default("Post"))
                    .col(ColumnDef::new(Evidence::Description).text())
                    .col(ColumnDef::new(Evidence::DisplayOrder).integer().not_null().default(0))
                    .col(ColumnDef::new(Evidence::BookOfDeedsRef).string())
                    .col(ColumnDef::new(Evidence::UrlLink).string())
                    .col(ColumnDef::new(Evidence::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(Evidence::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_evidence_user_id")
                            .from(Evidence::Table, Evidence::UserId)
                            .to(Profiles::Table, Profiles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EvidenceClaims::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(EvidenceClaims::EvidenceId).uuid().not_null())
                    .col(ColumnDef::new(EvidenceClaims::ClaimId).uuid().not_null())
                    .col(ColumnDef::new(EvidenceClaims::CreatedAt).big_integer().not_null())
                    .primary_key(
                        Index::create()
                            .name("pk_evidence_claims")
                            .col(EvidenceClaims::EvidenceId)
                            .col(EvidenceClaims::ClaimId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_evidence_claims_evidence_id")
                            .from(EvidenceClaims::Table, EvidenceClaims::EvidenceId)
                            .to(Evidence::Table, Evidence::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_evidence_claims_claim_id")
                            .from(EvidenceClaims::Table, EvidenceClaims::ClaimId)
                            .to(Claims::Table, Claims::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(ClaimShares::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(ClaimShares::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(ClaimShares::ClaimId).uuid().not_null())
                    .col(ColumnDef::new(ClaimShares::OwnerId).uuid().not_null())
                    .col(ColumnDef::new(ClaimShares::SharedWithId).uuid().not_null())
                    .col(ColumnDef::new(ClaimShares::Permission).string().not_null().default("view"))
                    .col(ColumnDef::new(ClaimShares::CanViewEvidence).boolean().not_null().default(false))
                    .col(ColumnDef::new(ClaimShares::DonationRequired).boolean().not_null().default(false))
                    .col(ColumnDef::new(ClaimShares::DonationPaid).boolean().not_null().default(false))
                    .col(ColumnDef::new(ClaimShares::DonationAmount).big_integer())
                    .col(ColumnDef::new(ClaimShares::CreatedAt).big_integer().not_null())
                    .col(ColumnDef::new(ClaimShares::UpdatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_claim_shares_claim_id")
                            .from(ClaimShares::Table, ClaimShares::ClaimId)
                            .to(Claims::Table, Claims::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_claim_shares_shared_with_id")
                            .from(ClaimShares::Table, ClaimShares::SharedWithId)
                            .to(Profiles::Table, Profiles::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .index(
                        Index::create()
                            .name("idx_claim_shares_unique_guest")
                            .table(ClaimShares::Table)
                            .col(ClaimShares::ClaimId)
                            .col(ClaimShares::SharedWithId)
                            .unique(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Todos::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Todos::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Todos::UserId).uuid().not_null())
                    .col(ColumnDef::new(Todos::Title).string().not_null())
                    .col(ColumnDef::new(Todos::DueDate).date())
                    .col(ColumnDef::new(Todos::AlarmEnabled).boolean().not_null().default(false))
                    .col(ColumnDef::new(Todos::AlarmTime).big_integer())
                    .col(ColumnDef::new(Todos::Completed).boolean().not_null().default(false))
                    .col(ColumnDef::new(Todos::ResponsibleUserId).uuid())
                    .col(ColumnDef::new(Todos::CaseNumber).string())
                    .col(ColumnDef::new(Todos::EvidenceId).uuid())
                    .col(ColumnDef::new(Todos::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_todos_evidence_id")
                            .from(Todos::Table, Todos::EvidenceId)
                            .to(Evidence::Table, Evidence::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CalendarEvents::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(CalendarEvents::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(CalendarEvents::UserId).uuid().not_null())
                    .col(ColumnDef::new(CalendarEvents::Title).string().not_null())
                    .col(ColumnDef::new(CalendarEvents::Description).text())
                    .col(ColumnDef::new(CalendarEvents::StartTime).big_integer().not_null())
                    .col(ColumnDef::new(CalendarEvents::EndTime).big_integer())
                    .col(ColumnDef::new(CalendarEvents::ClaimId).uuid())
                    .col(ColumnDef::new(CalendarEvents::ResponsibleUserId).uuid())
                    .col(ColumnDef::new(CalendarEvents::CreatedAt).big_integer().not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_calendar_events_claim_id")
                            .from(CalendarEvents::Table, CalendarEvents::ClaimId)
                            .to(Claims::Table, Claims::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_todos_case_number")
                    .table(Todos::Table)
                    .col(Todos::CaseNumber)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_calendar_events_claim_id")
                    .table(CalendarEvents::Table)
                    .col(CalendarEvents::ClaimId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CalendarEvents::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Todos::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(ClaimShares::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(EvidenceClaims::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Evidence::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Claims::Table).to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(Profiles::Table).to_owned())
            .await?;

        Ok(())
    }
}

#[derive(DeriveIden)]
enum Profiles {
    Table,
    Id,
    Email,
    DisplayName,
    CreatedAt,
}

#[derive(DeriveIden)]
enum Claims {
    Table,
    Id,
    CaseNumber,
    Title,
    Court,
    PlaintiffName,
    DefendantName,
    Description,
    Status,
    UserId,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Evidence {
    Table,
    Id,
    CaseNumber,
    UserId,
    Title,
    FileName,
    FileUrl,
    FileSize,
    FileType,
    ExhibitNumber,
    NumberOfPages,
    DateSubmitted,
    Method,
    Description,
    DisplayOrder,
    BookOfDeedsRef,
    UrlLink,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum EvidenceClaims {
    Table,
    EvidenceId,
    ClaimId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum ClaimShares {
    Table,
    Id,
    ClaimId,
    OwnerId,
    SharedWithId,
    Permission,
    CanViewEvidence,
    DonationRequired,
    DonationPaid,
    DonationAmount,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Todos {
    Table,
    Id,
    UserId,
    Title,
    DueDate,
    AlarmEnabled,
    AlarmTime,
    Completed,
    ResponsibleUserId,
    CaseNumber,
    EvidenceId,
    CreatedAt,
}

#[derive(DeriveIden)]
enum CalendarEvents {
    Table,
    Id,
    UserId,
    Title,
    Description,
    StartTime,
    EndTime,
    ClaimId,
    ResponsibleUserId,
    CreatedAt,
}
