// ABOUTME: Claim entity for a legal case owned by one profile
// ABOUTME: Carries both the internal claim id and the human-facing unique case number

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "claims")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub case_number: String,
    pub title: String,
    pub court: Option<String>,
    pub plaintiff_name: Option<String>,
    pub defendant_name: Option<String>,
    pub description: Option<String>,
    pub status: ClaimStatus,
    pub user_id: Uuid,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum ClaimStatus {
    #[sea_orm(string_value = "Active")]
    Active,
    #[sea_orm(string_value = "Pending")]
    Pending,
    #[sea_orm(string_value = "Closed")]
    Closed,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::profile::Entity",
        from = "Column::UserId",
        to = "super::profile::Column::Id"
    )]
    Owner,
    #[sea_orm(has_many = "super::evidence_claim::Entity")]
    EvidenceLinks,
    #[sea_orm(has_many = "super::claim_share::Entity")]
    Shares,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::evidence_claim::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::EvidenceLinks.def()
    }
}

impl Related<super::claim_share::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Shares.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
