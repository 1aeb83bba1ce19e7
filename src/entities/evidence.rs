// ABOUTME: Evidence entity for one exhibit: file identity plus per-claim annotations
// ABOUTME: Exhibit numbers are unique within a claim only and are recomputed on reorder and clone

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "evidence")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub case_number: Option<String>, // Legacy direct reference, links live in evidence_claims
    pub user_id: Uuid,
    pub title: Option<String>,
    pub file_name: String,
    pub file_url: Option<String>,
    pub file_size: Option<i64>,
    pub file_type: Option<String>,
    pub exhibit_number: Option<i32>,
    pub number_of_pages: Option<i32>,
    pub date_submitted: Option<Date>,
    pub method: EvidenceMethod,
    pub description: Option<String>,
    pub display_order: i32,
    pub book_of_deeds_ref: Option<String>,
    pub url_link: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::None)")]
pub enum EvidenceMethod {
    #[sea_orm(string_value = "Post")]
    Post,
    #[sea_orm(string_value = "Email")]
    Email,
    #[sea_orm(string_value = "Hand")]
    Hand,
    #[sea_orm(string_value = "Call")]
    Call,
    #[sea_orm(string_value = "Online")]
    Online,
    #[sea_orm(string_value = "To-Do")]
    #[serde(rename = "To-Do")]
    ToDo,
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
    ClaimLinks,
}

impl Related<super::profile::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Owner.def()
    }
}

impl Related<super::evidence_claim::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ClaimLinks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
