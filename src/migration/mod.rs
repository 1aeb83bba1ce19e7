// ABOUTME: SeaORM migration module for database schema management
// ABOUTME: Handles initial claim schema creation and future migrations

use sea_orm_migration::prelude::*;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(m20261016_000001_create_claim_tables::Migration)]
    }
}

pub mod m20261016_000001_create_claim_tables;
