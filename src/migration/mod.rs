//! SeaORM database migrations.

pub use sea_orm_migration::prelude::*;

mod m20250301_000001_create_articles;
mod m20250301_000002_create_article_tags;
mod m20250301_000003_create_messages;
mod m20250301_000004_create_uploads;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20250301_000001_create_articles::Migration),
            Box::new(m20250301_000002_create_article_tags::Migration),
            Box::new(m20250301_000003_create_messages::Migration),
            Box::new(m20250301_000004_create_uploads::Migration),
        ]
    }
}
