//! Uploaded image record.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "uploads")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub original_name: String,
    #[sea_orm(unique)]
    pub filename: String,
    pub path: String,
    #[sea_orm(column_type = "Text")]
    pub url: String,
    pub mime: String,
    pub size: i64,
    pub upload_time: DateTimeUtc,
    pub last_accessed: DateTimeUtc,
    /// "cloud" or "memory"
    pub storage_type: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
