//! Guestbook message entity for SeaORM.

use sea_orm::entity::prelude::*;

#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "messages")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(column_type = "Text")]
    pub content: String,
    pub nickname: String,
    pub email: String,
    pub website: String,
    pub article_id: Option<Uuid>,
    pub ip: String,
    /// 0 pending, 1 approved, 2 rejected
    pub status: i32,
    #[sea_orm(column_type = "Text", nullable)]
    pub reply_content: Option<String>,
    pub reply_time: Option<DateTimeUtc>,
    pub approved_at: Option<DateTimeUtc>,
    pub rejected_at: Option<DateTimeUtc>,
    pub created_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
