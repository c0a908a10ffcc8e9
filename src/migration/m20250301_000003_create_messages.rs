//! Create messages table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Message::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Message::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Message::Content).text().not_null())
                    .col(ColumnDef::new(Message::Nickname).string().not_null())
                    .col(
                        ColumnDef::new(Message::Email)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Message::Website)
                            .string()
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(Message::ArticleId).uuid())
                    .col(ColumnDef::new(Message::Ip).string().not_null())
                    .col(
                        ColumnDef::new(Message::Status)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Message::ReplyContent).text())
                    .col(ColumnDef::new(Message::ReplyTime).timestamp_with_time_zone())
                    .col(ColumnDef::new(Message::ApprovedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Message::RejectedAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Message::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_messages_status_created")
                    .table(Message::Table)
                    .col(Message::Status)
                    .col(Message::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_messages_article")
                    .table(Message::Table)
                    .col(Message::ArticleId)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Message::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Message {
    #[sea_orm(iden = "messages")]
    Table,
    Id,
    Content,
    Nickname,
    Email,
    Website,
    ArticleId,
    Ip,
    Status,
    ReplyContent,
    ReplyTime,
    ApprovedAt,
    RejectedAt,
    CreatedAt,
}
