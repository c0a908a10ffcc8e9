//! Create uploads table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Upload::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Upload::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Upload::OriginalName).string().not_null())
                    .col(
                        ColumnDef::new(Upload::Filename)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Upload::Path).string().not_null())
                    .col(ColumnDef::new(Upload::Url).text().not_null())
                    .col(ColumnDef::new(Upload::Mime).string().not_null())
                    .col(ColumnDef::new(Upload::Size).big_integer().not_null())
                    .col(
                        ColumnDef::new(Upload::UploadTime)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Upload::LastAccessed)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Upload::StorageType).string().not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_uploads_upload_time")
                    .table(Upload::Table)
                    .col(Upload::UploadTime)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Upload::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Upload {
    #[sea_orm(iden = "uploads")]
    Table,
    Id,
    OriginalName,
    Filename,
    Path,
    Url,
    Mime,
    Size,
    UploadTime,
    LastAccessed,
    StorageType,
}
