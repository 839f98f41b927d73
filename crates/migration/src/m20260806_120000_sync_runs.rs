use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum SyncRuns {
    Table,
    Id,
    StartedAt,
    FinishedAt,
    Status,
    Message,
    RecordCount,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(SyncRuns::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(SyncRuns::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(SyncRuns::StartedAt).timestamp().not_null())
                    .col(ColumnDef::new(SyncRuns::FinishedAt).timestamp())
                    .col(ColumnDef::new(SyncRuns::Status).string().not_null())
                    .col(ColumnDef::new(SyncRuns::Message).string())
                    .col(
                        ColumnDef::new(SyncRuns::RecordCount)
                            .big_integer()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(SyncRuns::Table).to_owned())
            .await
    }
}
