use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub enum Grants {
    Table,
    Id,
    Name,
    GrantCode,
    TotalAmount,
    StartDate,
    EndDate,
    Status,
    CreatedAt,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Grants::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Grants::Id).string().not_null().primary_key())
                    .col(ColumnDef::new(Grants::Name).string().not_null())
                    .col(ColumnDef::new(Grants::GrantCode).string())
                    .col(ColumnDef::new(Grants::TotalAmount).big_integer())
                    .col(ColumnDef::new(Grants::StartDate).date())
                    .col(ColumnDef::new(Grants::EndDate).date())
                    .col(ColumnDef::new(Grants::Status).string().not_null())
                    .col(ColumnDef::new(Grants::CreatedAt).timestamp().not_null())
                    .col(ColumnDef::new(Grants::UpdatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Grants::Table).to_owned())
            .await
    }
}
