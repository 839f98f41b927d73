use sea_orm_migration::prelude::*;

use crate::m20260805_090000_grants::Grants;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
pub enum BudgetItems {
    Table,
    Id,
    GrantId,
    Name,
    Category,
    BudgetedAmount,
    Note,
    SortOrder,
    CreatedAt,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(BudgetItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BudgetItems::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BudgetItems::GrantId).string().not_null())
                    .col(ColumnDef::new(BudgetItems::Name).string().not_null())
                    .col(ColumnDef::new(BudgetItems::Category).string())
                    .col(ColumnDef::new(BudgetItems::BudgetedAmount).big_integer())
                    .col(ColumnDef::new(BudgetItems::Note).string())
                    .col(ColumnDef::new(BudgetItems::SortOrder).integer().not_null())
                    .col(
                        ColumnDef::new(BudgetItems::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BudgetItems::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-budget_items-grant_id")
                            .from(BudgetItems::Table, BudgetItems::GrantId)
                            .to(Grants::Table, Grants::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-budget_items-grant_id-sort_order")
                    .table(BudgetItems::Table)
                    .col(BudgetItems::GrantId)
                    .col(BudgetItems::SortOrder)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(BudgetItems::Table).to_owned())
            .await
    }
}
