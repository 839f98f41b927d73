use sea_orm_migration::prelude::*;

use crate::m20260805_091500_budget_items::BudgetItems;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum AllocationSplits {
    Table,
    Id,
    DetailId,
    BudgetItemId,
    Amount,
    Note,
    CreatedAt,
    UpdatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // detail_id carries no foreign key on purpose: splits must survive
        // deletion of the transaction row they point at.
        manager
            .create_table(
                Table::create()
                    .table(AllocationSplits::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AllocationSplits::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AllocationSplits::DetailId).big_integer())
                    .col(
                        ColumnDef::new(AllocationSplits::BudgetItemId)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AllocationSplits::Amount)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AllocationSplits::Note).string())
                    .col(
                        ColumnDef::new(AllocationSplits::CreatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AllocationSplits::UpdatedAt)
                            .timestamp()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-allocation_splits-budget_item_id")
                            .from(AllocationSplits::Table, AllocationSplits::BudgetItemId)
                            .to(BudgetItems::Table, BudgetItems::Id),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-allocation_splits-detail_id")
                    .table(AllocationSplits::Table)
                    .col(AllocationSplits::DetailId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AllocationSplits::Table).to_owned())
            .await
    }
}
