pub use sea_orm_migration::prelude::*;

mod m20260805_090000_grants;
mod m20260805_091500_budget_items;
mod m20260805_093000_transactions;
mod m20260805_094500_allocation_splits;
mod m20260806_120000_sync_runs;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260805_090000_grants::Migration),
            Box::new(m20260805_091500_budget_items::Migration),
            Box::new(m20260805_093000_transactions::Migration),
            Box::new(m20260805_094500_allocation_splits::Migration),
            Box::new(m20260806_120000_sync_runs::Migration),
        ]
    }
}
