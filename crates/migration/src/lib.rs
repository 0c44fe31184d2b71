pub use sea_orm_migration::prelude::*;

mod m20260410_101500_accounts;
mod m20260410_102000_treasury;
mod m20260411_090000_transfers;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20260410_101500_accounts::Migration),
            Box::new(m20260410_102000_treasury::Migration),
            Box::new(m20260411_090000_transfers::Migration),
        ]
    }
}
