use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
    BalanceEuro,
    BalanceGold,
    BalanceRon,
    TaxTransfer,
    TaxMarket,
    TaxWork,
    IsFrozen,
    TotalTransactions,
    TotalVolume,
    LastTransactionAt,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    // Balance and collected-tax columns stay nullable: NULL
                    // marks a field that was never initialized and is a
                    // backfill target.
                    .col(ColumnDef::new(Accounts::BalanceEuro).big_integer())
                    .col(ColumnDef::new(Accounts::BalanceGold).big_integer())
                    .col(ColumnDef::new(Accounts::BalanceRon).big_integer())
                    .col(ColumnDef::new(Accounts::TaxTransfer).big_integer())
                    .col(ColumnDef::new(Accounts::TaxMarket).big_integer())
                    .col(ColumnDef::new(Accounts::TaxWork).big_integer())
                    .col(
                        ColumnDef::new(Accounts::IsFrozen)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Accounts::TotalTransactions)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Accounts::TotalVolume)
                            .big_integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Accounts::LastTransactionAt).timestamp())
                    .col(ColumnDef::new(Accounts::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await?;

        Ok(())
    }
}
