use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[derive(Iden)]
enum Transfers {
    Table,
    Id,
    SenderId,
    ReceiverId,
    Currency,
    GrossMinor,
    TaxMinor,
    NetMinor,
    Description,
    CreatedAt,
}

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Transfers::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Transfers::Id)
                            .string()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Transfers::SenderId).string().not_null())
                    .col(ColumnDef::new(Transfers::ReceiverId).string().not_null())
                    .col(ColumnDef::new(Transfers::Currency).string().not_null())
                    .col(
                        ColumnDef::new(Transfers::GrossMinor)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(Transfers::TaxMinor).big_integer().not_null())
                    .col(ColumnDef::new(Transfers::NetMinor).big_integer().not_null())
                    .col(ColumnDef::new(Transfers::Description).string())
                    .col(ColumnDef::new(Transfers::CreatedAt).timestamp().not_null())
                    .to_owned(),
            )
            .await?;

        // History queries read either side newest-first.
        manager
            .create_index(
                Index::create()
                    .name("idx-transfers-sender_id-created_at")
                    .table(Transfers::Table)
                    .col(Transfers::SenderId)
                    .col(Transfers::CreatedAt)
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-transfers-receiver_id-created_at")
                    .table(Transfers::Table)
                    .col(Transfers::ReceiverId)
                    .col(Transfers::CreatedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(
                Index::drop()
                    .name("idx-transfers-receiver_id-created_at")
                    .table(Transfers::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_index(
                Index::drop()
                    .name("idx-transfers-sender_id-created_at")
                    .table(Transfers::Table)
                    .to_owned(),
            )
            .await?;

        manager
            .drop_table(Table::drop().table(Transfers::Table).to_owned())
            .await?;

        Ok(())
    }
}
