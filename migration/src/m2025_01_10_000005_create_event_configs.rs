//! Migration to create the event_configs table.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(EventConfigs::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EventConfigs::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(EventConfigs::EventId).uuid().not_null())
                    .col(
                        ColumnDef::new(EventConfigs::ConfirmationType)
                            .text()
                            .not_null()
                            .default("email"),
                    )
                    .col(
                        ColumnDef::new(EventConfigs::HasGift)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(EventConfigs::GiftDescription)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(EventConfigs::HasPrize)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(EventConfigs::PrizeDescription)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(EventConfigs::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(EventConfigs::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_event_configs_event_id")
                            .from(EventConfigs::Table, EventConfigs::EventId)
                            .to(Events::Table, Events::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_event_configs_event_id")
                    .table(EventConfigs::Table)
                    .col(EventConfigs::EventId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_index(Index::drop().name("idx_event_configs_event_id").to_owned())
            .await?;

        manager
            .drop_table(Table::drop().table(EventConfigs::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum EventConfigs {
    Table,
    Id,
    EventId,
    ConfirmationType,
    HasGift,
    GiftDescription,
    HasPrize,
    PrizeDescription,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum Events {
    Table,
    Id,
}
