//! Migration to create the addresses table.
//!
//! Addresses are owned rows: each company and each event points at its own
//! address record.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Addresses::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Addresses::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Addresses::Street).text().not_null())
                    .col(ColumnDef::new(Addresses::Number).text().null())
                    .col(ColumnDef::new(Addresses::Complement).text().null())
                    .col(ColumnDef::new(Addresses::Neighborhood).text().not_null())
                    .col(ColumnDef::new(Addresses::City).text().not_null())
                    .col(ColumnDef::new(Addresses::State).text().not_null())
                    .col(ColumnDef::new(Addresses::Country).text().not_null())
                    .col(ColumnDef::new(Addresses::ZipCode).text().not_null())
                    .col(
                        ColumnDef::new(Addresses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Addresses::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Addresses::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Addresses {
    Table,
    Id,
    Street,
    Number,
    Complement,
    Neighborhood,
    City,
    State,
    Country,
    ZipCode,
    CreatedAt,
    UpdatedAt,
}
