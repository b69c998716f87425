use sea_orm_migration::prelude::*;

use crate::entity::appauth::{NAME_INDEX, TOKEN_INDEX};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Appauth::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Appauth::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Appauth::Name).text().not_null())
                    .col(ColumnDef::new(Appauth::Description).text().null())
                    .col(ColumnDef::new(Appauth::Token).text().not_null())
                    .col(ColumnDef::new(Appauth::Meta).blob().not_null())
                    .col(
                        ColumnDef::new(Appauth::ExpiresAt)
                            .timestamp_with_time_zone()
                            .null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(NAME_INDEX)
                    .table(Appauth::Table)
                    .col(Appauth::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name(TOKEN_INDEX)
                    .table(Appauth::Table)
                    .col(Appauth::Token)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_appauth_expires_at")
                    .table(Appauth::Table)
                    .col(Appauth::ExpiresAt)
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Appauth::Table).to_owned())
            .await
    }
}

#[derive(DeriveIden)]
enum Appauth {
    Table,
    Id,
    Name,
    Description,
    Token,
    Meta,
    ExpiresAt,
}
