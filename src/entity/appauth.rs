//! Service token entity model.

use sea_orm::entity::prelude::*;

/// Name of the unique index over [`Column::Name`].
pub const NAME_INDEX: &str = "idx_appauth_name";

/// Name of the unique index over [`Column::Token`]. Token resolution is the
/// hot path, so this index also serves every `resolve_by_token` lookup.
pub const TOKEN_INDEX: &str = "idx_appauth_token";

/// Sea-ORM entity model representing a registered service.
///
/// | Column      | Type                   | Description                            |
/// |-------------|------------------------|----------------------------------------|
/// | id          | UUID (Primary Key)     | Registration ID                        |
/// | name        | TEXT (Unique)          | Service name                           |
/// | description | TEXT NULL              | Free text                              |
/// | token       | TEXT (Unique, indexed) | Bearer credential                      |
/// | meta        | BYTEA                  | MessagePack-encoded attribute document |
/// | expires_at  | TIMESTAMPTZ NULL       | `NULL` means the token never expires   |
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "appauth")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(column_type = "Text", unique)]
    pub name: String,

    #[sea_orm(column_type = "Text", nullable)]
    pub description: Option<String>,

    #[sea_orm(column_type = "Text", unique)]
    pub token: String,

    pub meta: Vec<u8>,

    #[sea_orm(nullable)]
    pub expires_at: Option<DateTimeWithTimeZone>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
