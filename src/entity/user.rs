//! User entity model.

use sea_orm::entity::prelude::*;

/// Name of the unique index over [`Column::UsernameKey`].
pub const USERNAME_KEY_INDEX: &str = "idx_users_username_key";

/// Sea-ORM entity model representing a user in the database.
///
/// | Column        | Type               | Description                              |
/// |---------------|--------------------|------------------------------------------|
/// | id            | UUID (Primary Key) | User ID                                  |
/// | username      | TEXT               | Username as registered                   |
/// | username_key  | TEXT (Unique)      | Lowercased username, the identity key    |
/// | password_hash | TEXT               | Opaque password verification material    |
/// | meta          | BYTEA              | MessagePack-encoded attribute document   |
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "users")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(column_type = "Text")]
    pub username: String,

    /// Case-insensitive uniqueness and lookups both go through this column,
    /// never through `username`.
    #[sea_orm(column_type = "Text", unique)]
    pub username_key: String,

    #[sea_orm(column_type = "Text")]
    pub password_hash: String,

    pub meta: Vec<u8>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::session::Entity")]
    Session,
}

impl Related<super::session::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Session.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
