//! Session entity model for Sea-ORM database interaction.
//!
//! This module defines the database schema representation for session storage.
//! Each row belongs to exactly one user through `user_id`.

use sea_orm::entity::prelude::*;

/// Sea-ORM entity model representing a session in the database.
///
/// # Database Schema
///
/// | Column     | Type                     | Description                          |
/// |------------|--------------------------|--------------------------------------|
/// | id         | UUID (Primary Key)       | Session ID                           |
/// | user_id    | UUID (FK → users.id)     | Owning user, `ON DELETE RESTRICT`    |
/// | data       | BYTEA                    | MessagePack-encoded session payload  |
/// | expires_at | TIMESTAMPTZ              | Instant the session stops being live |
///
/// Expired rows stay in the table until something reaps them; `expires_at`
/// is indexed so that reaping is a range delete.
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
#[sea_orm(table_name = "sessions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,

    #[sea_orm(indexed)]
    pub user_id: Uuid,

    pub data: Vec<u8>,

    /// Stored in UTC with microsecond precision.
    #[sea_orm(indexed)]
    pub expires_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::UserId",
        to = "super::user::Column::Id",
        on_update = "Cascade",
        on_delete = "Restrict"
    )]
    User,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
