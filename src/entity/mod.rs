//! Database entity models for identity-seaorm-store.
//!
//! These SeaORM entities map the three tables the store owns. They are public
//! so applications can run their own read queries (reporting, admin views)
//! against the same schema, but every write should go through
//! [`SeaOrmStore`](crate::SeaOrmStore), which is where uniqueness and
//! referential failures are turned into typed errors.
//!
//! `meta` and `data` columns hold MessagePack-encoded documents; decode them
//! with `rmp_serde` into a `serde_json::Value`.

/// Service token registrations (`appauth` table).
pub mod appauth;

/// Login sessions (`sessions` table), each owned by one user.
pub mod session;

/// User identities (`users` table).
pub mod user;
