//! Session ledger: time-bounded login sessions owned by a user.

use async_trait::async_trait;
use serde_json::Value;
use time::{Duration, OffsetDateTime};

use crate::{
    error::{Error, Result},
    id::{SessionId, UserId},
};

#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    pub id: SessionId,
    pub user_id: UserId,
    pub data: Value,
    pub expires_at: OffsetDateTime,
}

impl Session {
    /// Whether the session is still valid at `now`.
    ///
    /// A dead session is not removed from storage; reaping is
    /// [`SessionLedger::delete_expired`]'s job.
    pub fn is_live(&self, now: OffsetDateTime) -> bool {
        now < self.expires_at
    }
}

/// The instant `ttl` after `now`, or [`Error::Encode`] if that is not
/// representable.
pub(crate) fn expires_after(now: OffsetDateTime, ttl: Duration) -> Result<OffsetDateTime> {
    now.checked_add(ttl)
        .ok_or_else(|| Error::Encode(format!("session lifetime {ttl} is out of range")))
}

/// Storage contract for sessions.
///
/// Reads never filter on expiry. Callers decide what a stale session means,
/// either with [`Session::is_live`] or through
/// [`SessionManager`](crate::SessionManager).
#[async_trait]
pub trait SessionLedger: Send + Sync {
    /// Opens a session for `user_id` expiring `ttl` from now.
    ///
    /// The existence check on the user and the insert are one atomic unit, so
    /// no session is ever persisted for a missing user.
    ///
    /// # Parameters
    ///
    /// * `user_id` - The owning user.
    /// * `data` - Initial session document; `None` stores `{}`.
    /// * `ttl` - Lifetime from now. Zero or negative gives a session that is
    ///   already dead.
    ///
    /// # Returns
    ///
    /// The stored [`Session`], with `expires_at` as the database holds it.
    ///
    /// # Errors
    ///
    /// * [`Error::UnknownUser`](crate::Error::UnknownUser) - No user has
    ///   `user_id`.
    /// * [`Error::Encode`](crate::Error::Encode) - `now + ttl` is not a
    ///   representable timestamp.
    async fn create_session(
        &self,
        user_id: UserId,
        data: Option<Value>,
        ttl: Duration,
    ) -> Result<Session>;

    /// Returns the session whether or not it has expired.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`](crate::Error::NotFound) if no session has `id`.
    async fn get_session(&self, id: SessionId) -> Result<Session>;

    /// Moves the session's expiry to `expires_at`.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`](crate::Error::NotFound) if no session has `id`.
    async fn touch(&self, id: SessionId, expires_at: OffsetDateTime) -> Result<()>;

    /// Replaces the session's `data` document.
    async fn update_data(&self, id: SessionId, data: Value) -> Result<()>;

    /// Ends a single session (logout).
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`](crate::Error::NotFound) if no session has `id`,
    /// including one already deleted.
    async fn delete_session(&self, id: SessionId) -> Result<()>;

    /// Deletes every session of `user_id`, returning how many were removed.
    async fn delete_user_sessions(&self, user_id: UserId) -> Result<u64>;

    /// Deletes every session with `expires_at <= now`, returning the count.
    ///
    /// Nothing calls this automatically; run it from a scheduler.
    async fn delete_expired(&self, now: OffsetDateTime) -> Result<u64>;
}
