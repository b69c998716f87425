//! Session lifetime policy on top of a [`SessionLedger`].

use serde_json::Value;
use time::{Duration, OffsetDateTime};
use tracing::debug;

use crate::{
    error::{Error, Result},
    id::{SessionId, UserId},
    session::{expires_after, Session, SessionLedger},
};

/// How long a session lives unless configured otherwise.
pub const DEFAULT_ALIVE_DURATION: Duration = Duration::hours(24);

/// Applies a lifetime policy to sessions stored in a [`SessionLedger`].
///
/// The ledger itself hands back sessions whether or not they have expired.
/// `SessionManager` is the layer that says no: [`SessionManager::session`]
/// fails with [`Error::Expired`] for a dead session and, with auto-refresh
/// enabled, slides a live session's expiry forward on every access.
///
/// ```no_run
/// use identity_seaorm_store::{SeaOrmStore, SessionManager};
/// use time::Duration;
///
/// # async fn example(store: SeaOrmStore, user_id: identity_seaorm_store::UserId)
/// # -> identity_seaorm_store::Result<()> {
/// let sessions = SessionManager::new(store)
///     .with_alive_duration(Duration::hours(8))
///     .with_auto_refresh(true);
///
/// let session = sessions.new_session(user_id, None).await?;
/// let again = sessions.session(session.id).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct SessionManager<L> {
    ledger: L,
    /// Lifetime given to new and refreshed sessions.
    alive_duration: Duration,
    /// Whether reading a live session extends it.
    auto_refresh: bool,
}

impl<L: SessionLedger> SessionManager<L> {
    pub fn new(ledger: L) -> Self {
        Self {
            ledger,
            alive_duration: DEFAULT_ALIVE_DURATION,
            auto_refresh: false,
        }
    }

    pub fn with_alive_duration(mut self, alive_duration: Duration) -> Self {
        self.alive_duration = alive_duration;
        self
    }

    pub fn with_auto_refresh(mut self, auto_refresh: bool) -> Self {
        self.auto_refresh = auto_refresh;
        self
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    /// Opens a session lasting the configured alive duration.
    pub async fn new_session(&self, user_id: UserId, data: Option<Value>) -> Result<Session> {
        self.ledger
            .create_session(user_id, data, self.alive_duration)
            .await
    }

    /// Returns a live session, refreshing it if auto-refresh is on.
    ///
    /// An expired session fails with [`Error::Expired`] and is left in place
    /// for the reaper.
    pub async fn session(&self, id: SessionId) -> Result<Session> {
        let session = self.ledger.get_session(id).await?;
        let now = OffsetDateTime::now_utc();

        if !session.is_live(now) {
            debug!(session_id = %id, "session has expired");
            return Err(Error::Expired);
        }
        if self.auto_refresh {
            return self.refresh(id, now).await;
        }
        Ok(session)
    }

    /// Pushes the session's expiry to now plus the alive duration.
    pub async fn extend(&self, id: SessionId) -> Result<Session> {
        self.refresh(id, OffsetDateTime::now_utc()).await
    }

    /// Ends the session (logout).
    pub async fn expire(&self, id: SessionId) -> Result<()> {
        self.ledger.delete_session(id).await
    }

    /// Reaps every session that has expired by now.
    pub async fn clear_stale_sessions(&self) -> Result<u64> {
        self.ledger.delete_expired(OffsetDateTime::now_utc()).await
    }

    // Re-read after the write so the caller sees the stored expiry.
    async fn refresh(&self, id: SessionId, now: OffsetDateTime) -> Result<Session> {
        self.ledger
            .touch(id, expires_after(now, self.alive_duration)?)
            .await?;
        self.ledger.get_session(id).await
    }
}
