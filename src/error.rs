//! Error types shared by every store operation.

use crate::id::UserId;
use crate::username::UsernameError;

/// Result alias used throughout the crate.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Failures surfaced by the user directory, session ledger and token registry.
///
/// Uniqueness and referential failures are never transient; retrying the same
/// write will fail the same way. `NotFound`, `Expired` and `InvalidToken` all
/// mean "access denied" to a caller but stay distinct so they can be logged
/// and counted separately (see [`Error::is_access_denied`]).
///
/// Errors from the underlying SeaORM connection map to [`Error::Backend`],
/// document serialization errors to [`Error::Encode`] and deserialization
/// errors to [`Error::Decode`].
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A user whose username matches case-insensitively already exists.
    #[error("a user named {0:?} already exists")]
    DuplicateIdentity(String),

    /// A service token is already registered under this name.
    #[error("an application named {0:?} is already registered")]
    DuplicateName(String),

    /// The bearer token is already issued to another application.
    #[error("the token is already issued to another application")]
    DuplicateToken,

    /// A session was requested for a user that does not exist.
    #[error("user {0} does not exist")]
    UnknownUser(UserId),

    #[error("record not found")]
    NotFound,

    /// The record exists but its validity window has passed.
    #[error("credential has expired")]
    Expired,

    /// The user is still referenced by at least one session.
    #[error("user {0} still has sessions")]
    HasDependentSessions(UserId),

    #[error("invalid username: {0}")]
    InvalidUsername(#[from] UsernameError),

    /// The presented token does not match the one on record.
    #[error("the provided token was invalid")]
    InvalidToken,

    #[error("backend error: {0}")]
    Backend(String),

    #[error("encode error: {0}")]
    Encode(String),

    #[error("decode error: {0}")]
    Decode(String),
}

impl Error {
    /// Whether this failure denies access to a caller presenting a credential.
    pub fn is_access_denied(&self) -> bool {
        matches!(self, Self::NotFound | Self::Expired | Self::InvalidToken)
    }
}
