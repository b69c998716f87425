//! User directory: identity records addressed by case-insensitive username.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;

use crate::{document, error::Result, id::UserId, username::Username, UsernameError};

/// Payload for [`UserDirectory::create_user`].
#[derive(Clone)]
pub struct NewUser {
    pub username: Username,
    /// Verification material produced by the caller's hashing strategy. The
    /// store only keeps it.
    pub password_hash: String,
    pub meta: Value,
}

impl NewUser {
    /// Validates `username` and pairs it with an empty `meta` document.
    pub fn new(username: &str, password_hash: impl Into<String>) -> Result<Self, UsernameError> {
        Ok(Self {
            username: username.parse()?,
            password_hash: password_hash.into(),
            meta: document::empty(),
        })
    }

    /// Like [`NewUser::new`], but the username must be an email address.
    ///
    /// See [`Username::email`] for the rules.
    pub fn email(address: &str, password_hash: impl Into<String>) -> Result<Self, UsernameError> {
        Ok(Self {
            username: Username::email(address)?,
            password_hash: password_hash.into(),
            meta: document::empty(),
        })
    }

    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = meta;
        self
    }
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("password_hash", &"[redacted]")
            .field("meta", &self.meta)
            .finish()
    }
}

#[derive(Clone, PartialEq)]
pub struct User {
    pub id: UserId,
    /// The spelling the user registered with.
    pub username: String,
    pub password_hash: String,
    pub meta: Value,
}

impl fmt::Debug for User {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("User")
            .field("id", &self.id)
            .field("username", &self.username)
            .field("password_hash", &"[redacted]")
            .field("meta", &self.meta)
            .finish()
    }
}

/// Storage contract for user identities.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Registers a user.
    ///
    /// # Parameters
    ///
    /// * `user` - The validated username, the password hash and the `meta`
    ///   document to store.
    ///
    /// # Returns
    ///
    /// The stored [`User`] with a freshly generated id.
    ///
    /// # Errors
    ///
    /// * [`Error::DuplicateIdentity`](crate::Error::DuplicateIdentity) - An
    ///   existing username matches case-insensitively.
    /// * [`Error::Backend`](crate::Error::Backend) - The database failed.
    async fn create_user(&self, user: NewUser) -> Result<User>;

    /// Fetches a user by id.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`](crate::Error::NotFound) if no user has `id`.
    async fn get_user_by_id(&self, id: UserId) -> Result<User>;

    /// Case-insensitive lookup. At most one user can match.
    ///
    /// # Parameters
    ///
    /// * `username` - Raw input. It is trimmed and lowercased but not
    ///   validated, so a malformed name simply matches nothing.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`](crate::Error::NotFound) if nothing matches.
    async fn get_user_by_username(&self, username: &str) -> Result<User>;

    /// Replaces the user's `meta` document.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`](crate::Error::NotFound) if no user has `id`.
    async fn update_meta(&self, id: UserId, meta: Value) -> Result<()>;

    /// Replaces the stored password hash, for rehashing or a password change.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`](crate::Error::NotFound) if no user has `id`.
    async fn update_password_hash(&self, id: UserId, password_hash: String) -> Result<()>;

    /// Deletes a user that no session references.
    ///
    /// Sessions are never removed as a side effect. Clear them first with
    /// [`SessionLedger::delete_user_sessions`](crate::SessionLedger::delete_user_sessions).
    ///
    /// # Errors
    ///
    /// * [`Error::NotFound`](crate::Error::NotFound) - No user has `id`.
    /// * [`Error::HasDependentSessions`](crate::Error::HasDependentSessions) -
    ///   At least one session, live or expired, belongs to the user.
    async fn delete_user(&self, id: UserId) -> Result<()>;
}
