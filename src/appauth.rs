//! Service token registry: long-lived bearer credentials for non-human callers.

use std::fmt;

use async_trait::async_trait;
use serde_json::Value;
use time::OffsetDateTime;

use crate::{document, error::Result, id::AppAuthId};

/// Payload for [`TokenRegistry::issue_token`].
#[derive(Clone)]
pub struct NewAppAuth {
    pub name: String,
    pub description: Option<String>,
    pub token: String,
    pub meta: Value,
    /// `None` means the token never expires.
    pub expires_at: Option<OffsetDateTime>,
}

impl NewAppAuth {
    pub fn new(name: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            token: token.into(),
            meta: document::empty(),
            expires_at: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_meta(mut self, meta: Value) -> Self {
        self.meta = meta;
        self
    }

    pub fn with_expires_at(mut self, expires_at: OffsetDateTime) -> Self {
        self.expires_at = Some(expires_at);
        self
    }
}

impl fmt::Debug for NewAppAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewAppAuth")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("token", &"[redacted]")
            .field("meta", &self.meta)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// A registered service and its current bearer token.
#[derive(Clone, PartialEq)]
pub struct AppAuth {
    pub id: AppAuthId,
    pub name: String,
    pub description: Option<String>,
    pub token: String,
    pub meta: Value,
    pub expires_at: Option<OffsetDateTime>,
}

impl AppAuth {
    /// Whether the token is valid at `now`. Tokens without an expiry always are.
    pub fn is_live(&self, now: OffsetDateTime) -> bool {
        self.expires_at.map_or(true, |expires_at| now < expires_at)
    }
}

impl fmt::Debug for AppAuth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppAuth")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("description", &self.description)
            .field("token", &"[redacted]")
            .field("meta", &self.meta)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

/// Storage contract for service tokens.
///
/// `name` and `token` are each unique across all registrations. Both are
/// enforced by unique indexes, so of two racing writes with the same token
/// exactly one succeeds.
#[async_trait]
pub trait TokenRegistry: Send + Sync {
    /// Registers a service token.
    ///
    /// # Parameters
    ///
    /// * `app` - Name, bearer token and optional description, `meta` and
    ///   expiry of the new registration.
    ///
    /// # Returns
    ///
    /// The stored [`AppAuth`] with a freshly generated id.
    ///
    /// # Errors
    ///
    /// * [`Error::DuplicateName`](crate::Error::DuplicateName) - Another
    ///   registration has the same name.
    /// * [`Error::DuplicateToken`](crate::Error::DuplicateToken) - Another
    ///   registration has the same token.
    ///
    /// Nothing is overwritten in either case.
    async fn issue_token(&self, app: NewAppAuth) -> Result<AppAuth>;

    /// Fetches a registration by id, expired or not.
    ///
    /// # Errors
    ///
    /// [`Error::NotFound`](crate::Error::NotFound) if no registration has `id`.
    async fn get_app_auth(&self, id: AppAuthId) -> Result<AppAuth>;

    /// Resolves the caller behind a presented bearer token.
    ///
    /// Unknown tokens fail with [`Error::NotFound`](crate::Error::NotFound);
    /// known tokens past their expiry fail with
    /// [`Error::Expired`](crate::Error::Expired).
    async fn resolve_by_token(&self, token: &str) -> Result<AppAuth>;

    /// Checks `token` against the registration `id`.
    ///
    /// The comparison takes the same time wherever the tokens first differ.
    ///
    /// # Errors
    ///
    /// * [`Error::NotFound`](crate::Error::NotFound) - No registration has `id`.
    /// * [`Error::InvalidToken`](crate::Error::InvalidToken) - `token` does not
    ///   match. This is reported before expiry.
    /// * [`Error::Expired`](crate::Error::Expired) - The token matches but has
    ///   expired.
    async fn verify_token(&self, id: AppAuthId, token: &str) -> Result<()>;

    /// De-provisions the service.
    async fn revoke(&self, id: AppAuthId) -> Result<()>;

    /// Replaces the bearer token, keeping every other field.
    ///
    /// # Errors
    ///
    /// * [`Error::NotFound`](crate::Error::NotFound) - No registration has `id`.
    /// * [`Error::DuplicateToken`](crate::Error::DuplicateToken) - The new
    ///   token belongs to another registration.
    async fn rotate_token(&self, id: AppAuthId, token: String) -> Result<()>;

    /// Sets or clears the expiry.
    async fn set_token_expiry(
        &self,
        id: AppAuthId,
        expires_at: Option<OffsetDateTime>,
    ) -> Result<()>;

    /// Deletes tokens with an expiry `<= now`, returning the count.
    async fn delete_expired_tokens(&self, now: OffsetDateTime) -> Result<u64>;
}
