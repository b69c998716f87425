//! Usernames and their case-insensitive comparison key.

use std::{fmt, str::FromStr};

use validator::ValidateEmail;

/// Longest accepted username, in bytes, after trimming.
pub const MAX_USERNAME_LEN: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum UsernameError {
    #[error("username must not be empty")]
    Empty,

    #[error("username is longer than {MAX_USERNAME_LEN} bytes")]
    TooLong,

    #[error("username contains non-ASCII characters")]
    NonAscii,

    #[error("username contains whitespace or control characters")]
    NonPrintable,

    #[error("username is not a valid email address")]
    NotValidEmail,
}

/// A validated username.
///
/// The original spelling is kept for display. Identity is decided by
/// [`Username::key`], the ASCII-lowercased form, which is what the store puts
/// under its unique index and what lookups compare against. `Alice` and
/// `alice` therefore name the same user.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validates `value` as an email address username.
    ///
    /// The same trimming and length limit apply as for plain usernames, but
    /// the alphabet is whatever a valid address allows. The comparison key is
    /// still the ASCII-lowercased form, so `Bob@Example.com` and
    /// `bob@example.com` name the same user.
    ///
    /// # Errors
    ///
    /// * [`UsernameError::Empty`] or [`UsernameError::TooLong`] as for
    ///   [`FromStr`].
    /// * [`UsernameError::NotValidEmail`] if `value` is not an address.
    pub fn email(value: &str) -> Result<Self, UsernameError> {
        let value = value.trim();

        if value.is_empty() {
            return Err(UsernameError::Empty);
        }

        if value.len() > MAX_USERNAME_LEN {
            return Err(UsernameError::TooLong);
        }

        if !value.validate_email() {
            return Err(UsernameError::NotValidEmail);
        }

        Ok(Self(value.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The normalized comparison key.
    pub fn key(&self) -> String {
        self.0.to_ascii_lowercase()
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Projects raw input onto the comparison key without validating it.
///
/// Lookups go through this so a malformed name simply matches nothing.
pub(crate) fn normalize(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}

impl FromStr for Username {
    type Err = UsernameError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();

        if value.is_empty() {
            return Err(UsernameError::Empty);
        }

        if value.len() > MAX_USERNAME_LEN {
            return Err(UsernameError::TooLong);
        }

        for c in value.chars() {
            if !c.is_ascii() {
                return Err(UsernameError::NonAscii);
            }
            if !c.is_ascii_graphic() {
                return Err(UsernameError::NonPrintable);
            }
        }

        Ok(Self(value.to_owned()))
    }
}

impl TryFrom<String> for Username {
    type Error = UsernameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Username> for String {
    fn from(username: Username) -> Self {
        username.0
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_and_keeps_spelling() {
        let name: Username = "  Alice ".parse().unwrap();
        assert_eq!(name.as_str(), "Alice");
        assert_eq!(name.key(), "alice");
    }

    #[test]
    fn keys_ignore_case() {
        let a: Username = "ALICE".parse().unwrap();
        let b: Username = "alice".parse().unwrap();
        assert_eq!(a.key(), b.key());
        assert_eq!(normalize(" AlIcE"), a.key());
    }

    #[test]
    fn rejects_malformed_names() {
        assert_eq!("   ".parse::<Username>().unwrap_err(), UsernameError::Empty);
        assert_eq!(
            "a".repeat(MAX_USERNAME_LEN + 1).parse::<Username>().unwrap_err(),
            UsernameError::TooLong
        );
        assert_eq!("ålice".parse::<Username>().unwrap_err(), UsernameError::NonAscii);
        assert_eq!(
            "al ice".parse::<Username>().unwrap_err(),
            UsernameError::NonPrintable
        );
    }

    #[test]
    fn accepts_longest_name() {
        assert!("a".repeat(MAX_USERNAME_LEN).parse::<Username>().is_ok());
    }

    #[test]
    fn email_usernames_compare_case_insensitively() {
        let a = Username::email(" Bob@Example.com ").unwrap();
        let b = Username::email("bob@example.COM").unwrap();
        assert_eq!(a.as_str(), "Bob@Example.com");
        assert_eq!(a.key(), b.key());
        assert_eq!(normalize("BOB@example.com"), a.key());
    }

    #[test]
    fn rejects_malformed_email_usernames() {
        assert_eq!(Username::email("  ").unwrap_err(), UsernameError::Empty);
        assert_eq!(
            Username::email("bob").unwrap_err(),
            UsernameError::NotValidEmail
        );
        assert_eq!(
            Username::email("bob@").unwrap_err(),
            UsernameError::NotValidEmail
        );
        assert_eq!(
            Username::email("bob smith@example.com").unwrap_err(),
            UsernameError::NotValidEmail
        );

        let long = format!("{}@example.com", "b".repeat(MAX_USERNAME_LEN));
        assert_eq!(Username::email(&long).unwrap_err(), UsernameError::TooLong);
    }

    #[test]
    fn deserializes_through_validation() {
        let err = serde_json::from_str::<Username>("\"\"").unwrap_err();
        assert!(err.to_string().contains("empty"));
        let ok: Username = serde_json::from_str("\"bob\"").unwrap();
        assert_eq!(ok.as_str(), "bob");
    }
}
