//! Record identifiers.
//!
//! Every identifier is a random 128-bit UUID (v4) generated by the store at
//! insert time. Callers never choose identifiers; they only get them back from
//! a successful write.

use std::fmt;

use uuid::Uuid;

macro_rules! record_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord,
            serde::Serialize, serde::Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            pub(crate) fn generate() -> Self {
                Self(Uuid::new_v4())
            }

            /// Returns the underlying UUID.
            pub fn into_uuid(self) -> Uuid {
                self.0
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

record_id! {
    /// Identifies a [`User`](crate::User).
    UserId
}

record_id! {
    /// Identifies a [`Session`](crate::Session).
    SessionId
}

record_id! {
    /// Identifies an [`AppAuth`](crate::AppAuth) service token.
    AppAuthId
}
