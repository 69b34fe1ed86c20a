//! Identifier newtypes for players, banners, rewards, and committed pulls.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create an identifier from any string-like value.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// The identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self::new(s)
            }
        }
    };
}

string_id!(
    /// Identifies a player account.
    PlayerId
);

string_id!(
    /// Identifies a published banner. A changed rate table needs a new ID.
    BannerId
);

string_id!(
    /// Identifies a reward (character, weapon, item) that a draw can yield.
    RewardId
);

/// Unique identifier of one committed pull batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PullId(pub Uuid);

impl PullId {
    /// Generate a new random pull ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PullId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PullId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", &self.0.to_string()[..8])
    }
}
