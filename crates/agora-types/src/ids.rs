//! Type-safe identifier wrappers around `u64`.
//!
//! Every entity in the forum has a strongly-typed ID to prevent accidental
//! mixing of identifiers at compile time. Identifiers are positive integers
//! assigned by the engine at creation time; `0` is never issued.
//!
//! [`PostId`] and [`CommentId`] are *scoped*: they are unique only within
//! their parent subreddit or post. Use [`PostRef`](crate::PostRef) to name
//! a post unambiguously.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Generates a newtype wrapper around `u64` with standard derives.
macro_rules! define_id {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[serde(transparent)]
        #[ts(export, export_to = "bindings/")]
        pub struct $name(pub u64);

        impl $name {
            /// The first identifier issued in any scope.
            pub const FIRST: Self = Self(1);

            /// Wrap a raw identifier value.
            pub const fn new(raw: u64) -> Self {
                Self(raw)
            }

            /// Return the inner `u64` value.
            pub const fn get(self) -> u64 {
                self.0
            }

            /// The identifier issued after this one in the same scope.
            #[must_use]
            pub const fn next(self) -> Self {
                Self(self.0.saturating_add(1))
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl core::str::FromStr for $name {
            type Err = core::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.parse::<u64>().map(Self)
            }
        }

        impl From<u64> for $name {
            fn from(raw: u64) -> Self {
                Self(raw)
            }
        }

        impl From<$name> for u64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }
    };
}

define_id! {
    /// Unique identifier for a registered user.
    UserId
}

define_id! {
    /// Unique identifier for a subreddit (community).
    SubRedditId
}

define_id! {
    /// Identifier of a post, unique only within its owning subreddit.
    PostId
}

define_id! {
    /// Identifier of a comment, unique only within its owning post.
    CommentId
}

define_id! {
    /// Unique identifier for a direct message.
    MessageId
}
