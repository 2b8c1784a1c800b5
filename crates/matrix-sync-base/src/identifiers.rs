// Copyright 2024 The Matrix.org Foundation C.I.C.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Validated Matrix identifiers.
//!
//! Room and user identifiers share the same shape: a sigil, a non-empty
//! localpart without colons, a colon and a non-empty server name. Anything
//! else is rejected when the identifier is constructed, so a [`RoomId`] or
//! [`UserId`] that exists is always well formed.

use std::{borrow::Borrow, fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An error encountered when trying to parse an invalid identifier.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum IdParseError {
    /// The identifier doesn't start with the expected sigil.
    #[error("identifier must start with `{expected}`")]
    MissingLeadingSigil {
        /// The sigil the identifier kind requires.
        expected: char,
    },

    /// The identifier has no colon separating the localpart from the server
    /// name.
    #[error("identifier is missing a colon")]
    MissingColon,

    /// The part between the sigil and the colon is empty.
    #[error("identifier has an empty localpart")]
    EmptyLocalpart,

    /// Nothing follows the colon.
    #[error("identifier has an empty server name")]
    EmptyServerName,

    /// The server name contains a line break.
    #[error("identifier has an invalid server name")]
    InvalidServerName,
}

fn validate(s: &str, sigil: char) -> Result<(), IdParseError> {
    let rest =
        s.strip_prefix(sigil).ok_or(IdParseError::MissingLeadingSigil { expected: sigil })?;
    let (localpart, server_name) = rest.split_once(':').ok_or(IdParseError::MissingColon)?;

    if localpart.is_empty() {
        return Err(IdParseError::EmptyLocalpart);
    }

    if server_name.is_empty() {
        return Err(IdParseError::EmptyServerName);
    }

    if server_name.contains('\n') {
        return Err(IdParseError::InvalidServerName);
    }

    Ok(())
}

macro_rules! identifier {
    ($(#[$meta:meta])* $name:ident, $sigil:literal) => {
        $(#[$meta])*
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// The sigil every identifier of this kind starts with.
            pub const SIGIL: char = $sigil;

            /// Parse and validate the given string.
            pub fn parse(id: impl AsRef<str> + Into<String>) -> Result<Self, IdParseError> {
                validate(id.as_ref(), Self::SIGIL)?;
                Ok(Self(id.into()))
            }

            /// The identifier as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// The part between the sigil and the first colon.
            pub fn localpart(&self) -> &str {
                let rest = &self.0[1..];
                rest.split_once(':').map(|(localpart, _)| localpart).unwrap_or(rest)
            }

            /// Everything after the first colon.
            pub fn server_name(&self) -> &str {
                self.0.split_once(':').map(|(_, server_name)| server_name).unwrap_or_default()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Debug::fmt(&self.0, f)
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }

        impl FromStr for $name {
            type Err = IdParseError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Self::parse(s)
            }
        }

        impl TryFrom<String> for $name {
            type Error = IdParseError;

            fn try_from(s: String) -> Result<Self, Self::Error> {
                Self::parse(s)
            }
        }

        impl TryFrom<&str> for $name {
            type Error = IdParseError;

            fn try_from(s: &str) -> Result<Self, Self::Error> {
                Self::parse(s)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl PartialEq<str> for $name {
            fn eq(&self, other: &str) -> bool {
                self.0 == other
            }
        }

        impl PartialEq<&str> for $name {
            fn eq(&self, other: &&str) -> bool {
                self.0 == *other
            }
        }
    };
}

identifier!(
    /// A Matrix room ID, e.g. `!n8f893n9:example.com`.
    RoomId,
    '!'
);

identifier!(
    /// A Matrix user ID, e.g. `@carl:example.com`.
    UserId,
    '@'
);
