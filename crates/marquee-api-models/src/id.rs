//! Validated entity identifiers.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of hexadecimal characters in a backend identifier.
pub const ENTITY_ID_LEN: usize = 24;

/// Reasons an identifier was rejected before reaching the network.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    /// The identifier was empty or whitespace.
    #[error("identifier is missing")]
    Missing,
    /// The identifier was not 24 hexadecimal characters.
    #[error("identifier '{value}' is not a 24-character hexadecimal string")]
    InvalidFormat {
        /// Raw value provided by the caller.
        value: String,
    },
}

/// Backend identifier matching `^[0-9a-fA-F]{24}$`.
///
/// Construction is the only place the format is checked; holding an
/// `EntityId` means the value is safe to place in a request path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EntityId(String);

impl EntityId {
    /// Validate and wrap a raw identifier.
    ///
    /// # Errors
    ///
    /// Returns [`IdError::Missing`] for empty input and
    /// [`IdError::InvalidFormat`] for anything that is not 24 hex digits.
    pub fn parse(raw: &str) -> Result<Self, IdError> {
        if raw.is_empty() {
            return Err(IdError::Missing);
        }
        if raw.len() != ENTITY_ID_LEN || !raw.bytes().all(|byte| byte.is_ascii_hexdigit()) {
            return Err(IdError::InvalidFormat {
                value: raw.to_string(),
            });
        }
        Ok(Self(raw.to_string()))
    }

    /// Borrow the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for EntityId {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl FromStr for EntityId {
    type Err = IdError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl TryFrom<String> for EntityId {
    type Error = IdError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<EntityId> for String {
    fn from(value: EntityId) -> Self {
        value.0
    }
}

impl AsRef<str> for EntityId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
