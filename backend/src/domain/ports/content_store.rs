//! Port abstraction for the content-addressed blob store.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Validation errors for content identifiers.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentIdValidationError {
    /// Identifier is empty.
    #[error("content identifier must not be empty")]
    Empty,
    /// Identifier contains characters outside `[A-Za-z0-9]`.
    #[error("content identifier may only contain letters and digits")]
    InvalidCharacters,
}

/// Identifier derived from a blob's own bytes by the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContentId(String);

impl ContentId {
    /// Validate a store-issued identifier.
    pub fn new(raw: impl Into<String>) -> Result<Self, ContentIdValidationError> {
        let raw = raw.into();
        if raw.is_empty() {
            return Err(ContentIdValidationError::Empty);
        }
        if !raw.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(ContentIdValidationError::InvalidCharacters);
        }
        Ok(Self(raw))
    }
}

impl AsRef<str> for ContentId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<ContentId> for String {
    fn from(value: ContentId) -> Self {
        value.0
    }
}

impl TryFrom<String> for ContentId {
    type Error = ContentIdValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Failures raised by content store adapters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContentStoreError {
    /// The store could not be reached.
    #[error("content store unreachable: {message}")]
    Unreachable {
        /// Adapter-supplied detail.
        message: String,
    },
    /// No blob exists for the identifier.
    #[error("no content found for identifier {id}")]
    NotFound {
        /// Identifier that failed to resolve.
        id: String,
    },
    /// The store's response could not be decoded.
    #[error("content store response could not be decoded: {message}")]
    Decode {
        /// Adapter-supplied detail.
        message: String,
    },
}

impl ContentStoreError {
    /// Transport failure with the given detail.
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self::Unreachable {
            message: message.into(),
        }
    }

    /// Missing blob for the given identifier.
    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }

    /// Decode failure with the given detail.
    pub fn decode(message: impl Into<String>) -> Self {
        Self::Decode {
            message: message.into(),
        }
    }
}

/// Write-once, content-addressed blob store.
///
/// Identifiers derive from content, so concurrent writes cannot collide and a
/// successful `get` always returns exactly the bytes that were put.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Persist a blob; returns its content identifier.
    async fn put(&self, blob: &[u8]) -> Result<ContentId, ContentStoreError>;

    /// Fetch a blob by identifier.
    async fn get(&self, id: &ContentId) -> Result<Vec<u8>, ContentStoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn valid_identifiers_round_trip_through_serde() {
        let id = ContentId::new("QmAbc123").expect("valid id");
        let json = serde_json::to_string(&id).expect("serialise");
        let restored: ContentId = serde_json::from_str(&json).expect("deserialise");
        assert_eq!(restored, id);
    }

    #[rstest]
    #[case("", ContentIdValidationError::Empty)]
    #[case("has space", ContentIdValidationError::InvalidCharacters)]
    #[case("../escape", ContentIdValidationError::InvalidCharacters)]
    fn malformed_identifiers_are_rejected(
        #[case] raw: &str,
        #[case] expected: ContentIdValidationError,
    ) {
        assert_eq!(ContentId::new(raw), Err(expected));
    }
}
