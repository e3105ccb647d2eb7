//! Domain newtypes with validation
//!
//! Strongly-typed wrappers for remote identifiers and content checksums.
//! Each newtype ensures data validity at construction time.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::errors::DomainError;

// ============================================================================
// RemoteId
// ============================================================================

/// Server-assigned identifier of a remote file or folder
///
/// Opaque to the client. The alias `root` designates the user's own drive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RemoteId(String);

impl RemoteId {
    /// Alias the store accepts for the root folder of "My Drive"
    pub const ROOT_ALIAS: &'static str = "root";

    /// Create a new RemoteId
    ///
    /// # Errors
    /// Returns error if the ID is empty or contains characters that would
    /// break a filter expression
    pub fn new(id: String) -> Result<Self, DomainError> {
        if id.is_empty() {
            return Err(DomainError::InvalidRemoteId(
                "Remote ID cannot be empty".to_string(),
            ));
        }

        // Drive ids are URL-safe base64-ish strings
        if !id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_' || c == '.')
        {
            return Err(DomainError::InvalidRemoteId(format!(
                "Remote ID contains invalid characters: {id}"
            )));
        }

        Ok(Self(id))
    }

    /// The root folder alias
    #[must_use]
    pub fn root() -> Self {
        Self(Self::ROOT_ALIAS.to_string())
    }

    /// Returns true if this is the root alias
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.0 == Self::ROOT_ALIAS
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for RemoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RemoteId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for RemoteId {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<RemoteId> for String {
    fn from(id: RemoteId) -> Self {
        id.0
    }
}

// ============================================================================
// Checksum
// ============================================================================

/// MD5 content checksum in lowercase hex, as reported by the store's
/// `md5Checksum` field
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Checksum(String);

impl Checksum {
    /// Length of an MD5 digest in hex characters
    const HEX_LEN: usize = 32;

    /// Create a checksum from its hex representation
    ///
    /// Upper-case input is normalised to lower case.
    ///
    /// # Errors
    /// Returns error if the value is not 32 hex characters
    pub fn new(hex_digest: String) -> Result<Self, DomainError> {
        if hex_digest.len() != Self::HEX_LEN {
            return Err(DomainError::InvalidChecksum(format!(
                "expected {} hex characters, got {}",
                Self::HEX_LEN,
                hex_digest.len()
            )));
        }

        if !hex_digest.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(DomainError::InvalidChecksum(format!(
                "not a hex digest: {hex_digest}"
            )));
        }

        Ok(Self(hex_digest.to_ascii_lowercase()))
    }

    /// Build a checksum from raw digest bytes
    #[must_use]
    pub fn from_digest(digest: &[u8]) -> Self {
        Self(hex::encode(digest))
    }

    /// Get the inner string reference
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Checksum {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Checksum {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.to_string())
    }
}

impl TryFrom<String> for Checksum {
    type Error = DomainError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<Checksum> for String {
    fn from(checksum: Checksum) -> Self {
        checksum.0
    }
}
