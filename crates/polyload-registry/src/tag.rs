//! Adapter identifiers.

use std::borrow::Borrow;
use std::fmt;

use polyload_core::ConfigError;

/// Maximum length of a tag, in bytes.
pub const MAX_TAG_LENGTH: usize = 64;

/// Reserved tag of the host proxy implementation.
pub const HOST_PROXY_TAG: &str = "__host__";

/// Identifier selecting which adapter handles a request.
///
/// Usually a file extension (`py`, `js`, `rb`) or [`HOST_PROXY_TAG`]. Tags
/// are non-empty, at most [`MAX_TAG_LENGTH`] bytes, and contain no
/// whitespace, control characters or path separators.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(String);

impl Tag {
    /// Validate and wrap a tag.
    pub fn new(tag: impl Into<String>) -> Result<Self, ConfigError> {
        let tag = tag.into();
        let reason = if tag.is_empty() {
            Some("tag is empty")
        } else if tag.len() > MAX_TAG_LENGTH {
            Some("tag is longer than 64 bytes")
        } else if tag
            .chars()
            .any(|c| c.is_whitespace() || c.is_control() || c == '/' || c == '\\')
        {
            Some("tag contains whitespace, control characters or path separators")
        } else {
            None
        };

        match reason {
            Some(reason) => Err(ConfigError::InvalidTag { tag, reason }),
            None => Ok(Self(tag)),
        }
    }

    /// The host proxy tag.
    pub fn host() -> Self {
        Self(HOST_PROXY_TAG.to_string())
    }

    /// Check if this is the host proxy tag.
    pub fn is_host(&self) -> bool {
        self.0 == HOST_PROXY_TAG
    }

    /// The tag as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Tag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for Tag {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for Tag {
    type Error = ConfigError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Tag::new(value)
    }
}
