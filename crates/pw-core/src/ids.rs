use core::fmt;
use core::str::FromStr;

use crate::error::{PwError, PwResult};

/// Name of a boolean tag exchanged with the external controller.
///
/// - shared verbatim with the protocol session (e.g. `B1_A21`)
/// - identity of the tag for the whole simulation run
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct TagId(String);

impl TagId {
    /// Create a tag id without validation.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Create a tag id, rejecting names the controller could not address.
    pub fn parse(name: &str) -> PwResult<Self> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(PwError::InvalidTagName {
                name: name.to_string(),
                reason: "tag name is empty",
            });
        }
        if !trimmed
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '-'))
        {
            return Err(PwError::InvalidTagName {
                name: name.to_string(),
                reason: "only ASCII letters, digits, '_', '.' and '-' are allowed",
            });
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for TagId {
    type Err = PwError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<&str> for TagId {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl From<String> for TagId {
    fn from(name: String) -> Self {
        Self(name)
    }
}

impl fmt::Debug for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TagId({})", self.0)
    }
}

impl fmt::Display for TagId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&self.0)
    }
}
