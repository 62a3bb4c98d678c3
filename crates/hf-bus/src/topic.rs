//! Hierarchical topic names.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{BusError, BusResult};

/// Validated topic name such as `state/reservoir/lower`.
///
/// Segments are separated by `/`. Each segment is non-empty and contains only
/// ASCII alphanumerics, `_`, `-` or `.`, so dotted names like
/// `state.reservoir.level` are accepted as a single segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Topic(String);

impl Topic {
    pub fn new(name: impl Into<String>) -> BusResult<Self> {
        let name = name.into();
        validate(&name)?;
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split('/')
    }

    /// True when `prefix` names this topic or one of its ancestors.
    pub fn is_under(&self, prefix: &Topic) -> bool {
        self.0 == prefix.0
            || (self.0.starts_with(prefix.as_str())
                && self.0.as_bytes().get(prefix.0.len()) == Some(&b'/'))
    }
}

fn validate(name: &str) -> BusResult<()> {
    let malformed = |reason| BusError::MalformedTopic {
        topic: name.to_string(),
        reason,
    };
    if name.is_empty() {
        return Err(malformed("topic is empty"));
    }
    for segment in name.split('/') {
        if segment.is_empty() {
            return Err(malformed("empty segment"));
        }
        if !segment
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'_' | b'-' | b'.'))
        {
            return Err(malformed("segment contains an invalid character"));
        }
    }
    Ok(())
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Topic {
    type Err = BusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Topic {
    type Error = BusError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for Topic {
    type Error = BusError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Topic> for String {
    fn from(topic: Topic) -> Self {
        topic.0
    }
}

impl AsRef<str> for Topic {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
