use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::utils::error::{Result, UpdateError};
use crate::utils::validation::is_strict_release_tag;

/// Release identifier of the form `vMAJOR.MINOR.PATCH[-TAG]`
///
/// Ordered by the numeric triple, then by the tag compared as a plain string.
/// An empty tag therefore sorts before any non-empty tag of the same triple
/// (`v1.0.0 < v1.0.0-alpha`), unlike semantic-versioning precedence.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
    pub tag: String,
}

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
            tag: String::new(),
        }
    }

    pub fn with_tag(major: u64, minor: u64, patch: u64, tag: impl Into<String>) -> Self {
        Self {
            major,
            minor,
            patch,
            tag: tag.into(),
        }
    }

    /// Parse a version string.
    ///
    /// Accepts an optional leading `v`, one to three dot-separated integers
    /// and an optional `-tag` suffix. Missing components default to zero and
    /// a bare trailing `-` reads as no tag (`v1.2.3-` is `v1.2.3`).
    pub fn parse(text: &str) -> Result<Self> {
        let stripped = text.strip_prefix('v').unwrap_or(text);
        if stripped.is_empty() {
            return Err(UpdateError::malformed_version(text, "empty version"));
        }

        let (numbers, tag) = stripped.split_once('-').unwrap_or((stripped, ""));

        let parts: Vec<&str> = numbers.split('.').collect();
        if parts.len() > 3 {
            return Err(UpdateError::malformed_version(
                text,
                format!("expected at most 3 numeric components, found {}", parts.len()),
            ));
        }

        let mut triple = [0u64; 3];
        for (slot, part) in triple.iter_mut().zip(&parts) {
            *slot = parse_component(text, part)?;
        }

        Ok(Self::with_tag(triple[0], triple[1], triple[2], tag))
    }

    /// Parse a tag published by the release feed.
    ///
    /// Upstream tags must match `v<int>.<int>.<int>` exactly; no tag suffix,
    /// no missing components, no missing `v`.
    pub fn parse_release_tag(text: &str) -> Result<Self> {
        if !is_strict_release_tag(text) {
            return Err(UpdateError::malformed_version(
                text,
                "release tags must match v<int>.<int>.<int>",
            ));
        }
        Self::parse(text)
    }

    pub fn is_tagged(&self) -> bool {
        !self.tag.is_empty()
    }

    fn triple(&self) -> (u64, u64, u64) {
        (self.major, self.minor, self.patch)
    }
}

fn parse_component(input: &str, part: &str) -> Result<u64> {
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(UpdateError::malformed_version(
            input,
            format!("component '{part}' is not a non-negative integer"),
        ));
    }
    part.parse::<u64>()
        .map_err(|e| UpdateError::malformed_version(input, format!("component '{part}': {e}")))
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        self.triple()
            .cmp(&other.triple())
            .then_with(|| self.tag.cmp(&other.tag))
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}.{}.{}", self.major, self.minor, self.patch)?;
        if self.is_tagged() {
            write!(f, "-{}", self.tag)?;
        }
        Ok(())
    }
}

impl FromStr for Version {
    type Err = UpdateError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::parse(&text).map_err(serde::de::Error::custom)
    }
}
