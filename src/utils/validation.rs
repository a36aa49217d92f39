// Common validation utilities for versions and tracked paths

use std::path::{Component, Path};
use std::sync::OnceLock;

use regex::Regex;

use crate::utils::error::{Result, UpdateError};

/// Pattern every upstream release tag must match
pub const RELEASE_TAG_PATTERN: &str = r"^v\d+\.\d+\.\d+$";

/// Version references embedded in free-form documentation
pub const DOC_VERSION_PATTERN: &str = r"\bv(\d+)\.(\d+)\.(\d+)\b";

fn release_tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(RELEASE_TAG_PATTERN).expect("release tag pattern is valid"))
}

pub fn doc_version_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(DOC_VERSION_PATTERN).expect("doc version pattern is valid"))
}

/// Check whether a tag matches `v<int>.<int>.<int>` exactly
pub fn is_strict_release_tag(tag: &str) -> bool {
    release_tag_regex().is_match(tag)
}

/// Validate a path that the updater is allowed to write, relative to the project root
pub fn validate_tracked_path(path: &Path) -> Result<()> {
    if path.as_os_str().is_empty() {
        return Err(UpdateError::Config("Tracked path cannot be empty".to_string()));
    }

    if path.is_absolute() {
        return Err(UpdateError::Config(format!(
            "Tracked path '{}' must be relative to the project root",
            path.display()
        )));
    }

    if path.components().any(|c| matches!(c, Component::ParentDir)) {
        return Err(UpdateError::Config(format!(
            "Tracked path '{}' cannot contain '..' references",
            path.display()
        )));
    }

    Ok(())
}

/// Validate a repository slug such as `owner/name`
pub fn validate_repository_slug(slug: &str) -> Result<()> {
    let mut parts = slug.split('/');
    let valid = matches!(
        (parts.next(), parts.next(), parts.next()),
        (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty()
    );

    if !valid {
        return Err(UpdateError::Config(format!(
            "Invalid repository '{slug}'.\n\nExpected the form owner/name:\n  ✓ simdutf/simdutf\n  ✗ simdutf"
        )));
    }
    Ok(())
}
