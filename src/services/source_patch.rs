// Raw-text patches applied to vendored files and documentation.
// Nothing here interprets the vendored language beyond line equality.

use regex::Captures;

use crate::models::version::Version;
use crate::utils::validation::doc_version_regex;

/// Annotation line that excludes a vendored file from the build when an
/// externally installed copy of the library is linked instead
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardMarker {
    line: String,
}

impl GuardMarker {
    pub fn new(line: impl Into<String>) -> Self {
        Self {
            line: line.into().trim_end().to_string(),
        }
    }

    /// Whether any line of `content` is exactly the marker
    pub fn is_present(&self, content: &str) -> bool {
        content
            .lines()
            .any(|line| line.trim_end_matches('\r') == self.line)
    }

    /// Prepend the marker unless it is already present
    pub fn apply(&self, content: &str) -> String {
        if self.is_present(content) {
            return content.to_string();
        }
        format!("{}\n\n{}", self.line, content)
    }
}

/// Replace every `vX.Y.Z` reference with `X >= floor` by `version`.
///
/// References below the floor and version-like text not matching the pattern
/// are left untouched.
pub fn rewrite_version_references(document: &str, version: &Version, floor: u64) -> String {
    let replacement = version.to_string();
    doc_version_regex()
        .replace_all(document, |caps: &Captures<'_>| {
            let major = caps[1].parse::<u64>().unwrap_or(0);
            if major >= floor {
                replacement.clone()
            } else {
                caps[0].to_string()
            }
        })
        .into_owned()
}

/// Content of the version marker file
pub fn version_file_content(version: &Version) -> String {
    format!("{version}\n")
}
