use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::models::version::Version;
use crate::utils::error::{Result, UpdateError};
use crate::utils::validation::validate_tracked_path;

/// The fixed set of files the installer is allowed to modify
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackedLayout {
    /// Vendored sources, copied from the release archive by file name
    pub vendored_files: Vec<PathBuf>,
    /// Single-line file recording the bundled version
    pub version_file: PathBuf,
    /// Documentation with embedded version references
    pub docs_file: PathBuf,
}

impl Default for TrackedLayout {
    fn default() -> Self {
        Self {
            vendored_files: vec![PathBuf::from("simdutf.cpp"), PathBuf::from("simdutf.h")],
            version_file: PathBuf::from("SIMDUTF_VERSION"),
            docs_file: PathBuf::from("README.md"),
        }
    }
}

impl TrackedLayout {
    /// Every tracked path, in the order they are staged
    pub fn tracked_paths(&self) -> Vec<PathBuf> {
        let mut paths = self.vendored_files.clone();
        paths.push(self.version_file.clone());
        paths.push(self.docs_file.clone());
        paths
    }

    pub fn is_tracked(&self, path: &Path) -> bool {
        self.tracked_paths().iter().any(|p| p == path)
    }

    pub fn validate(&self) -> Result<()> {
        if self.vendored_files.is_empty() {
            return Err(UpdateError::Config(
                "At least one vendored file must be listed".to_string(),
            ));
        }

        for path in self.tracked_paths() {
            validate_tracked_path(&path)?;
        }

        for path in &self.vendored_files {
            if path.file_name().is_none() {
                return Err(UpdateError::Config(format!(
                    "Vendored path '{}' has no file name",
                    path.display()
                )));
            }
        }
        Ok(())
    }
}

/// Recorded local version plus the layout it belongs to
#[derive(Debug, Clone)]
pub struct LocalState {
    pub root: PathBuf,
    pub version: Version,
    pub layout: TrackedLayout,
}

impl LocalState {
    /// Read the version marker file under `root`
    pub fn load(root: &Path, layout: &TrackedLayout) -> Result<Self> {
        let path = root.join(&layout.version_file);
        let content = fs::read_to_string(&path).map_err(|e| {
            UpdateError::Config(format!(
                "Failed to read version file {}: {}",
                path.display(),
                e
            ))
        })?;

        Ok(Self {
            root: root.to_path_buf(),
            version: Version::parse(content.trim())?,
            layout: layout.clone(),
        })
    }
}
