use std::collections::HashMap;
use std::fs::{self, File};
use std::io::{ErrorKind, Read, Seek, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::{debug, warn};
use zip::ZipArchive;

use crate::models::local_state::TrackedLayout;
use crate::models::release::ReleaseDescriptor;
use crate::models::version::Version;
use crate::services::release_client::ReleaseClient;
use crate::services::source_patch::{rewrite_version_references, version_file_content, GuardMarker};
use crate::utils::config::UpdaterConfig;
use crate::utils::error::{Result, UpdateError};

/// Summary of a completed installation
#[derive(Debug, Clone)]
pub struct InstallReport {
    pub version: Version,
    pub archive_size: u64,
    pub archive_sha256: String,
    /// Tracked paths that were replaced, relative to the project root
    pub written: Vec<PathBuf>,
}

/// New content for one tracked file, prepared before any tracked file is touched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub relative: PathBuf,
    pub content: String,
}

/// Pulls a release archive and rewrites the vendored files in place
#[derive(Debug, Clone)]
pub struct ArtifactInstaller {
    release_client: ReleaseClient,
    root: PathBuf,
    layout: TrackedLayout,
    marker: GuardMarker,
    docs_floor: u64,
}

impl ArtifactInstaller {
    pub fn new(release_client: ReleaseClient, root: &Path, config: &UpdaterConfig) -> Self {
        Self {
            release_client,
            root: root.to_path_buf(),
            layout: config.layout.clone(),
            marker: GuardMarker::new(config.guard_marker.clone()),
            docs_floor: config.docs_version_floor,
        }
    }

    /// Download, patch and install `descriptor` into the tracked paths.
    ///
    /// All work happens in a scratch directory first. Tracked paths are only
    /// replaced once every file has been prepared, each through a temp file
    /// renamed over the target.
    pub async fn install(&self, descriptor: &ReleaseDescriptor, archive_url: &str) -> Result<InstallReport> {
        descriptor.ensure_installable()?;

        let scratch = tempfile::Builder::new()
            .prefix("vendor-sync-")
            .tempdir()
            .map_err(|e| UpdateError::Installation(format!("Failed to create scratch directory: {e}")))?;

        let archive_path = scratch.path().join(self.release_client.asset_name());
        let archive = self
            .release_client
            .download_archive(archive_url, &archive_path)
            .await?;
        debug!("downloaded {} to {}", self.release_client.asset_name(), archive.path.display());

        let staged = self.stage(&descriptor.tag, &archive.path)?;
        let written = self.replace_tracked(&staged)?;
        Ok(InstallReport {
            version: descriptor.tag.clone(),
            archive_size: archive.size,
            archive_sha256: archive.sha256,
            written,
        })
    }

    /// Prepare the new content of every tracked file
    pub fn stage(&self, version: &Version, archive_path: &Path) -> Result<Vec<StagedFile>> {
        let names: Vec<String> = self
            .layout
            .vendored_files
            .iter()
            .filter_map(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .collect();

        let file = File::open(archive_path).map_err(|e| {
            UpdateError::Installation(format!("Failed to open {}: {}", archive_path.display(), e))
        })?;
        let mut members = read_members(file, &names)?;

        let mut staged = Vec::with_capacity(self.layout.vendored_files.len() + 2);
        for (relative, name) in self.layout.vendored_files.iter().zip(&names) {
            let content = members.remove(name).unwrap_or_default();
            staged.push(StagedFile {
                relative: relative.clone(),
                content: self.marker.apply(&content),
            });
        }

        let docs_path = self.root.join(&self.layout.docs_file);
        let docs = std::fs::read_to_string(&docs_path).map_err(|e| {
            UpdateError::Installation(format!("Failed to read {}: {}", docs_path.display(), e))
        })?;
        staged.push(StagedFile {
            relative: self.layout.docs_file.clone(),
            content: rewrite_version_references(&docs, version, self.docs_floor),
        });

        staged.push(StagedFile {
            relative: self.layout.version_file.clone(),
            content: version_file_content(version),
        });

        Ok(staged)
    }

    /// Write every staged file next to its target, then rename all of them into place.
    ///
    /// The current content of each target is read first. A target that cannot
    /// be read fails the install before anything is renamed, and a failed
    /// rename puts back every target already replaced.
    pub fn replace_tracked(&self, staged: &[StagedFile]) -> Result<Vec<PathBuf>> {
        let mut prepared = Vec::with_capacity(staged.len());
        for file in staged {
            let target = self.root.join(&file.relative);
            let previous = read_previous(&target)?;
            let parent = target.parent().unwrap_or(&self.root);
            let mut temp = NamedTempFile::new_in(parent).map_err(|e| {
                UpdateError::Installation(format!(
                    "Failed to create temp file in {}: {}",
                    parent.display(),
                    e
                ))
            })?;
            temp.write_all(file.content.as_bytes())
                .and_then(|()| temp.as_file().sync_all())
                .map_err(|e| {
                    UpdateError::Installation(format!(
                        "Failed to write staged copy of {}: {}",
                        file.relative.display(),
                        e
                    ))
                })?;
            prepared.push((temp, target, file.relative.clone(), previous));
        }

        let mut replaced = Vec::with_capacity(prepared.len());
        let mut written = Vec::with_capacity(prepared.len());
        for (temp, target, relative, previous) in prepared {
            if let Err(e) = temp.persist(&target) {
                restore_previous(&replaced);
                return Err(UpdateError::Installation(format!(
                    "Failed to replace {}: {}",
                    target.display(),
                    e.error
                )));
            }
            debug!("replaced {}", target.display());
            replaced.push((target, previous));
            written.push(relative);
        }
        Ok(written)
    }
}

/// Current content of `target`, `None` when it does not exist yet
fn read_previous(target: &Path) -> Result<Option<Vec<u8>>> {
    match fs::read(target) {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
        Err(e) => Err(UpdateError::Installation(format!(
            "Failed to read current {}: {}",
            target.display(),
            e
        ))),
    }
}

/// Undo replacements in reverse order. Best effort: failures are logged.
fn restore_previous(replaced: &[(PathBuf, Option<Vec<u8>>)]) {
    for (target, previous) in replaced.iter().rev() {
        let restored = match previous {
            Some(bytes) => fs::write(target, bytes),
            None => fs::remove_file(target),
        };
        match restored {
            Ok(()) => debug!("restored {}", target.display()),
            Err(e) => warn!("failed to restore {}: {}", target.display(), e),
        }
    }
}

/// Read the named root-level members of a zip archive as UTF-8 text
pub fn read_members<R: Read + Seek>(reader: R, names: &[String]) -> Result<HashMap<String, String>> {
    let mut archive = ZipArchive::new(reader)
        .map_err(|e| UpdateError::Installation(format!("Failed to read archive: {e}")))?;

    let mut members = HashMap::with_capacity(names.len());
    for name in names {
        let mut entry = archive.by_name(name).map_err(|e| {
            UpdateError::Installation(format!("Archive is missing expected member '{name}': {e}"))
        })?;
        let mut content = String::new();
        entry.read_to_string(&mut content).map_err(|e| {
            UpdateError::Installation(format!("Failed to extract '{name}': {e}"))
        })?;
        members.insert(name.clone(), content);
    }
    Ok(members)
}
