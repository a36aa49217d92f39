// Shared fixtures for integration tests

use std::fs;
use std::io::{self, Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use serde_json::{json, Value};
use tempfile::TempDir;
use zip::write::FileOptions;

use vendor_sync::services::command_runner::{CommandOutput, CommandRunner, Invocation};
use vendor_sync::utils::config::UpdaterConfig;

pub const MARKER: &str = "//go:build !libsimdutf";
pub const OLD_README: &str = "# simdutf\n\nBundles simdutf [v7.0.1](https://github.com/simdutf/simdutf/releases/tag/v7.0.1).\nLinking a system copy requires v6.9.9 or newer.\n";
pub const OLD_CPP: &str = "//go:build !libsimdutf\n\n/* simdutf v7.0.1 */\nint old_impl();\n";
pub const OLD_H: &str = "//go:build !libsimdutf\n\n/* simdutf v7.0.1 */\nint old_decl();\n";
pub const ALL_MODIFIED: &str = " M README.md\n M SIMDUTF_VERSION\n M simdutf.cpp\n M simdutf.h\n";

/// Fake command runner that records every invocation.
///
/// `git status` answers with the scripted porcelain output, `git rev-parse`
/// with the scripted branch existence, other git commands succeed and any
/// other program (the test command) exits with `test_exit`.
#[derive(Clone, Default)]
pub struct RecordingRunner {
    calls: Arc<Mutex<Vec<Invocation>>>,
    status: String,
    test_exit: i32,
    branch_exists: bool,
}

impl RecordingRunner {
    pub fn with_status(status: &str) -> Self {
        Self {
            status: status.to_string(),
            ..Self::default()
        }
    }

    pub fn failing_tests(mut self, exit_code: i32) -> Self {
        self.test_exit = exit_code;
        self
    }

    pub fn with_existing_branch(mut self) -> Self {
        self.branch_exists = true;
        self
    }

    pub fn calls(&self) -> Vec<Invocation> {
        self.calls.lock().unwrap().clone()
    }

    /// Arguments of every git invocation, in order
    pub fn git_calls(&self) -> Vec<Vec<String>> {
        self.calls()
            .into_iter()
            .filter(|call| call.program == "git")
            .map(|call| call.args)
            .collect()
    }

    /// Number of git invocations with the given subcommand
    pub fn git_count(&self, subcommand: &str) -> usize {
        self.git_calls()
            .iter()
            .filter(|args| args.first().map(String::as_str) == Some(subcommand))
            .count()
    }

    pub fn test_runs(&self) -> Vec<Invocation> {
        self.calls()
            .into_iter()
            .filter(|call| call.program != "git")
            .collect()
    }
}

impl CommandRunner for RecordingRunner {
    async fn run(&self, invocation: &Invocation) -> io::Result<CommandOutput> {
        self.calls.lock().unwrap().push(invocation.clone());

        if invocation.program != "git" {
            return Ok(CommandOutput {
                exit_code: self.test_exit,
                stdout: String::new(),
                stderr: String::new(),
            });
        }

        let output = match invocation.args.first().map(String::as_str) {
            Some("status") => CommandOutput::with_stdout(self.status.clone()),
            Some("rev-parse") if !self.branch_exists => CommandOutput::failed(1, ""),
            _ => CommandOutput::with_stdout(""),
        };
        Ok(output)
    }
}

/// Project tree bundling v7.0.1
pub struct Project {
    pub dir: TempDir,
}

impl Project {
    pub fn new() -> Self {
        let dir = TempDir::new().expect("Failed to create temp directory");
        fs::write(dir.path().join("SIMDUTF_VERSION"), "v7.0.1\n").unwrap();
        fs::write(dir.path().join("README.md"), OLD_README).unwrap();
        fs::write(dir.path().join("simdutf.cpp"), OLD_CPP).unwrap();
        fs::write(dir.path().join("simdutf.h"), OLD_H).unwrap();
        Self { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn read(&self, relative: &str) -> String {
        fs::read_to_string(self.root().join(relative)).unwrap()
    }

    pub fn path(&self, relative: &str) -> PathBuf {
        self.root().join(relative)
    }

    /// Assert that no tracked file changed
    pub fn assert_untouched(&self) {
        assert_eq!(self.read("SIMDUTF_VERSION"), "v7.0.1\n");
        assert_eq!(self.read("README.md"), OLD_README);
        assert_eq!(self.read("simdutf.cpp"), OLD_CPP);
        assert_eq!(self.read("simdutf.h"), OLD_H);
    }
}

/// Single-header archive as published upstream (sources without the marker)
pub fn singleheader_zip(version: &str) -> Vec<u8> {
    zip_with(&[
        ("simdutf.cpp", &format!("/* simdutf {version} */\nint new_impl();\n")),
        ("simdutf.h", &format!("/* simdutf {version} */\nint new_decl();\n")),
        ("README.md", "upstream readme\n"),
    ])
}

pub fn zip_with(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut zip = zip::ZipWriter::new(Cursor::new(Vec::new()));
    for (name, content) in entries {
        zip.start_file(*name, FileOptions::default()).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap().into_inner()
}

pub fn release_json(tag: &str, draft: bool, prerelease: bool, download_base: &str) -> Value {
    json!({
        "tag_name": tag,
        "name": tag,
        "draft": draft,
        "prerelease": prerelease,
        "html_url": format!("https://github.com/simdutf/simdutf/releases/tag/{tag}"),
        "assets": [
            {
                "name": "singleheader.zip",
                "browser_download_url": format!("{download_base}/downloads/{tag}/singleheader.zip"),
                "size": 1024
            },
            {
                "name": "simdutf-src.tar.gz",
                "browser_download_url": format!("{download_base}/downloads/{tag}/simdutf-src.tar.gz"),
                "size": 4096
            }
        ]
    })
}

pub fn pull_json(number: u64, branch: &str) -> Value {
    json!({
        "number": number,
        "html_url": format!("https://github.com/charlievieth/simdutf/pull/{number}"),
        "state": "open",
        "title": "deps: update bundled library version",
        "head": {"ref": branch, "sha": "0123456789abcdef"}
    })
}

/// Default configuration pointed at a mock server
pub fn config_for(server_url: &str) -> UpdaterConfig {
    UpdaterConfig {
        api_url: server_url.to_string(),
        http_timeout_secs: 5,
        ..UpdaterConfig::default()
    }
}

pub fn short_timeout() -> Duration {
    Duration::from_secs(5)
}
