// SPDX-FileCopyrightText: 2026 Stevedore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Temp-directory workspace harness.
//!
//! [`TestWorkspace`] stands up an isolated extensions root, artifacts
//! directory, embedded repository, and catalog file inside a tempdir, and
//! hands back the matching [`StevedoreConfig`]. Because the config object
//! is explicit (no process globals), any number of workspaces coexist in
//! one test process.

use std::path::{Path, PathBuf};

use stevedore_config::StevedoreConfig;
use tempfile::TempDir;

/// An isolated on-disk workspace plus the config pointing at it.
pub struct TestWorkspace {
    temp: TempDir,
    /// Config wired to the workspace's directories.
    pub config: StevedoreConfig,
}

impl TestWorkspace {
    /// Create a workspace with no embedded catalog.
    pub fn new() -> Self {
        let temp = TempDir::new().expect("create temp workspace");
        let mut config = StevedoreConfig::default();
        config.paths.extensions_root = temp
            .path()
            .join("extensions")
            .to_string_lossy()
            .into_owned();
        config.paths.artifacts_dir = temp
            .path()
            .join("generated")
            .to_string_lossy()
            .into_owned();

        Self { temp, config }
    }

    /// Add an embedded catalog with the given `(name, version)` entries and
    /// an empty repository directory.
    pub fn with_catalog(mut self, entries: &[(&str, Option<&str>)]) -> Self {
        let repo = self.temp.path().join("repo");
        std::fs::create_dir_all(&repo).expect("create repository dir");

        let mut catalog = String::new();
        for (name, version) in entries {
            catalog.push_str(&format!("[[extensions]]\nname = \"{name}\"\n"));
            if let Some(version) = version {
                catalog.push_str(&format!("version = \"{version}\"\n"));
            }
            catalog.push('\n');
        }
        let catalog_path = self.temp.path().join("catalog.toml");
        std::fs::write(&catalog_path, catalog).expect("write catalog");

        self.config.registry.catalog_file =
            Some(catalog_path.to_string_lossy().into_owned());
        self.config.registry.repository_path = Some(repo.to_string_lossy().into_owned());
        self
    }

    /// Drop an archive into the embedded repository under `file_name`.
    pub fn add_repo_archive(&self, file_name: &str, bytes: &[u8]) {
        let repo = self
            .config
            .registry
            .repository_path
            .as_ref()
            .expect("workspace has no repository; call with_catalog first");
        std::fs::write(Path::new(repo).join(file_name), bytes).expect("write repo archive");
    }

    /// The configured extensions root.
    pub fn extensions_root(&self) -> PathBuf {
        PathBuf::from(&self.config.paths.extensions_root)
    }

    /// The configured artifacts directory.
    pub fn artifacts_dir(&self) -> PathBuf {
        PathBuf::from(&self.config.paths.artifacts_dir)
    }

    /// The tempdir itself, for tests that need extra scratch space.
    pub fn path(&self) -> &Path {
        self.temp.path()
    }
}

impl Default for TestWorkspace {
    fn default() -> Self {
        Self::new()
    }
}
