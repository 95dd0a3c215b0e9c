// SPDX-FileCopyrightText: 2026 Stevedore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Stevedore extension manager.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Top-level Stevedore configuration.
///
/// Loaded from TOML files following the XDG hierarchy, with environment
/// variable overrides. All sections are optional and default to sensible
/// values. The resulting object is passed into the registry and store
/// constructors; nothing reads these settings from process-wide state.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StevedoreConfig {
    /// Directory layout for extensions and generated artifacts.
    #[serde(default)]
    pub paths: PathsConfig,

    /// Embedded catalog and repository settings.
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Archive extraction limits.
    #[serde(default)]
    pub extraction: ExtractionConfig,
}

/// Directory layout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct PathsConfig {
    /// Root directory holding the `custom/` and `embedded/` namespaces.
    #[serde(default = "default_extensions_root")]
    pub extensions_root: String,

    /// Directory where generated configuration artifacts are written.
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: String,
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            extensions_root: default_extensions_root(),
            artifacts_dir: default_artifacts_dir(),
        }
    }
}

impl PathsConfig {
    pub fn extensions_root(&self) -> PathBuf {
        PathBuf::from(&self.extensions_root)
    }

    pub fn artifacts_dir(&self) -> PathBuf {
        PathBuf::from(&self.artifacts_dir)
    }
}

fn default_extensions_root() -> String {
    "extensions".to_string()
}

fn default_artifacts_dir() -> String {
    "generated".to_string()
}

/// Embedded catalog configuration.
///
/// Both fields default to `None`, which disables the embedded namespace's
/// catalog mode: only already-materialized embedded extensions are visible.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct RegistryConfig {
    /// TOML file listing the embedded extensions available in the bundled
    /// repository.
    #[serde(default)]
    pub catalog_file: Option<String>,

    /// Directory containing the bundled repository's `*.tar.gz` archives.
    #[serde(default)]
    pub repository_path: Option<String>,
}

/// Archive extraction limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ExtractionConfig {
    /// Cap on the decompressed size of a single archive entry, in bytes.
    #[serde(default = "default_max_entry_size")]
    pub max_entry_size: u64,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            max_entry_size: default_max_entry_size(),
        }
    }
}

fn default_max_entry_size() -> u64 {
    // 100 MB guards against decompression bombs in uploaded archives.
    100 * 1024 * 1024
}
