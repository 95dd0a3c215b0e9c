// SPDX-FileCopyrightText: 2026 Stevedore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The embedded extension catalog.
//!
//! A catalog is a TOML file naming the extensions available in the bundled
//! repository, each as a `[[extensions]]` entry with an optional version.
//! Catalog entries are addressable before they are materialized on disk;
//! listing in catalog mode surfaces them with name and version only.

use std::path::Path;

use serde::Deserialize;

use stevedore_core::{NotFoundKind, StevedoreError};

/// One entry in the embedded catalog.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CatalogEntry {
    /// Full catalog name, e.g. `ext-template` or `ext-template-v`.
    pub name: String,
    /// Version of the packaged archive, when the entry is versioned.
    #[serde(default)]
    pub version: Option<String>,
}

impl CatalogEntry {
    /// File name of this entry's archive inside the bundled repository.
    ///
    /// Versioned entries resolve to `{name}-{version}.tar.gz`, unversioned
    /// ones to `{name}.tar.gz`.
    pub fn archive_file_name(&self) -> String {
        match &self.version {
            Some(version) => format!("{}-{version}.tar.gz", self.name),
            None => format!("{}.tar.gz", self.name),
        }
    }
}

/// Parsed embedded catalog.
#[derive(Debug, Clone, Default)]
pub struct EmbeddedCatalog {
    entries: Vec<CatalogEntry>,
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    extensions: Vec<CatalogEntry>,
}

impl EmbeddedCatalog {
    /// Parse a catalog from TOML content.
    ///
    /// Rejects duplicate names and versions that do not parse as semver.
    pub fn parse(toml_content: &str) -> Result<Self, StevedoreError> {
        let file: CatalogFile = toml::from_str(toml_content)
            .map_err(|e| StevedoreError::Config(format!("invalid embedded catalog: {e}")))?;

        let mut seen = std::collections::HashSet::new();
        for entry in &file.extensions {
            if entry.name.is_empty() {
                return Err(StevedoreError::Config(
                    "embedded catalog: entry with empty name".to_string(),
                ));
            }
            if !seen.insert(entry.name.as_str()) {
                return Err(StevedoreError::Config(format!(
                    "embedded catalog: duplicate entry `{}`",
                    entry.name
                )));
            }
            if let Some(version) = &entry.version {
                semver::Version::parse(version).map_err(|e| {
                    StevedoreError::Config(format!(
                        "embedded catalog: entry `{}` version `{version}` is not valid semver: {e}",
                        entry.name
                    ))
                })?;
            }
        }

        Ok(Self {
            entries: file.extensions,
        })
    }

    /// Load a catalog from a file on disk.
    pub fn load(path: &Path) -> Result<Self, StevedoreError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            StevedoreError::io(
                format!("failed to read embedded catalog `{}`", path.display()),
                e,
            )
        })?;
        Self::parse(&content)
    }

    /// Exact-name lookup.
    ///
    /// `ext-template` never matches `ext-template-v` or any other entry
    /// sharing a prefix.
    pub fn lookup(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    /// Like [`lookup`](Self::lookup) but failing with `NotFound`.
    pub fn require(&self, name: &str) -> Result<&CatalogEntry, StevedoreError> {
        self.lookup(name)
            .ok_or_else(|| StevedoreError::not_found(NotFoundKind::CatalogEntry, name))
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }
}
