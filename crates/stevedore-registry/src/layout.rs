// SPDX-FileCopyrightText: 2026 Stevedore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Filesystem layout of the extension namespaces.
//!
//! The configured extensions root holds one subdirectory per namespace plus
//! a hidden staging area:
//!
//! ```text
//! {extensions_root}/
//! +-- custom/            user-registered extensions, one dir per name
//! +-- embedded/          bundled extensions, one dir per name
//! +-- .staging/          in-flight registrations, invisible to listing
//! ```
//!
//! [`Layout`] implements [`ExtensionRepository`]: promotion is a single
//! rename under the namespace's write lock, so readers never observe a
//! half-moved tree.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::sync::Mutex;

use stevedore_core::{ExtensionKind, ExtensionRepository, NotFoundKind, StevedoreError};

/// Namespace subdirectory for custom extensions.
pub const CUSTOM_DIR: &str = "custom";
/// Namespace subdirectory for embedded extensions.
pub const EMBEDDED_DIR: &str = "embedded";
/// Staging area for in-flight registrations.
pub const STAGING_DIR: &str = ".staging";

/// The extensions root directory plus the per-namespace write locks.
///
/// All filesystem mutations inside a namespace (promotion, removal, and the
/// store's fragment writes) serialize on that namespace's lock. Reads do not
/// take the lock; they only ever see fully promoted trees.
#[derive(Debug)]
pub struct Layout {
    root: PathBuf,
    custom_lock: Mutex<()>,
    embedded_lock: Mutex<()>,
}

impl Layout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            custom_lock: Mutex::new(()),
            embedded_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Directory of one namespace.
    pub fn namespace_dir(&self, kind: ExtensionKind) -> PathBuf {
        match kind {
            ExtensionKind::Custom => self.root.join(CUSTOM_DIR),
            ExtensionKind::Embedded => self.root.join(EMBEDDED_DIR),
        }
    }

    /// Directory of one extension, whether or not it exists.
    pub fn extension_dir(&self, kind: ExtensionKind, name: &str) -> PathBuf {
        self.namespace_dir(kind).join(name)
    }

    /// Root of the staging area.
    pub fn staging_root(&self) -> PathBuf {
        self.root.join(STAGING_DIR)
    }

    /// The write lock guarding one namespace's mutations.
    pub fn lock(&self, kind: ExtensionKind) -> &Mutex<()> {
        match kind {
            ExtensionKind::Custom => &self.custom_lock,
            ExtensionKind::Embedded => &self.embedded_lock,
        }
    }
}

#[async_trait]
impl ExtensionRepository for Layout {
    async fn promote(
        &self,
        staging: &Path,
        kind: ExtensionKind,
        name: &str,
    ) -> Result<PathBuf, StevedoreError> {
        let _guard = self.lock(kind).lock().await;

        let dest = self.extension_dir(kind, name);
        if dest.exists() {
            // Lost a race with a concurrent registration of the same name.
            return Err(StevedoreError::AlreadyRegistered {
                name: name.to_string(),
            });
        }

        let namespace = self.namespace_dir(kind);
        tokio::fs::create_dir_all(&namespace).await.map_err(|e| {
            StevedoreError::io(
                format!("failed to create namespace `{}`", namespace.display()),
                e,
            )
        })?;

        tokio::fs::rename(staging, &dest).await.map_err(|e| {
            StevedoreError::io(
                format!(
                    "failed to promote `{}` into `{}`",
                    staging.display(),
                    dest.display()
                ),
                e,
            )
        })?;

        tracing::info!(name, kind = %kind, path = %dest.display(), "extension promoted");
        Ok(dest)
    }

    async fn remove(&self, kind: ExtensionKind, name: &str) -> Result<(), StevedoreError> {
        let _guard = self.lock(kind).lock().await;

        let dir = self.extension_dir(kind, name);
        if !dir.is_dir() {
            return Err(StevedoreError::not_found(NotFoundKind::Extension, name));
        }

        tokio::fs::remove_dir_all(&dir).await.map_err(|e| {
            StevedoreError::io(format!("failed to remove `{}`", dir.display()), e)
        })?;

        tracing::info!(name, kind = %kind, "extension removed");
        Ok(())
    }

    async fn enumerate(&self, kind: ExtensionKind) -> Result<Vec<String>, StevedoreError> {
        let namespace = self.namespace_dir(kind);

        let mut read_dir = match tokio::fs::read_dir(&namespace).await {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => {
                return Err(StevedoreError::io(
                    format!("failed to read namespace `{}`", namespace.display()),
                    e,
                ))
            }
        };

        let mut names = Vec::new();
        while let Some(entry) = read_dir.next_entry().await.map_err(|e| {
            StevedoreError::io(
                format!("failed to read namespace `{}`", namespace.display()),
                e,
            )
        })? {
            let file_type = entry.file_type().await.map_err(|e| {
                StevedoreError::io(
                    format!("failed to stat `{}`", entry.path().display()),
                    e,
                )
            })?;
            // Stray files (leftover uploads etc.) are not extensions.
            if !file_type.is_dir() {
                continue;
            }
            if let Ok(name) = entry.file_name().into_string() {
                names.push(name);
            }
        }

        names.sort();
        Ok(names)
    }
}
