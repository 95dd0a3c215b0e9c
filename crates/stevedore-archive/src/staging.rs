// SPDX-FileCopyrightText: 2026 Stevedore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! RAII staging directories for in-flight registrations.
//!
//! A registration unpacks into a [`StagingDir`] first and is only renamed
//! into its namespace after validation. Dropping the guard removes the tree,
//! so an error return or a cancelled task unwinds to a clean filesystem
//! without orphaned staging directories.

use std::path::{Path, PathBuf};

use stevedore_core::StevedoreError;

/// A staging directory that cleans itself up unless disarmed.
#[derive(Debug)]
pub struct StagingDir {
    path: PathBuf,
    armed: bool,
}

impl StagingDir {
    /// Create a fresh uniquely-named directory under `staging_root`.
    ///
    /// The root is created if missing. Unique names let concurrent
    /// registrations stage side by side.
    pub fn create(staging_root: &Path) -> Result<Self, StevedoreError> {
        std::fs::create_dir_all(staging_root).map_err(|e| {
            StevedoreError::io(
                format!("failed to create staging root `{}`", staging_root.display()),
                e,
            )
        })?;

        let path = staging_root.join(uuid::Uuid::new_v4().to_string());
        std::fs::create_dir(&path).map_err(|e| {
            StevedoreError::io(
                format!("failed to create staging directory `{}`", path.display()),
                e,
            )
        })?;

        Ok(Self { path, armed: true })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Consume the guard without removing the directory.
    ///
    /// Called after the tree has been renamed away by promotion; the staging
    /// path no longer owns anything at that point.
    pub fn disarm(mut self) -> PathBuf {
        self.armed = false;
        std::mem::take(&mut self.path)
    }
}

impl Drop for StagingDir {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        if let Err(e) = std::fs::remove_dir_all(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "failed to clean up staging directory"
                );
            }
        }
    }
}
