// SPDX-FileCopyrightText: 2026 Stevedore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Capability set for the backing store of registered extensions.
//!
//! Directory existence and manifest presence are the source of truth for
//! "is this extension registered". That policy is isolated behind
//! [`ExtensionRepository`] so an alternative backing store (for example an
//! embedded key-value store) can substitute without changing registry logic.

use std::path::{Path, PathBuf};

use async_trait::async_trait;

use crate::error::StevedoreError;
use crate::types::ExtensionKind;

/// Filesystem-shaped capabilities the registry needs from its backing store.
#[async_trait]
pub trait ExtensionRepository: Send + Sync {
    /// Atomically move a fully-staged tree into the namespace, making the
    /// extension visible to readers in a single step.
    ///
    /// Returns the promoted path. Fails with `AlreadyRegistered` if the
    /// destination exists.
    async fn promote(
        &self,
        staging: &Path,
        kind: ExtensionKind,
        name: &str,
    ) -> Result<PathBuf, StevedoreError>;

    /// Recursively remove one extension's tree and nothing else.
    ///
    /// Fails with `NotFound` if the extension is not present.
    async fn remove(&self, kind: ExtensionKind, name: &str) -> Result<(), StevedoreError>;

    /// Names of the directories currently present in a namespace.
    ///
    /// No manifest validation happens here; callers decide what an invalid
    /// directory means.
    async fn enumerate(&self, kind: ExtensionKind) -> Result<Vec<String>, StevedoreError>;
}
