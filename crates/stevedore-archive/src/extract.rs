// SPDX-FileCopyrightText: 2026 Stevedore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Validated unpacking of extension archives.
//!
//! Archives are gzip-compressed tarballs holding the extension's manifest,
//! optional `scripts/` directory, and any other payload. Validation runs in
//! a first pass that writes nothing; a rejected archive therefore never
//! leaves a partial tree behind.

use std::path::{Component, Path};

use flate2::read::GzDecoder;
use tar::Archive;

use stevedore_core::StevedoreError;

/// Default cap on the decompressed size of a single archive entry.
pub const DEFAULT_MAX_ENTRY_SIZE: u64 = 100 * 1024 * 1024;

/// Check if bytes start with the gzip magic number (0x1f 0x8b).
pub fn is_gzip(bytes: &[u8]) -> bool {
    bytes.len() >= 2 && bytes[0] == 0x1f && bytes[1] == 0x8b
}

/// Unpack an archive into `dest`, preserving directory structure and file
/// permissions so install scripts stay executable.
///
/// Two passes over the in-memory bytes: the first validates every entry
/// (size cap, no absolute paths, no parent-directory components) without
/// touching the filesystem; the second unpacks. Fails fast on the first
/// structural violation.
pub fn unpack_archive(
    bytes: &[u8],
    dest: &Path,
    max_entry_size: u64,
) -> Result<(), StevedoreError> {
    if !is_gzip(bytes) {
        return Err(StevedoreError::Extraction(
            "archive is not gzip-compressed".to_string(),
        ));
    }

    // Pass 1: structural validation, nothing written.
    let mut archive = Archive::new(GzDecoder::new(bytes));
    let entries = archive
        .entries()
        .map_err(|e| StevedoreError::Extraction(format!("failed to read archive entries: {e}")))?;
    let mut entry_count = 0usize;
    for entry in entries {
        let entry = entry
            .map_err(|e| StevedoreError::Extraction(format!("failed to read archive entry: {e}")))?;
        entry_count += 1;

        if entry.size() > max_entry_size {
            return Err(StevedoreError::Extraction(format!(
                "archive entry too large ({} bytes, max {max_entry_size} bytes)",
                entry.size()
            )));
        }

        let path = entry
            .path()
            .map_err(|e| StevedoreError::Extraction(format!("invalid path in archive: {e}")))?;
        check_entry_path(&path)?;
    }

    if entry_count == 0 {
        return Err(StevedoreError::Extraction(
            "archive contains no entries".to_string(),
        ));
    }

    // Pass 2: unpack. Permissions are preserved so scripts/*.sh keep their
    // executable bit; extended attributes are not.
    let mut archive = Archive::new(GzDecoder::new(bytes));
    archive.set_preserve_permissions(true);
    #[cfg(any(unix, target_os = "redox"))]
    archive.set_unpack_xattrs(false);

    archive
        .unpack(dest)
        .map_err(|e| StevedoreError::Extraction(format!("failed to unpack archive: {e}")))?;

    tracing::debug!(dest = %dest.display(), entries = entry_count, "archive unpacked");
    Ok(())
}

/// Reject entry paths that would resolve outside the extraction root.
fn check_entry_path(path: &Path) -> Result<(), StevedoreError> {
    if path.as_os_str().is_empty() {
        return Err(StevedoreError::Extraction(
            "archive entry has an empty path".to_string(),
        ));
    }
    for component in path.components() {
        match component {
            Component::Normal(_) | Component::CurDir => {}
            Component::ParentDir => {
                return Err(StevedoreError::Extraction(format!(
                    "archive entry `{}` traverses outside the extraction root",
                    path.display()
                )));
            }
            Component::RootDir | Component::Prefix(_) => {
                return Err(StevedoreError::Extraction(format!(
                    "archive entry `{}` has an absolute path",
                    path.display()
                )));
            }
        }
    }
    Ok(())
}
