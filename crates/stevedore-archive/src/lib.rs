// SPDX-FileCopyrightText: 2026 Stevedore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Archive validation and staged extraction for the Stevedore extension
//! manager.
//!
//! Uploaded and bundled extension packages arrive as gzip-compressed
//! tarballs. This crate validates them (path traversal, size caps, gzip
//! framing), unpacks them into self-cleaning staging directories, and lets
//! the registry promote a fully-validated tree in a single rename.

pub mod extract;
pub mod staging;

pub use extract::{is_gzip, unpack_archive, DEFAULT_MAX_ENTRY_SIZE};
pub use staging::StagingDir;
