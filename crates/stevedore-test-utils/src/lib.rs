// SPDX-FileCopyrightText: 2026 Stevedore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test fixtures for the Stevedore workspace.
//!
//! Provides an in-memory tar.gz archive builder and a temp-directory
//! workspace harness so integration tests can exercise the registry and
//! store against real filesystem state without sharing any of it.

pub mod archive;
pub mod harness;

pub use archive::{minimal_extension_archive, ArchiveBuilder};
pub use harness::TestWorkspace;
