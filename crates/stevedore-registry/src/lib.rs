// SPDX-FileCopyrightText: 2026 Stevedore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Extension registry for the Stevedore extension manager.
//!
//! Provides manifest parsing, the embedded catalog, the filesystem layout
//! of the `custom/` and `embedded/` namespaces, and the registry that moves
//! extensions through their lifecycle: staged, registered, unregistered.

pub mod catalog;
pub mod layout;
pub mod manifest;
pub mod registry;

pub use catalog::{CatalogEntry, EmbeddedCatalog};
pub use layout::{Layout, CUSTOM_DIR, EMBEDDED_DIR, STAGING_DIR};
pub use manifest::{
    load_manifest, parse_manifest, ExtensionManifest, GenerateSpec, PropertyRule, ValueKind,
    MANIFEST_FILE,
};
pub use registry::ExtensionRegistry;
