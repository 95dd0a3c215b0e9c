// SPDX-FileCopyrightText: 2026 Stevedore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Stevedore extension manager.

use thiserror::Error;

use crate::types::ExtensionKind;

/// What a [`StevedoreError::NotFound`] failed to locate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotFoundKind {
    /// A registered extension directory.
    Extension,
    /// An entry in the embedded catalog.
    CatalogEntry,
    /// An extension's property fragment file.
    Fragment,
    /// A single property inside a fragment.
    Property,
}

impl std::fmt::Display for NotFoundKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotFoundKind::Extension => write!(f, "extension"),
            NotFoundKind::CatalogEntry => write!(f, "catalog entry"),
            NotFoundKind::Fragment => write!(f, "fragment"),
            NotFoundKind::Property => write!(f, "property"),
        }
    }
}

/// The primary error type used across all Stevedore crates.
///
/// Each variant is a distinguishable error kind; the HTTP layer maps kinds
/// to status codes (conflict, not-found, bad-request, server-error) without
/// inspecting message contents.
#[derive(Debug, Error)]
pub enum StevedoreError {
    /// A registration collides with a name owned by the opposite namespace.
    #[error("extension name `{name}` is already used by {namespace} extension")]
    NamingConflict {
        name: String,
        namespace: ExtensionKind,
    },

    /// A registration collides with an existing entry in the same namespace.
    #[error("extension `{name}` already registered")]
    AlreadyRegistered { name: String },

    /// An extension, catalog entry, fragment, or property is missing.
    #[error("{kind} `{name}` not found")]
    NotFound { kind: NotFoundKind, name: String },

    /// Configuration errors (invalid TOML, missing required fields, type mismatches).
    #[error("configuration error: {0}")]
    Config(String),

    /// A structural or business-rule violation (manifest, rule, or template).
    #[error("validation error: {0}")]
    Validation(String),

    /// A malformed or unsafe archive was rejected.
    #[error("extraction error: {0}")]
    Extraction(String),

    /// Filesystem failure during a write, move, or delete.
    #[error("io error: {message}")]
    Io {
        message: String,
        #[source]
        source: std::io::Error,
    },
}

impl StevedoreError {
    /// Wrap an `io::Error` with the operation that produced it.
    pub fn io(message: impl Into<String>, source: std::io::Error) -> Self {
        StevedoreError::Io {
            message: message.into(),
            source,
        }
    }

    /// Shorthand for a [`StevedoreError::NotFound`] with the given kind.
    pub fn not_found(kind: NotFoundKind, name: impl Into<String>) -> Self {
        StevedoreError::NotFound {
            kind,
            name: name.into(),
        }
    }
}
