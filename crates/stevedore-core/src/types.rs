// SPDX-FileCopyrightText: 2026 Stevedore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types used across the Stevedore workspace.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Which namespace an extension belongs to.
///
/// `Custom` extensions are uploaded by users; `Embedded` extensions ship
/// with the host or are materialized from the bundled repository.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ExtensionKind {
    Custom,
    Embedded,
}

/// A registered extension with its resolved on-disk identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    /// Unique name across both namespaces.
    pub name: String,
    /// Namespace the extension lives in.
    pub kind: ExtensionKind,
    /// Semantic version, when declared by the manifest or catalog entry.
    pub version: Option<String>,
    /// Root directory of the unpacked tree. Owned by the registry once
    /// promoted; `None` for catalog entries not yet materialized.
    pub path: Option<PathBuf>,
}

/// A listing entry: name, namespace, and version only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionSummary {
    pub name: String,
    pub kind: ExtensionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Filter for registry listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ListFilter {
    #[default]
    All,
    Custom,
    Embedded,
}

/// Severity of a validation rule violation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Blocking: the configuration must not be deployed.
    #[default]
    Error,
    /// Advisory: the configuration is usable but suspect.
    Warning,
}

/// A single violation reported by the validation pipeline.
///
/// Violations are collected, never short-circuited, so callers can report
/// them in aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Extension the violated rule belongs to.
    pub extension: String,
    /// Property the rule targets.
    pub property: String,
    pub severity: Severity,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;

    #[test]
    fn extension_kind_round_trips_as_lowercase() {
        assert_eq!(ExtensionKind::Custom.to_string(), "custom");
        assert_eq!(ExtensionKind::Embedded.to_string(), "embedded");
        assert_eq!(
            ExtensionKind::from_str("embedded").unwrap(),
            ExtensionKind::Embedded
        );

        let json = serde_json::to_string(&ExtensionKind::Custom).unwrap();
        assert_eq!(json, "\"custom\"");
    }

    #[test]
    fn list_filter_parses_query_values() {
        assert_eq!(ListFilter::from_str("custom").unwrap(), ListFilter::Custom);
        assert_eq!(ListFilter::from_str("all").unwrap(), ListFilter::All);
        assert!(ListFilter::from_str("bogus").is_err());
    }

    #[test]
    fn summary_omits_absent_version() {
        let summary = ExtensionSummary {
            name: "dummy-extension".into(),
            kind: ExtensionKind::Custom,
            version: None,
        };
        let json = serde_json::to_string(&summary).unwrap();
        assert!(!json.contains("version"));
    }
}
