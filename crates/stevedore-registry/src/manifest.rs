// SPDX-FileCopyrightText: 2026 Stevedore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Extension manifest parsing from `extension.toml` files.
//!
//! Every unpacked extension must carry a manifest at the root of its tree.
//! A directory without a parseable manifest is not a registered extension,
//! no matter what else it contains.

use std::path::Path;

use serde::{Deserialize, Serialize};

use stevedore_core::{Severity, StevedoreError};

/// Fixed relative path of the manifest inside an extension tree.
pub const MANIFEST_FILE: &str = "extension.toml";

/// Parsed extension manifest.
#[derive(Debug, Clone)]
pub struct ExtensionManifest {
    /// Name declared by the package.
    pub name: String,
    /// Semantic version string, when declared.
    pub version: Option<String>,
    /// Human-readable description.
    pub description: Option<String>,
    /// Validation rules over the extension's property fragment.
    pub rules: Vec<PropertyRule>,
    /// Templated artifact generation, when declared.
    pub generate: Option<GenerateSpec>,
}

/// Expected JSON type of a property value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    String,
    Integer,
    Number,
    Bool,
    List,
    Map,
}

impl std::fmt::Display for ValueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            ValueKind::String => "string",
            ValueKind::Integer => "integer",
            ValueKind::Number => "number",
            ValueKind::Bool => "bool",
            ValueKind::List => "list",
            ValueKind::Map => "map",
        };
        write!(f, "{s}")
    }
}

/// One declared validation rule.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PropertyRule {
    /// Property the rule targets.
    pub property: String,
    /// The property must be present and non-null.
    #[serde(default)]
    pub required: bool,
    /// Expected type, checked only when the property is present.
    #[serde(default)]
    pub kind: Option<ValueKind>,
    /// Properties that must also be present when this one is.
    #[serde(default)]
    pub requires: Vec<String>,
    /// Blocking error or advisory warning.
    #[serde(default)]
    pub severity: Severity,
}

/// Templated generation declaration.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GenerateSpec {
    /// Template file, relative to the extension directory.
    pub template: String,
    /// File name of the rendered artifact.
    pub output: String,
}

/// Intermediate TOML deserialization struct for `extension.toml`.
#[derive(Debug, Deserialize)]
struct ManifestFile {
    extension: ExtensionSection,
    #[serde(default)]
    rules: Vec<PropertyRule>,
    generate: Option<GenerateSpec>,
}

/// The `[extension]` section of an `extension.toml` file.
#[derive(Debug, Deserialize)]
struct ExtensionSection {
    name: String,
    version: Option<String>,
    description: Option<String>,
}

/// Parse an extension manifest from TOML content.
///
/// Validates that the name is non-empty and well-formed, the version (if
/// present) parses as semver, and any `[generate]` paths stay inside the
/// extension directory.
pub fn parse_manifest(toml_content: &str) -> Result<ExtensionManifest, StevedoreError> {
    let file: ManifestFile = toml::from_str(toml_content)
        .map_err(|e| StevedoreError::Validation(format!("invalid extension manifest: {e}")))?;

    let section = file.extension;

    if section.name.is_empty() {
        return Err(StevedoreError::Validation(
            "extension manifest: name must not be empty".to_string(),
        ));
    }
    if !section
        .name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(StevedoreError::Validation(format!(
            "extension manifest: name `{}` contains invalid characters \
             (only alphanumeric, hyphens, underscores allowed)",
            section.name
        )));
    }

    if let Some(version) = &section.version {
        semver::Version::parse(version).map_err(|e| {
            StevedoreError::Validation(format!(
                "extension manifest: version `{version}` is not valid semver: {e}"
            ))
        })?;
    }

    for rule in &file.rules {
        if rule.property.is_empty() {
            return Err(StevedoreError::Validation(
                "extension manifest: rule with empty property name".to_string(),
            ));
        }
    }

    if let Some(generate) = &file.generate {
        for (field, value) in [("template", &generate.template), ("output", &generate.output)] {
            if value.is_empty() {
                return Err(StevedoreError::Validation(format!(
                    "extension manifest: generate.{field} must not be empty"
                )));
            }
            let path = Path::new(value);
            if path.is_absolute() || path.components().any(|c| matches!(c, std::path::Component::ParentDir)) {
                return Err(StevedoreError::Validation(format!(
                    "extension manifest: generate.{field} `{value}` must be a relative path \
                     inside the extension directory"
                )));
            }
        }
    }

    Ok(ExtensionManifest {
        name: section.name,
        version: section.version,
        description: section.description,
        rules: file.rules,
        generate: file.generate,
    })
}

/// Load and parse the manifest from an extension directory.
///
/// A missing file and a malformed file are the same condition to callers:
/// the directory is not a valid extension.
pub fn load_manifest(extension_dir: &Path) -> Result<ExtensionManifest, StevedoreError> {
    let path = extension_dir.join(MANIFEST_FILE);
    let content = std::fs::read_to_string(&path).map_err(|e| {
        StevedoreError::Validation(format!(
            "manifest `{}` is not readable: {e}",
            path.display()
        ))
    })?;
    parse_manifest(&content)
}
