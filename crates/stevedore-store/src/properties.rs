// SPDX-FileCopyrightText: 2026 Stevedore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Property fragment files.
//!
//! Each extension may carry a `config.json` at the root of its directory,
//! holding its property fragment under the fixed `"config"` key:
//!
//! ```json
//! { "config": { "subnet": "192.168.100.0/24", "replicas": 3 } }
//! ```
//!
//! Values are arbitrary JSON: string-typed at the boundary but able to hold
//! structured data. A `BTreeMap` keeps property order deterministic.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use stevedore_core::StevedoreError;

/// Fixed file name of an extension's property fragment.
pub const FRAGMENT_FILE: &str = "config.json";

/// Fixed root key the fragment lives under.
pub const FRAGMENT_ROOT_KEY: &str = "config";

/// One extension's property mapping.
pub type Properties = BTreeMap<String, Value>;

#[derive(Debug, Serialize, Deserialize)]
struct FragmentFile {
    config: Properties,
}

/// Parse a fragment document, requiring the root key.
pub fn parse_fragment(content: &str) -> Result<Properties, StevedoreError> {
    let file: FragmentFile = serde_json::from_str(content).map_err(|e| {
        StevedoreError::Validation(format!(
            "fragment is not valid JSON rooted at `{FRAGMENT_ROOT_KEY}`: {e}"
        ))
    })?;
    Ok(file.config)
}

/// Serialize a fragment document under the root key.
pub fn serialize_fragment(properties: &Properties) -> Result<String, StevedoreError> {
    let file = FragmentFile {
        config: properties.clone(),
    };
    serde_json::to_string_pretty(&file)
        .map_err(|e| StevedoreError::Validation(format!("failed to serialize fragment: {e}")))
}

/// Read an extension directory's fragment, `None` when the file is absent.
pub async fn read_fragment(
    extension_dir: &Path,
) -> Result<Option<Properties>, StevedoreError> {
    let path = extension_dir.join(FRAGMENT_FILE);
    let content = match tokio::fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(StevedoreError::io(
                format!("failed to read fragment `{}`", path.display()),
                e,
            ))
        }
    };
    parse_fragment(&content).map(Some)
}

/// Replace an extension directory's fragment atomically.
///
/// Writes to a sibling temp file and renames over the target, so a reader
/// never observes a half-written fragment. Callers hold the namespace lock.
pub async fn write_fragment(
    extension_dir: &Path,
    properties: &Properties,
) -> Result<(), StevedoreError> {
    let content = serialize_fragment(properties)?;
    let path = extension_dir.join(FRAGMENT_FILE);
    let tmp = extension_dir.join(format!("{FRAGMENT_FILE}.tmp"));

    tokio::fs::write(&tmp, content.as_bytes())
        .await
        .map_err(|e| {
            StevedoreError::io(format!("failed to write fragment `{}`", tmp.display()), e)
        })?;
    tokio::fs::rename(&tmp, &path).await.map_err(|e| {
        StevedoreError::io(format!("failed to replace fragment `{}`", path.display()), e)
    })?;
    Ok(())
}

/// Name of a JSON value's type, for rule-violation messages.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "map",
    }
}
