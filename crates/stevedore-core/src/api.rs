// SPDX-FileCopyrightText: 2026 Stevedore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Wire shapes consumed by the HTTP layer.
//!
//! The HTTP layer itself lives outside this workspace; these types pin down
//! the JSON bodies and confirmation texts it serializes so both sides agree
//! on the boundary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::types::{ExtensionKind, ExtensionSummary};

/// Confirmation text returned after a successful registration.
pub const REGISTRATION_COMPLETE: &str = "Extension registration complete";

/// Text returned when a registration hits a same-namespace duplicate.
pub fn already_registered_message(name: &str) -> String {
    format!("Extension {name} already registered")
}

/// Text returned when a custom registration collides with an embedded name.
pub const NAME_USED_BY_EMBEDDED: &str = "Extension name is already used by embedded extension";

/// Body of `GET /extensions`: a namespaced object keyed by extension name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionsResponse {
    pub extensions: BTreeMap<String, ExtensionInfo>,
}

/// Per-extension entry inside [`ExtensionsResponse`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtensionInfo {
    #[serde(rename = "type")]
    pub kind: ExtensionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

impl From<Vec<ExtensionSummary>> for ExtensionsResponse {
    fn from(summaries: Vec<ExtensionSummary>) -> Self {
        let extensions = summaries
            .into_iter()
            .map(|s| {
                (
                    s.name,
                    ExtensionInfo {
                        kind: s.kind,
                        version: s.version,
                    },
                )
            })
            .collect();
        ExtensionsResponse { extensions }
    }
}
