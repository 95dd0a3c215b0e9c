// SPDX-FileCopyrightText: 2026 Stevedore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rule evaluation over property fragments.
//!
//! Extensions declare `[[rules]]` in their manifests; the store resolves
//! each rule against the extension's fragment and collects every violation
//! instead of stopping at the first, so callers can report in aggregate.

use serde_json::Value;

use stevedore_core::Violation;
use stevedore_registry::{PropertyRule, ValueKind};

use crate::properties::{json_kind, Properties};

/// Evaluate one extension's rules against its fragment.
pub fn check_rules(
    extension: &str,
    rules: &[PropertyRule],
    properties: &Properties,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    for rule in rules {
        let value = properties.get(&rule.property).filter(|v| !v.is_null());

        match value {
            None => {
                if rule.required {
                    violations.push(Violation {
                        extension: extension.to_string(),
                        property: rule.property.clone(),
                        severity: rule.severity,
                        message: format!("required property `{}` is missing", rule.property),
                    });
                }
            }
            Some(value) => {
                if let Some(kind) = rule.kind
                    && !kind_matches(kind, value)
                {
                    violations.push(Violation {
                        extension: extension.to_string(),
                        property: rule.property.clone(),
                        severity: rule.severity,
                        message: format!(
                            "property `{}` expected {kind}, got {}",
                            rule.property,
                            json_kind(value)
                        ),
                    });
                }

                for required in &rule.requires {
                    if properties.get(required).filter(|v| !v.is_null()).is_none() {
                        violations.push(Violation {
                            extension: extension.to_string(),
                            property: rule.property.clone(),
                            severity: rule.severity,
                            message: format!(
                                "property `{}` requires `{required}`, which is not set",
                                rule.property
                            ),
                        });
                    }
                }
            }
        }
    }

    violations
}

fn kind_matches(kind: ValueKind, value: &Value) -> bool {
    match kind {
        ValueKind::String => value.is_string(),
        ValueKind::Integer => value.is_i64() || value.is_u64(),
        ValueKind::Number => value.is_number(),
        ValueKind::Bool => value.is_boolean(),
        ValueKind::List => value.is_array(),
        ValueKind::Map => value.is_object(),
    }
}
