// SPDX-FileCopyrightText: 2026 Stevedore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Placeholder substitution for generated configuration artifacts.
//!
//! Templates reference properties as `${property}` (the rendering
//! extension's own fragment) or `${extension.property}` (any extension in
//! the merged view). An unresolvable placeholder fails the render; the
//! store's two-phase commit then leaves existing artifacts untouched.

use std::collections::BTreeMap;

use serde_json::Value;

use stevedore_core::StevedoreError;

use crate::properties::Properties;

/// Render a template against the merged view.
///
/// `extension` is the rendering extension; bare `${property}` placeholders
/// resolve inside its own fragment.
pub fn render_template(
    template: &str,
    extension: &str,
    merged: &BTreeMap<String, Properties>,
) -> Result<String, StevedoreError> {
    let mut output = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(start) = rest.find("${") {
        output.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            return Err(StevedoreError::Validation(format!(
                "unterminated placeholder in template of `{extension}`"
            )));
        };
        let token = &after[..end];
        output.push_str(&resolve(token, extension, merged)?);
        rest = &after[end + 1..];
    }
    output.push_str(rest);

    Ok(output)
}

fn resolve(
    token: &str,
    extension: &str,
    merged: &BTreeMap<String, Properties>,
) -> Result<String, StevedoreError> {
    if token.is_empty() {
        return Err(StevedoreError::Validation(format!(
            "empty placeholder in template of `{extension}`"
        )));
    }

    let (target, property) = match token.split_once('.') {
        Some((target, property)) => (target, property),
        None => (extension, token),
    };

    let value = merged
        .get(target)
        .and_then(|fragment| fragment.get(property))
        .ok_or_else(|| {
            StevedoreError::Validation(format!(
                "template of `{extension}` references `${{{token}}}`, which is not set"
            ))
        })?;

    Ok(render_value(value))
}

/// Strings render bare; everything else renders as its JSON form.
fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
