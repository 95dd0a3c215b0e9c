// SPDX-FileCopyrightText: 2026 Stevedore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Validates semantic constraints that cannot be expressed via serde
//! attributes, such as non-empty paths and catalog/repository pairing.

use crate::diagnostic::ConfigError;
use crate::model::StevedoreConfig;

/// Validate a deserialized configuration for semantic correctness.
///
/// Returns `Ok(())` if all validations pass, or `Err(Vec<ConfigError>)` with
/// all collected validation errors (does not fail fast).
pub fn validate_config(config: &StevedoreConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    if config.paths.extensions_root.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "paths.extensions_root must not be empty".to_string(),
        });
    }

    if config.paths.artifacts_dir.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "paths.artifacts_dir must not be empty".to_string(),
        });
    }

    // A catalog without a repository (or vice versa) cannot materialize
    // anything; both must be set together.
    match (
        &config.registry.catalog_file,
        &config.registry.repository_path,
    ) {
        (Some(_), None) => errors.push(ConfigError::Validation {
            message: "registry.catalog_file is set but registry.repository_path is not"
                .to_string(),
        }),
        (None, Some(_)) => errors.push(ConfigError::Validation {
            message: "registry.repository_path is set but registry.catalog_file is not"
                .to_string(),
        }),
        _ => {}
    }

    if let Some(catalog) = &config.registry.catalog_file
        && catalog.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "registry.catalog_file must not be empty when set".to_string(),
        });
    }

    if let Some(repo) = &config.registry.repository_path
        && repo.trim().is_empty()
    {
        errors.push(ConfigError::Validation {
            message: "registry.repository_path must not be empty when set".to_string(),
        });
    }

    if config.extraction.max_entry_size == 0 {
        errors.push(ConfigError::Validation {
            message: "extraction.max_entry_size must be greater than zero".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
