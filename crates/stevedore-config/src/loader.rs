// SPDX-FileCopyrightText: 2026 Stevedore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./stevedore.toml` > `~/.config/stevedore/stevedore.toml`
//! > `/etc/stevedore/stevedore.toml` with environment variable overrides via
//! the `STEVEDORE_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::Path;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::StevedoreConfig;

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/stevedore/stevedore.toml` (system-wide)
/// 3. `~/.config/stevedore/stevedore.toml` (user XDG config)
/// 4. `./stevedore.toml` (local directory)
/// 5. `STEVEDORE_*` environment variables
pub fn load_config() -> Result<StevedoreConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(StevedoreConfig::default()))
        .merge(Toml::file("/etc/stevedore/stevedore.toml"))
        .merge(Toml::file(
            dirs::config_dir()
                .map(|d| d.join("stevedore/stevedore.toml"))
                .unwrap_or_default(),
        ))
        .merge(Toml::file("stevedore.toml"))
        .merge(env_provider())
        .extract()
}

/// Load configuration from a TOML string only (no XDG lookup).
///
/// Used for testing and explicit config specification.
pub fn load_config_from_str(toml_content: &str) -> Result<StevedoreConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(StevedoreConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<StevedoreConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(StevedoreConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Create the environment variable provider using explicit `map()` for
/// section-to-dot mapping.
///
/// Uses `Env::map()` NOT `Env::split("_")` to avoid ambiguity with
/// underscore-containing key names: `STEVEDORE_PATHS_EXTENSIONS_ROOT` must
/// map to `paths.extensions_root`, not `paths.extensions.root`.
fn env_provider() -> Env {
    Env::prefixed("STEVEDORE_").map(|key| {
        // `key` is the lowercased env var name with prefix stripped.
        let key_str = key.as_str();
        let mapped = key_str
            .replacen("paths_", "paths.", 1)
            .replacen("registry_", "registry.", 1)
            .replacen("extraction_", "extraction.", 1);
        mapped.into()
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_string_yields_defaults() {
        let config = load_config_from_str("").unwrap();
        assert_eq!(config.paths.extensions_root, "extensions");
    }

    #[test]
    fn toml_string_overrides_defaults() {
        let config = load_config_from_str(
            r#"
[paths]
extensions_root = "/var/lib/stevedore/extensions"

[registry]
catalog_file = "/usr/share/stevedore/catalog.toml"
repository_path = "/usr/share/stevedore/repo"
"#,
        )
        .unwrap();
        assert_eq!(config.paths.extensions_root, "/var/lib/stevedore/extensions");
        assert_eq!(
            config.registry.catalog_file.as_deref(),
            Some("/usr/share/stevedore/catalog.toml")
        );
        // Untouched sections keep their defaults.
        assert_eq!(config.paths.artifacts_dir, "generated");
    }
}
