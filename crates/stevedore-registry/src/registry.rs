// SPDX-FileCopyrightText: 2026 Stevedore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The extension registry.
//!
//! [`ExtensionRegistry`] owns the lifecycle of both namespaces: it registers
//! uploaded archives into `custom/`, materializes catalog entries into
//! `embedded/`, unregisters, lists, and resolves names to on-disk
//! identities. Every mutation goes through staging and a locked promotion,
//! so a failed or cancelled registration leaves no partial tree behind.

use std::path::PathBuf;
use std::sync::Arc;

use stevedore_archive::{unpack_archive, StagingDir, DEFAULT_MAX_ENTRY_SIZE};
use stevedore_config::StevedoreConfig;
use stevedore_core::{
    Extension, ExtensionKind, ExtensionRepository, ExtensionSummary, ListFilter, NotFoundKind,
    StevedoreError,
};

use crate::catalog::EmbeddedCatalog;
use crate::layout::Layout;
use crate::manifest::{load_manifest, ExtensionManifest};

/// Registry over the custom and embedded extension namespaces.
pub struct ExtensionRegistry {
    layout: Arc<Layout>,
    catalog: Option<EmbeddedCatalog>,
    repository_path: Option<PathBuf>,
    max_entry_size: u64,
}

impl ExtensionRegistry {
    /// Build a registry from the host configuration.
    ///
    /// Loads the embedded catalog when one is configured; a registry without
    /// a catalog serves the custom namespace and any already-materialized
    /// embedded extensions.
    pub fn from_config(config: &StevedoreConfig) -> Result<Self, StevedoreError> {
        let layout = Arc::new(Layout::new(config.paths.extensions_root()));

        let (catalog, repository_path) = match (
            &config.registry.catalog_file,
            &config.registry.repository_path,
        ) {
            (Some(catalog_file), Some(repository)) => (
                Some(EmbeddedCatalog::load(std::path::Path::new(catalog_file))?),
                Some(PathBuf::from(repository)),
            ),
            _ => (None, None),
        };

        Ok(Self {
            layout,
            catalog,
            repository_path,
            max_entry_size: config.extraction.max_entry_size,
        })
    }

    /// Build a registry over an explicit layout, without a catalog.
    pub fn new(layout: Arc<Layout>) -> Self {
        Self {
            layout,
            catalog: None,
            repository_path: None,
            max_entry_size: DEFAULT_MAX_ENTRY_SIZE,
        }
    }

    /// The shared filesystem layout (and its namespace locks).
    pub fn layout(&self) -> &Arc<Layout> {
        &self.layout
    }

    /// Register a user-uploaded archive under the given name.
    ///
    /// The name must be free in *both* namespaces: a collision with an
    /// embedded extension (materialized or catalog-listed) is a
    /// `NamingConflict` and the filesystem is not touched; a collision in
    /// the custom namespace is `AlreadyRegistered`.
    pub async fn register_custom(
        &self,
        name: &str,
        archive: &[u8],
    ) -> Result<Extension, StevedoreError> {
        validate_name(name)?;

        if self
            .layout
            .extension_dir(ExtensionKind::Embedded, name)
            .is_dir()
            || self
                .catalog
                .as_ref()
                .is_some_and(|c| c.lookup(name).is_some())
        {
            return Err(StevedoreError::NamingConflict {
                name: name.to_string(),
                namespace: ExtensionKind::Embedded,
            });
        }

        if self
            .layout
            .extension_dir(ExtensionKind::Custom, name)
            .is_dir()
        {
            return Err(StevedoreError::AlreadyRegistered {
                name: name.to_string(),
            });
        }

        let manifest = self
            .stage_and_promote(name, archive, ExtensionKind::Custom)
            .await?;

        Ok(Extension {
            name: name.to_string(),
            kind: ExtensionKind::Custom,
            version: manifest.version,
            path: Some(self.layout.extension_dir(ExtensionKind::Custom, name)),
        })
    }

    /// Materialize an embedded catalog entry into the embedded namespace.
    pub async fn register_embedded(&self, name: &str) -> Result<Extension, StevedoreError> {
        validate_name(name)?;

        let (catalog, repository) = self.catalog_and_repository()?;
        let entry = catalog.require(name)?;

        if self
            .layout
            .extension_dir(ExtensionKind::Custom, name)
            .is_dir()
        {
            return Err(StevedoreError::NamingConflict {
                name: name.to_string(),
                namespace: ExtensionKind::Custom,
            });
        }

        if self
            .layout
            .extension_dir(ExtensionKind::Embedded, name)
            .is_dir()
        {
            return Err(StevedoreError::AlreadyRegistered {
                name: name.to_string(),
            });
        }

        let archive_path = repository.join(entry.archive_file_name());
        let archive = tokio::fs::read(&archive_path).await.map_err(|e| {
            StevedoreError::io(
                format!(
                    "failed to read repository archive `{}`",
                    archive_path.display()
                ),
                e,
            )
        })?;

        let manifest = self
            .stage_and_promote(name, &archive, ExtensionKind::Embedded)
            .await?;

        Ok(Extension {
            name: name.to_string(),
            kind: ExtensionKind::Embedded,
            version: entry.version.clone().or(manifest.version),
            path: Some(self.layout.extension_dir(ExtensionKind::Embedded, name)),
        })
    }

    /// Materialize every catalog entry not yet present on disk.
    ///
    /// Run at host startup. Entries that are already materialized are
    /// skipped; a custom extension squatting on a catalog name is skipped
    /// with a warning rather than failing the whole boot.
    pub async fn register_all_embedded(&self) -> Result<Vec<Extension>, StevedoreError> {
        let Some(catalog) = self.catalog.as_ref() else {
            return Ok(Vec::new());
        };

        let mut registered = Vec::new();
        for entry in catalog.entries() {
            if self
                .layout
                .extension_dir(ExtensionKind::Embedded, &entry.name)
                .is_dir()
            {
                continue;
            }
            if self
                .layout
                .extension_dir(ExtensionKind::Custom, &entry.name)
                .is_dir()
            {
                tracing::warn!(
                    name = %entry.name,
                    "catalog entry shadowed by a custom extension; skipping"
                );
                continue;
            }
            registered.push(self.register_embedded(&entry.name).await?);
        }
        Ok(registered)
    }

    /// Unregister a custom extension, removing its entire directory tree.
    ///
    /// Embedded extensions are not unregisterable through this path.
    pub async fn unregister(&self, name: &str) -> Result<(), StevedoreError> {
        self.layout.remove(ExtensionKind::Custom, name).await
    }

    /// List registered extensions, ordered by name.
    ///
    /// Directories without a parseable manifest are excluded (but left on
    /// disk). With `catalog_mode`, embedded catalog entries not yet
    /// materialized are included with name and version only.
    pub async fn list(
        &self,
        filter: ListFilter,
        catalog_mode: bool,
    ) -> Result<Vec<ExtensionSummary>, StevedoreError> {
        let mut extensions = std::collections::BTreeMap::new();

        for kind in [ExtensionKind::Custom, ExtensionKind::Embedded] {
            if !filter_matches(filter, kind) {
                continue;
            }
            for name in self.layout.enumerate(kind).await? {
                let dir = self.layout.extension_dir(kind, &name);
                match load_manifest(&dir) {
                    Ok(manifest) => {
                        extensions.insert(
                            name.clone(),
                            ExtensionSummary {
                                name,
                                kind,
                                version: manifest.version,
                            },
                        );
                    }
                    Err(e) => {
                        tracing::debug!(name = %name, kind = %kind, error = %e, "skipping invalid extension directory");
                    }
                }
            }
        }

        if catalog_mode && filter_matches(filter, ExtensionKind::Embedded) {
            if let Some(catalog) = self.catalog.as_ref() {
                for entry in catalog.entries() {
                    extensions
                        .entry(entry.name.clone())
                        .or_insert_with(|| ExtensionSummary {
                            name: entry.name.clone(),
                            kind: ExtensionKind::Embedded,
                            version: entry.version.clone(),
                        });
                }
            }
        }

        Ok(extensions.into_values().collect())
    }

    /// Resolve a name to its on-disk identity, custom namespace first.
    pub async fn resolve(&self, name: &str) -> Result<Extension, StevedoreError> {
        Ok(self.resolve_with_manifest(name).await?.0)
    }

    /// Resolve a name and return its manifest alongside.
    pub async fn resolve_with_manifest(
        &self,
        name: &str,
    ) -> Result<(Extension, ExtensionManifest), StevedoreError> {
        for kind in [ExtensionKind::Custom, ExtensionKind::Embedded] {
            let dir = self.layout.extension_dir(kind, name);
            if !dir.is_dir() {
                continue;
            }
            // A directory without a valid manifest is not registered.
            let manifest = load_manifest(&dir)
                .map_err(|_| StevedoreError::not_found(NotFoundKind::Extension, name))?;
            let extension = Extension {
                name: name.to_string(),
                kind,
                version: manifest.version.clone(),
                path: Some(dir),
            };
            return Ok((extension, manifest));
        }
        Err(StevedoreError::not_found(NotFoundKind::Extension, name))
    }

    /// Unpack into staging, check the manifest, and promote under the
    /// namespace lock. The staging guard rolls everything back on error.
    async fn stage_and_promote(
        &self,
        name: &str,
        archive: &[u8],
        kind: ExtensionKind,
    ) -> Result<ExtensionManifest, StevedoreError> {
        let staging = StagingDir::create(&self.layout.staging_root())?;

        unpack_archive(archive, staging.path(), self.max_entry_size)?;
        let manifest = load_manifest(staging.path())?;
        if manifest.name != name {
            tracing::debug!(
                declared = %name,
                manifest = %manifest.name,
                "registration name differs from manifest name"
            );
        }

        self.layout.promote(staging.path(), kind, name).await?;
        staging.disarm();

        tracing::info!(name, kind = %kind, "extension registered");
        Ok(manifest)
    }

    fn catalog_and_repository(
        &self,
    ) -> Result<(&EmbeddedCatalog, &PathBuf), StevedoreError> {
        match (&self.catalog, &self.repository_path) {
            (Some(catalog), Some(repository)) => Ok((catalog, repository)),
            _ => Err(StevedoreError::Config(
                "no embedded catalog or repository configured".to_string(),
            )),
        }
    }
}

fn filter_matches(filter: ListFilter, kind: ExtensionKind) -> bool {
    match filter {
        ListFilter::All => true,
        ListFilter::Custom => kind == ExtensionKind::Custom,
        ListFilter::Embedded => kind == ExtensionKind::Embedded,
    }
}

/// Registration names share the manifest's naming rules.
fn validate_name(name: &str) -> Result<(), StevedoreError> {
    if name.is_empty() {
        return Err(StevedoreError::Validation(
            "extension name must not be empty".to_string(),
        ));
    }
    if !name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-' || c == '_')
    {
        return Err(StevedoreError::Validation(format!(
            "extension name `{name}` contains invalid characters \
             (only alphanumeric, hyphens, underscores allowed)"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use stevedore_test_utils::{ArchiveBuilder, TestWorkspace};

    fn dummy_archive(name: &str) -> Vec<u8> {
        ArchiveBuilder::new()
            .manifest(&format!("[extension]\nname = \"{name}\"\n"))
            .script("scripts/success.sh", "#!/bin/sh\nexit 0\n")
            .build()
    }

    #[tokio::test]
    async fn register_custom_unpacks_into_namespace() {
        let ws = TestWorkspace::new();
        let registry = ExtensionRegistry::from_config(&ws.config).unwrap();

        let extension = registry
            .register_custom("dummy-extension", &dummy_archive("dummy-extension"))
            .await
            .unwrap();

        assert_eq!(extension.kind, ExtensionKind::Custom);
        let dir = ws.extensions_root().join("custom/dummy-extension");
        assert!(dir.join("extension.toml").exists());
        assert!(dir.join("scripts/success.sh").exists());
    }

    #[tokio::test]
    async fn register_twice_is_already_registered() {
        let ws = TestWorkspace::new();
        let registry = ExtensionRegistry::from_config(&ws.config).unwrap();
        let archive = dummy_archive("dummy-extension");

        registry
            .register_custom("dummy-extension", &archive)
            .await
            .unwrap();
        let before = std::fs::read_to_string(
            ws.extensions_root()
                .join("custom/dummy-extension/extension.toml"),
        )
        .unwrap();

        let err = registry
            .register_custom("dummy-extension", &archive)
            .await
            .unwrap_err();
        assert!(matches!(err, StevedoreError::AlreadyRegistered { .. }));

        // First copy untouched.
        let after = std::fs::read_to_string(
            ws.extensions_root()
                .join("custom/dummy-extension/extension.toml"),
        )
        .unwrap();
        assert_eq!(before, after);
    }

    #[tokio::test]
    async fn custom_name_colliding_with_catalog_is_conflict() {
        let ws = TestWorkspace::new().with_catalog(&[("ext-template", None)]);
        let registry = ExtensionRegistry::from_config(&ws.config).unwrap();

        let err = registry
            .register_custom("ext-template", &dummy_archive("ext-template"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            StevedoreError::NamingConflict {
                namespace: ExtensionKind::Embedded,
                ..
            }
        ));
        // No directory was created.
        assert!(!ws.extensions_root().join("custom/ext-template").exists());
    }

    #[tokio::test]
    async fn invalid_archive_leaves_no_partial_tree() {
        let ws = TestWorkspace::new();
        let registry = ExtensionRegistry::from_config(&ws.config).unwrap();

        // Archive without a manifest.
        let archive = ArchiveBuilder::new()
            .file("README.md", "no manifest here")
            .build();

        let err = registry
            .register_custom("broken", &archive)
            .await
            .unwrap_err();
        assert!(matches!(err, StevedoreError::Validation(_)));

        assert!(!ws.extensions_root().join("custom/broken").exists());
        // Staging rolled back too.
        let staging = ws.extensions_root().join(".staging");
        if staging.exists() {
            assert!(std::fs::read_dir(&staging).unwrap().next().is_none());
        }
    }

    #[tokio::test]
    async fn register_embedded_materializes_from_repository() {
        let ws = TestWorkspace::new().with_catalog(&[("ext-template", None)]);
        ws.add_repo_archive("ext-template.tar.gz", &dummy_archive("ext-template"));
        let registry = ExtensionRegistry::from_config(&ws.config).unwrap();

        let extension = registry.register_embedded("ext-template").await.unwrap();
        assert_eq!(extension.kind, ExtensionKind::Embedded);
        assert!(ws
            .extensions_root()
            .join("embedded/ext-template/extension.toml")
            .exists());
    }

    #[tokio::test]
    async fn register_embedded_versioned_entry_resolves_versioned_archive() {
        let ws = TestWorkspace::new().with_catalog(&[("ext-template-v", Some("1.0.0"))]);
        ws.add_repo_archive(
            "ext-template-v-1.0.0.tar.gz",
            &dummy_archive("ext-template-v"),
        );
        let registry = ExtensionRegistry::from_config(&ws.config).unwrap();

        let extension = registry.register_embedded("ext-template-v").await.unwrap();
        assert_eq!(extension.version.as_deref(), Some("1.0.0"));
    }

    #[tokio::test]
    async fn register_embedded_unknown_entry_is_not_found() {
        let ws = TestWorkspace::new().with_catalog(&[("ext-template", None)]);
        let registry = ExtensionRegistry::from_config(&ws.config).unwrap();

        let err = registry.register_embedded("ext-unknown").await.unwrap_err();
        assert!(matches!(
            err,
            StevedoreError::NotFound {
                kind: NotFoundKind::CatalogEntry,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn register_all_embedded_skips_materialized_entries() {
        let ws = TestWorkspace::new()
            .with_catalog(&[("ext-a", None), ("ext-b", None)]);
        ws.add_repo_archive("ext-a.tar.gz", &dummy_archive("ext-a"));
        ws.add_repo_archive("ext-b.tar.gz", &dummy_archive("ext-b"));
        let registry = ExtensionRegistry::from_config(&ws.config).unwrap();

        let first = registry.register_all_embedded().await.unwrap();
        assert_eq!(first.len(), 2);

        // Second run is a no-op, not an error.
        let second = registry.register_all_embedded().await.unwrap();
        assert!(second.is_empty());
    }

    #[tokio::test]
    async fn unregister_removes_only_the_named_extension() {
        let ws = TestWorkspace::new();
        let registry = ExtensionRegistry::from_config(&ws.config).unwrap();

        registry
            .register_custom("dummy-extension", &dummy_archive("dummy-extension"))
            .await
            .unwrap();
        registry
            .register_custom("dummy-extension2", &dummy_archive("dummy-extension2"))
            .await
            .unwrap();

        registry.unregister("dummy-extension").await.unwrap();

        let names: Vec<String> = registry
            .list(ListFilter::All, false)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["dummy-extension2"]);
        assert!(ws
            .extensions_root()
            .join("custom/dummy-extension2/extension.toml")
            .exists());
    }

    #[tokio::test]
    async fn unregister_missing_extension_is_not_found() {
        let ws = TestWorkspace::new();
        let registry = ExtensionRegistry::from_config(&ws.config).unwrap();

        let err = registry.unregister("ghost").await.unwrap_err();
        assert!(matches!(err, StevedoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn list_filters_by_namespace_and_sorts_by_name() {
        let ws = TestWorkspace::new().with_catalog(&[("ext-embedded", None)]);
        ws.add_repo_archive("ext-embedded.tar.gz", &dummy_archive("ext-embedded"));
        let registry = ExtensionRegistry::from_config(&ws.config).unwrap();

        registry
            .register_custom("zeta", &dummy_archive("zeta"))
            .await
            .unwrap();
        registry
            .register_custom("alpha", &dummy_archive("alpha"))
            .await
            .unwrap();
        registry.register_embedded("ext-embedded").await.unwrap();

        let all = registry.list(ListFilter::All, false).await.unwrap();
        let names: Vec<&str> = all.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["alpha", "ext-embedded", "zeta"]);

        let custom = registry.list(ListFilter::Custom, false).await.unwrap();
        assert!(custom.iter().all(|s| s.kind == ExtensionKind::Custom));
        assert_eq!(custom.len(), 2);

        let embedded = registry.list(ListFilter::Embedded, false).await.unwrap();
        assert_eq!(embedded.len(), 1);
        assert_eq!(embedded[0].name, "ext-embedded");
    }

    #[tokio::test]
    async fn list_catalog_mode_surfaces_unmaterialized_entries() {
        let ws = TestWorkspace::new()
            .with_catalog(&[("ext-template", None), ("ext-template-v", Some("1.0.0"))]);
        let registry = ExtensionRegistry::from_config(&ws.config).unwrap();

        let without = registry.list(ListFilter::Embedded, false).await.unwrap();
        assert!(without.is_empty());

        let with = registry.list(ListFilter::Embedded, true).await.unwrap();
        let names: Vec<&str> = with.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["ext-template", "ext-template-v"]);
        assert_eq!(with[1].version.as_deref(), Some("1.0.0"));
    }

    #[tokio::test]
    async fn list_skips_directories_without_manifest() {
        let ws = TestWorkspace::new();
        let registry = ExtensionRegistry::from_config(&ws.config).unwrap();

        registry
            .register_custom("valid", &dummy_archive("valid"))
            .await
            .unwrap();
        // A bare directory with no manifest.
        std::fs::create_dir_all(ws.extensions_root().join("custom/no-manifest")).unwrap();

        let all = registry.list(ListFilter::All, false).await.unwrap();
        let names: Vec<&str> = all.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["valid"]);

        // Excluded, not deleted.
        assert!(ws.extensions_root().join("custom/no-manifest").is_dir());
    }

    #[tokio::test]
    async fn resolve_prefers_custom_and_fails_on_unknown() {
        let ws = TestWorkspace::new();
        let registry = ExtensionRegistry::from_config(&ws.config).unwrap();

        registry
            .register_custom("known", &dummy_archive("known"))
            .await
            .unwrap();

        let extension = registry.resolve("known").await.unwrap();
        assert_eq!(extension.kind, ExtensionKind::Custom);
        assert!(extension.path.unwrap().ends_with("custom/known"));

        let err = registry.resolve("unknown").await.unwrap_err();
        assert!(matches!(err, StevedoreError::NotFound { .. }));
    }

    #[tokio::test]
    async fn concurrent_register_and_unregister_do_not_corrupt() {
        let ws = TestWorkspace::new();
        let registry = Arc::new(ExtensionRegistry::from_config(&ws.config).unwrap());

        registry
            .register_custom("contended", &dummy_archive("contended"))
            .await
            .unwrap();

        let r1 = Arc::clone(&registry);
        let r2 = Arc::clone(&registry);
        let unregister = tokio::spawn(async move { r1.unregister("contended").await });
        let register = tokio::spawn(async move {
            r2.register_custom("contended", &dummy_archive("contended"))
                .await
        });

        let (unregistered, registered) = (unregister.await.unwrap(), register.await.unwrap());
        // Whatever the interleaving, the end state is coherent: either the
        // re-registration won and the directory is complete, or it lost the
        // race and the directory is gone.
        let dir = ws.extensions_root().join("custom/contended");
        match registered {
            Ok(_) => assert!(dir.join("extension.toml").exists()),
            Err(_) => assert!(!dir.exists()),
        }
        assert!(unregistered.is_ok());
    }
}
