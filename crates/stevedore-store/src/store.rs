// SPDX-FileCopyrightText: 2026 Stevedore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The layered configuration store.
//!
//! [`ConfigStore`] reads and writes per-extension property fragments, folds
//! them into the merged view, runs the validation pipeline, and renders
//! generated artifacts. The merged view is recomputed on every read; nothing
//! is cached across requests, so listings stay honest under concurrent
//! registration and unregistration.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

use serde_json::Value;

use stevedore_config::StevedoreConfig;
use stevedore_core::{ListFilter, NotFoundKind, StevedoreError, Violation};
use stevedore_registry::{ExtensionRegistry, GenerateSpec};

use crate::properties::{read_fragment, write_fragment, Properties};
use crate::render::render_template;
use crate::validate::check_rules;

/// Store over the fragments of all registered extensions.
pub struct ConfigStore {
    registry: Arc<ExtensionRegistry>,
    artifacts_dir: PathBuf,
}

impl ConfigStore {
    pub fn new(registry: Arc<ExtensionRegistry>, artifacts_dir: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            artifacts_dir: artifacts_dir.into(),
        }
    }

    /// Build a store wired to the host configuration's artifacts directory.
    pub fn from_config(registry: Arc<ExtensionRegistry>, config: &StevedoreConfig) -> Self {
        Self::new(registry, config.paths.artifacts_dir())
    }

    /// One extension's fragment.
    ///
    /// Fails with `NotFound` if the extension is not registered or carries
    /// no fragment.
    pub async fn get_properties(&self, name: &str) -> Result<Properties, StevedoreError> {
        let extension = self.registry.resolve(name).await?;
        let dir = self
            .registry
            .layout()
            .extension_dir(extension.kind, name);
        read_fragment(&dir)
            .await?
            .ok_or_else(|| StevedoreError::not_found(NotFoundKind::Fragment, name))
    }

    /// The merged view: every registered extension's fragment under its own
    /// key, iterated in lexicographic name order.
    ///
    /// Extensions without a fragment contribute nothing. Recomputed on each
    /// call.
    pub async fn merged_view(&self) -> Result<BTreeMap<String, Properties>, StevedoreError> {
        let mut view = BTreeMap::new();
        for summary in self.registry.list(ListFilter::All, false).await? {
            let dir = self
                .registry
                .layout()
                .extension_dir(summary.kind, &summary.name);
            if let Some(properties) = read_fragment(&dir).await? {
                view.insert(summary.name, properties);
            }
        }
        Ok(view)
    }

    /// Replace the named extension's fragment on disk.
    ///
    /// A replacement, not a deep merge: the previous fragment is gone
    /// afterwards.
    pub async fn set_properties(
        &self,
        name: &str,
        properties: Properties,
    ) -> Result<(), StevedoreError> {
        let extension = self.registry.resolve(name).await?;
        let dir = self
            .registry
            .layout()
            .extension_dir(extension.kind, name);

        let _guard = self.registry.layout().lock(extension.kind).lock().await;
        write_fragment(&dir, &properties).await?;

        tracing::info!(name, properties = properties.len(), "fragment replaced");
        Ok(())
    }

    /// The value of one property in the named extension's fragment.
    ///
    /// Never searches other extensions' fragments.
    pub async fn find_property(
        &self,
        name: &str,
        property: &str,
    ) -> Result<Value, StevedoreError> {
        let properties = self.get_properties(name).await?;
        properties
            .get(property)
            .cloned()
            .ok_or_else(|| StevedoreError::not_found(NotFoundKind::Property, property))
    }

    /// Remove one property from the named extension's fragment.
    ///
    /// Idempotent: an absent property (or an absent fragment) is a no-op,
    /// not an error. The extension itself must exist.
    pub async fn remove_property(
        &self,
        name: &str,
        property: &str,
    ) -> Result<(), StevedoreError> {
        let extension = self.registry.resolve(name).await?;
        let dir = self
            .registry
            .layout()
            .extension_dir(extension.kind, name);

        let _guard = self.registry.layout().lock(extension.kind).lock().await;
        let Some(mut properties) = read_fragment(&dir).await? else {
            return Ok(());
        };
        if properties.remove(property).is_some() {
            write_fragment(&dir, &properties).await?;
            tracing::debug!(name, property, "property removed");
        }
        Ok(())
    }

    /// Run the validation pipeline over one extension or all of them.
    ///
    /// Returns every violation rather than stopping at the first; an empty
    /// list means the configuration is clean.
    pub async fn validate(
        &self,
        extension: Option<&str>,
    ) -> Result<Vec<Violation>, StevedoreError> {
        let targets: Vec<String> = match extension {
            Some(name) => vec![name.to_string()],
            None => self
                .registry
                .list(ListFilter::All, false)
                .await?
                .into_iter()
                .map(|s| s.name)
                .collect(),
        };

        let mut violations = Vec::new();
        for name in targets {
            let (extension, manifest) = self.registry.resolve_with_manifest(&name).await?;
            let dir = self
                .registry
                .layout()
                .extension_dir(extension.kind, &name);
            let properties = read_fragment(&dir).await?.unwrap_or_default();
            violations.extend(check_rules(&name, &manifest.rules, &properties));
        }
        Ok(violations)
    }

    /// Render generated artifacts for one extension or all that declare a
    /// `[generate]` section.
    ///
    /// All-or-nothing: every artifact is rendered and written to a temp file
    /// before any final artifact is replaced, so a failing render leaves
    /// previously generated output untouched. Returns the committed paths.
    pub async fn generate(
        &self,
        extension: Option<&str>,
    ) -> Result<Vec<PathBuf>, StevedoreError> {
        let targets = self.generation_targets(extension).await?;
        if targets.is_empty() {
            return Ok(Vec::new());
        }

        let merged = self.merged_view().await?;

        // Phase 1: render everything in memory. No filesystem effects yet.
        let mut rendered: Vec<(String, String)> = Vec::with_capacity(targets.len());
        let mut seen_outputs = std::collections::HashSet::new();
        for (name, dir, spec) in &targets {
            if !seen_outputs.insert(spec.output.clone()) {
                return Err(StevedoreError::Validation(format!(
                    "generated artifact `{}` is declared by more than one extension",
                    spec.output
                )));
            }

            let template_path = dir.join(&spec.template);
            let template = tokio::fs::read_to_string(&template_path)
                .await
                .map_err(|e| {
                    StevedoreError::Validation(format!(
                        "template `{}` of `{name}` is not readable: {e}",
                        template_path.display()
                    ))
                })?;
            let content = render_template(&template, name, &merged)?;
            rendered.push((spec.output.clone(), content));
        }

        // Phase 2: write temp files, then commit by rename.
        tokio::fs::create_dir_all(&self.artifacts_dir)
            .await
            .map_err(|e| {
                StevedoreError::io(
                    format!(
                        "failed to create artifacts directory `{}`",
                        self.artifacts_dir.display()
                    ),
                    e,
                )
            })?;

        let mut tmp_paths = Vec::with_capacity(rendered.len());
        for (output, content) in &rendered {
            let tmp = self.artifacts_dir.join(format!("{output}.tmp"));
            if let Err(e) = tokio::fs::write(&tmp, content.as_bytes()).await {
                cleanup_tmp_files(&tmp_paths).await;
                return Err(StevedoreError::io(
                    format!("failed to write artifact `{}`", tmp.display()),
                    e,
                ));
            }
            tmp_paths.push(tmp);
        }

        let mut committed = Vec::with_capacity(rendered.len());
        for ((output, _), tmp) in rendered.iter().zip(&tmp_paths) {
            let final_path = self.artifacts_dir.join(output);
            if let Err(e) = tokio::fs::rename(tmp, &final_path).await {
                cleanup_tmp_files(&tmp_paths).await;
                return Err(StevedoreError::io(
                    format!("failed to commit artifact `{}`", final_path.display()),
                    e,
                ));
            }
            committed.push(final_path);
        }

        tracing::info!(artifacts = committed.len(), "configuration generated");
        Ok(committed)
    }

    /// Extensions to generate for, each with its directory and spec.
    async fn generation_targets(
        &self,
        extension: Option<&str>,
    ) -> Result<Vec<(String, PathBuf, GenerateSpec)>, StevedoreError> {
        let names: Vec<String> = match extension {
            Some(name) => vec![name.to_string()],
            None => self
                .registry
                .list(ListFilter::All, false)
                .await?
                .into_iter()
                .map(|s| s.name)
                .collect(),
        };

        let mut targets = Vec::new();
        for name in names {
            let (extension, manifest) = self.registry.resolve_with_manifest(&name).await?;
            if let Some(spec) = manifest.generate {
                let dir = self
                    .registry
                    .layout()
                    .extension_dir(extension.kind, &name);
                targets.push((name, dir, spec));
            }
        }
        Ok(targets)
    }
}

async fn cleanup_tmp_files(paths: &[PathBuf]) {
    for path in paths {
        let _ = tokio::fs::remove_file(path).await;
    }
}
