// SPDX-FileCopyrightText: 2026 Stevedore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end lifecycle tests: registration through configuration to the
//! workflow-engine handoff.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tokio::sync::Mutex;

use stevedore_core::api::{already_registered_message, ExtensionsResponse, REGISTRATION_COMPLETE};
use stevedore_core::{
    DeployEngine, DeployOutcome, DeployTrigger, ExtensionKind, ListFilter, StevedoreError,
};
use stevedore_registry::ExtensionRegistry;
use stevedore_store::{ConfigStore, Properties};
use stevedore_test_utils::{minimal_extension_archive, ArchiveBuilder, TestWorkspace};

/// Records every trigger it receives and reports success.
struct RecordingEngine {
    triggers: Mutex<Vec<DeployTrigger>>,
}

impl RecordingEngine {
    fn new() -> Self {
        Self {
            triggers: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl DeployEngine for RecordingEngine {
    async fn trigger(&self, trigger: DeployTrigger) -> Result<DeployOutcome, StevedoreError> {
        self.triggers.lock().await.push(trigger);
        Ok(DeployOutcome::Completed)
    }
}

#[tokio::test]
async fn dummy_extension_scenario() {
    let ws = TestWorkspace::new();
    let registry = Arc::new(ExtensionRegistry::from_config(&ws.config).unwrap());

    let archive = minimal_extension_archive("dummy-extension");

    // Fresh registration succeeds; this is where the HTTP layer would
    // answer with the completion text.
    registry
        .register_custom("dummy-extension", &archive)
        .await
        .unwrap();
    assert_eq!(REGISTRATION_COMPLETE, "Extension registration complete");

    let manifest_path = ws
        .extensions_root()
        .join("custom/dummy-extension/extension.toml");
    assert!(manifest_path.exists());
    assert!(ws
        .extensions_root()
        .join("custom/dummy-extension/scripts/success.sh")
        .exists());

    // Re-registering the same name is the duplicate error the HTTP layer
    // renders as "Extension dummy-extension already registered".
    let err = registry
        .register_custom("dummy-extension", &archive)
        .await
        .unwrap_err();
    assert!(matches!(err, StevedoreError::AlreadyRegistered { .. }));
    assert_eq!(
        already_registered_message("dummy-extension"),
        "Extension dummy-extension already registered"
    );

    // filter=custom returns exactly one entry of type custom.
    let custom = registry.list(ListFilter::Custom, false).await.unwrap();
    assert_eq!(custom.len(), 1);
    assert_eq!(custom[0].name, "dummy-extension");
    assert_eq!(custom[0].kind, ExtensionKind::Custom);

    // The listing serializes into the namespaced wire shape.
    let response: ExtensionsResponse = custom.into();
    let body = serde_json::to_value(&response).unwrap();
    assert_eq!(body["extensions"]["dummy-extension"]["type"], "custom");
}

#[tokio::test]
async fn configure_validate_generate_and_hand_off() {
    let ws = TestWorkspace::new();
    let registry = Arc::new(ExtensionRegistry::from_config(&ws.config).unwrap());
    let store = ConfigStore::from_config(Arc::clone(&registry), &ws.config);

    let archive = ArchiveBuilder::new()
        .manifest(
            r#"
[extension]
name = "cluster-net"
version = "1.2.0"

[[rules]]
property = "subnet"
required = true
kind = "string"

[generate]
template = "templates/net.tmpl"
output = "cluster-net.conf"
"#,
        )
        .file("templates/net.tmpl", "subnet = ${subnet}\n")
        .script("scripts/install.sh", "#!/bin/sh\nexit 0\n")
        .build();
    registry
        .register_custom("cluster-net", &archive)
        .await
        .unwrap();

    // Validation flags the missing required property first.
    let violations = store.validate(None).await.unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].property, "subnet");

    // Configure, revalidate, generate.
    let mut properties = Properties::new();
    properties.insert("subnet".into(), json!("192.168.100.0/24"));
    store
        .set_properties("cluster-net", properties)
        .await
        .unwrap();
    assert!(store.validate(None).await.unwrap().is_empty());

    let artifacts = store.generate(Some("cluster-net")).await.unwrap();
    assert_eq!(artifacts.len(), 1);
    let content = std::fs::read_to_string(&artifacts[0]).unwrap();
    assert_eq!(content, "subnet = 192.168.100.0/24\n");

    // Hand the resolved state to the workflow engine.
    let engine = RecordingEngine::new();
    let fragment = store.get_properties("cluster-net").await.unwrap();
    let outcome = engine
        .trigger(DeployTrigger {
            extension: "cluster-net".to_string(),
            properties: serde_json::to_value(&fragment).unwrap(),
            artifact: Some(artifacts[0].clone()),
        })
        .await
        .unwrap();
    assert_eq!(outcome, DeployOutcome::Completed);

    let triggers = engine.triggers.lock().await;
    assert_eq!(triggers.len(), 1);
    assert_eq!(triggers[0].extension, "cluster-net");
    assert_eq!(triggers[0].properties["subnet"], json!("192.168.100.0/24"));
}

#[tokio::test]
async fn unregister_drops_the_extension_from_every_view() {
    let ws = TestWorkspace::new();
    let registry = Arc::new(ExtensionRegistry::from_config(&ws.config).unwrap());
    let store = ConfigStore::from_config(Arc::clone(&registry), &ws.config);

    registry
        .register_custom("doomed", &minimal_extension_archive("doomed"))
        .await
        .unwrap();
    registry
        .register_custom("doomed2", &minimal_extension_archive("doomed2"))
        .await
        .unwrap();

    let mut properties = Properties::new();
    properties.insert("key".into(), json!("value"));
    store.set_properties("doomed", properties).await.unwrap();

    registry.unregister("doomed").await.unwrap();

    // Gone from listing, resolution, and the merged view; the similarly
    // named sibling survives with its files.
    let names: Vec<String> = registry
        .list(ListFilter::All, false)
        .await
        .unwrap()
        .into_iter()
        .map(|s| s.name)
        .collect();
    assert_eq!(names, vec!["doomed2"]);
    assert!(matches!(
        registry.resolve("doomed").await.unwrap_err(),
        StevedoreError::NotFound { .. }
    ));
    assert!(store.merged_view().await.unwrap().is_empty());
    assert!(ws
        .extensions_root()
        .join("custom/doomed2/extension.toml")
        .exists());

    // A second unregister is the not-found the HTTP layer maps to 404/500.
    assert!(matches!(
        registry.unregister("doomed").await.unwrap_err(),
        StevedoreError::NotFound { .. }
    ));
}

#[tokio::test]
async fn cross_namespace_conflicts_are_symmetric() {
    let ws = TestWorkspace::new().with_catalog(&[("ext-template", None)]);
    ws.add_repo_archive(
        "ext-template.tar.gz",
        &minimal_extension_archive("ext-template"),
    );
    let registry = Arc::new(ExtensionRegistry::from_config(&ws.config).unwrap());

    // Custom registration of a catalog-owned name fails before touching disk.
    let err = registry
        .register_custom("ext-template", &minimal_extension_archive("ext-template"))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        StevedoreError::NamingConflict {
            namespace: ExtensionKind::Embedded,
            ..
        }
    ));

    // Embedded materialization of a custom-owned name fails the same way.
    // Such a state predates the catalog entry, so plant the custom tree
    // directly on disk.
    let squatter = ws.extensions_root().join("custom/ext-template");
    std::fs::create_dir_all(&squatter).unwrap();
    std::fs::write(
        squatter.join("extension.toml"),
        "[extension]\nname = \"ext-template\"\n",
    )
    .unwrap();

    let err = registry.register_embedded("ext-template").await.unwrap_err();
    assert!(matches!(
        err,
        StevedoreError::NamingConflict {
            namespace: ExtensionKind::Custom,
            ..
        }
    ));
    assert!(!ws.extensions_root().join("embedded/ext-template").exists());

    // Catalog mode lists the entry once, under the namespace that owns it.
    let summaries = registry.list(ListFilter::All, true).await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].name, "ext-template");
    assert_eq!(summaries[0].kind, ExtensionKind::Custom);
}
