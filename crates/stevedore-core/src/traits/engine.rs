// SPDX-FileCopyrightText: 2026 Stevedore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trigger/response contract for the installation workflow engine.
//!
//! The engine that runs extension install scripts consumes the resolved
//! configuration and extension list produced by this workspace. Its
//! internals live elsewhere; only the handoff is defined here.

use std::path::PathBuf;

use async_trait::async_trait;

use crate::error::StevedoreError;

/// Everything the workflow engine needs to act on one extension.
#[derive(Debug, Clone)]
pub struct DeployTrigger {
    /// Extension whose scripts should run.
    pub extension: String,
    /// The extension's resolved property fragment.
    pub properties: serde_json::Value,
    /// Generated configuration artifact, when the extension declares one.
    pub artifact: Option<PathBuf>,
}

/// Terminal outcome reported back by the workflow engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeployOutcome {
    Completed,
    Failed { message: String },
}

/// The installation workflow engine, seen from this side of the boundary.
#[async_trait]
pub trait DeployEngine: Send + Sync {
    /// Hand one extension's resolved state to the engine and wait for its
    /// terminal outcome.
    async fn trigger(&self, trigger: DeployTrigger) -> Result<DeployOutcome, StevedoreError>;
}
