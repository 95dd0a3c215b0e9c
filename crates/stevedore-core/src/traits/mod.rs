// SPDX-FileCopyrightText: 2026 Stevedore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Boundary traits implemented or consumed at the edges of the core.

pub mod engine;
pub mod repository;

pub use engine::{DeployEngine, DeployOutcome, DeployTrigger};
pub use repository::ExtensionRepository;
