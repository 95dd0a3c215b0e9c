// SPDX-FileCopyrightText: 2026 Stevedore Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Layered property store for the Stevedore extension manager.
//!
//! Each registered extension contributes a property fragment; the store
//! merges them into one namespaced view, validates the result against the
//! rules extensions declare, and renders generated configuration artifacts
//! for the installation workflow.

pub mod properties;
pub mod render;
pub mod store;
pub mod validate;

pub use properties::{
    json_kind, parse_fragment, serialize_fragment, Properties, FRAGMENT_FILE, FRAGMENT_ROOT_KEY,
};
pub use render::render_template;
pub use store::ConfigStore;
pub use validate::check_rules;
