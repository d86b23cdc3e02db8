//! Scoped variable overlays

use crate::resource::ResourceRecord;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Scope kind an overlay is attached to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKind {
    /// Environment-scoped (OneOps "global") variables
    Global,
    /// Platform-scoped variables
    Platform,
    /// Cloud-scoped variables
    Cloud,
}

/// Variable records grouped by their owning scope
///
/// The cloud overlay is structurally present but never populated: the remote
/// API has no way to enumerate cloud variables. Resolving it yields an empty
/// mapping, not an error.
#[derive(Debug, Default)]
pub struct VariableOverlays {
    global: HashMap<i64, Vec<Arc<ResourceRecord>>>,
    platform: HashMap<i64, Vec<Arc<ResourceRecord>>>,
    cloud: HashMap<i64, Vec<Arc<ResourceRecord>>>,
}

impl VariableOverlays {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach the global variables of an environment
    pub fn set_global(&mut self, environment: &ResourceRecord, vars: Vec<Arc<ResourceRecord>>) {
        self.global.insert(environment.ci_id, vars);
    }

    /// Attach the variables of a platform
    pub fn set_platform(&mut self, platform: &ResourceRecord, vars: Vec<Arc<ResourceRecord>>) {
        self.platform.insert(platform.ci_id, vars);
    }

    /// Surface the variables attached to a scope
    ///
    /// A variable flagged `secure` surfaces its `encrypted_value` attribute
    /// and never the plaintext `value`; decryption is the consumer's job.
    /// Unknown scopes resolve to an empty mapping.
    #[must_use]
    pub fn overlay(&self, scope: &ResourceRecord, kind: OverlayKind) -> BTreeMap<String, Value> {
        let map = match kind {
            OverlayKind::Global => &self.global,
            OverlayKind::Platform => &self.platform,
            OverlayKind::Cloud => &self.cloud,
        };
        let mut resolved = BTreeMap::new();
        for var in map.get(&scope.ci_id).map(Vec::as_slice).unwrap_or_default() {
            let attribute = if var.attr_flag("secure") {
                "encrypted_value"
            } else {
                "value"
            };
            if let Some(value) = var.attr(attribute) {
                resolved.insert(var.ci_name.clone(), value.clone());
            }
        }
        resolved
    }
}
