//! Wire types for OneOps API payloads

use ooinv_core::ResourceRecord;
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;

/// Resource payload as returned by the transition and operations APIs
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireResource {
    pub ci_id: i64,
    pub ci_name: String,
    #[serde(default)]
    pub ci_class_name: String,
    #[serde(default)]
    pub ns_path: String,
    #[serde(default)]
    pub ci_attributes: BTreeMap<String, Value>,
    /// Present on operations instances: the cloud the instance runs in
    #[serde(default)]
    pub deployed_to: Option<WireRef>,
}

/// Reference to another resource by name
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireRef {
    pub ci_name: String,
}

impl From<WireResource> for ResourceRecord {
    fn from(wire: WireResource) -> Self {
        Self {
            ci_id: wire.ci_id,
            ci_name: wire.ci_name,
            ci_class_name: wire.ci_class_name,
            ns_path: wire.ns_path,
            attributes: wire.ci_attributes,
            deployed_to: wire.deployed_to.map(|cloud| cloud.ci_name),
        }
    }
}
