//! Resource records returned by the remote listing service

use crate::error::{InventoryError, InventoryResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Class-name marker identifying compute components
pub const COMPUTE_CLASS_MARKER: &str = ".Compute";

/// Component name holding hostname entries for sibling lookups
pub const HOSTNAME_COMPONENT: &str = "hostname";

/// Component name holding OS details for sibling lookups
pub const OS_COMPONENT: &str = "os";

/// Component name holding FQDN aliases for platform group vars
pub const FQDN_COMPONENT: &str = "fqdn";

/// An opaque remote entity: cloud, environment, platform, component,
/// compute instance, or variable
///
/// Records are immutable once returned by the client and are shared by
/// reference between the instance index and the host catalog. `ci_id` is the
/// stable key used wherever a record must key a map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceRecord {
    /// Stable numeric identity
    pub ci_id: i64,
    /// Name, unique within its listing scope
    pub ci_name: String,
    /// Structural class tag
    pub ci_class_name: String,
    /// Namespace path
    pub ns_path: String,
    /// Named attribute values; nested documents arrive as JSON-encoded strings
    #[serde(default)]
    pub attributes: BTreeMap<String, Value>,
    /// Name of the cloud the instance was deployed to, when the listing carries it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deployed_to: Option<String>,
}

impl ResourceRecord {
    /// Whether this record's class marks a compute component
    pub fn is_compute(&self) -> bool {
        self.ci_class_name.contains(COMPUTE_CLASS_MARKER)
    }

    /// Raw attribute value
    pub fn attr(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Attribute value as a string slice
    pub fn attr_str(&self, name: &str) -> Option<&str> {
        self.attr(name).and_then(Value::as_str)
    }

    /// Attribute truthiness: boolean `true` or the string `"true"`
    ///
    /// The upstream API serializes flags either way depending on the resource.
    pub fn attr_flag(&self, name: &str) -> bool {
        match self.attr(name) {
            Some(Value::Bool(flag)) => *flag,
            Some(Value::String(text)) => text.eq_ignore_ascii_case("true"),
            _ => false,
        }
    }

    /// The instance ordinal shared by sibling instances
    pub fn ordinal(&self) -> String {
        extract_ordinal(&self.ci_name)
    }
}

/// Ordinal suffix correlating sibling instances: everything from the first `-`
///
/// `compute-1111223-2` → `-1111223-2`. A name without a `-` falls back to the
/// whole name, so correlation degrades to exact-name matching instead of
/// failing.
#[must_use]
pub fn extract_ordinal(ci_name: &str) -> String {
    match ci_name.find('-') {
        Some(pos) => ci_name[pos..].to_string(),
        None => ci_name.to_string(),
    }
}

/// Typed view of the JSON-encoded `metadata` attribute carried by computes
///
/// Decoded once at catalog ingestion and cached on the host record.
/// `environment` and `platform` are required for sibling scoping; the rest
/// pass through to the host vars opaquely.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ComputeMetadata {
    pub environment: String,
    pub platform: String,
    #[serde(default)]
    pub organization: Option<Value>,
    #[serde(default)]
    pub assembly: Option<Value>,
    #[serde(default)]
    pub owner: Option<Value>,
    #[serde(default)]
    pub mgmt_url: Option<Value>,
    #[serde(default)]
    pub component: Option<Value>,
    #[serde(default)]
    pub instance: Option<Value>,
}

impl ComputeMetadata {
    /// Decode the `metadata` attribute of a compute record
    pub fn decode(record: &ResourceRecord) -> InventoryResult<Self> {
        let raw = record
            .attr_str("metadata")
            .ok_or_else(|| InventoryError::MissingAttribute {
                attribute: "metadata".to_string(),
                ci_name: record.ci_name.clone(),
            })?;
        serde_json::from_str(raw).map_err(|source| InventoryError::MalformedAttribute {
            attribute: "metadata".to_string(),
            ci_name: record.ci_name.clone(),
            source,
        })
    }
}
