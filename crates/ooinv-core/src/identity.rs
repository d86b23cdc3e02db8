//! Host identity resolution

use crate::catalog::HostRecord;
use crate::error::{InventoryError, InventoryResult};
use crate::index::InstanceIndex;
use crate::resource::{ResourceRecord, HOSTNAME_COMPONENT};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::net::Ipv4Addr;
use std::str::FromStr;

/// Strategy for deriving the externally visible host identifier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum HostMethod {
    /// The compute's `public_ip` attribute
    #[default]
    PublicIp,
    /// The compute's `private_ip` attribute
    PrivateIp,
    /// The first hostname of the compute's hostname sibling
    Hostname,
}

impl fmt::Display for HostMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PublicIp => write!(f, "public_ip"),
            Self::PrivateIp => write!(f, "private_ip"),
            Self::Hostname => write!(f, "hostname"),
        }
    }
}

impl FromStr for HostMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "public_ip" => Ok(Self::PublicIp),
            "private_ip" => Ok(Self::PrivateIp),
            "hostname" => Ok(Self::Hostname),
            _ => Err(format!("invalid host method: {s}")),
        }
    }
}

/// Resolve the identity for one host under the given method
///
/// `Ok(None)` means the method cannot produce an identifier for this host
/// (missing address attribute, no hostname sibling, or every candidate
/// filtered); such hosts are omitted from the views. The hostname method
/// errors when the design declares no hostname component in the host's
/// scope, which no record can repair.
///
/// Resolution is a pure function of (record, method, index): identical
/// inputs always yield the identical identifier.
pub fn resolve_host_id(
    host: &HostRecord,
    method: HostMethod,
    index: &InstanceIndex,
) -> InventoryResult<Option<String>> {
    match method {
        HostMethod::PublicIp => Ok(host.compute.attr_str("public_ip").map(str::to_owned)),
        HostMethod::PrivateIp => Ok(host.compute.attr_str("private_ip").map(str::to_owned)),
        HostMethod::Hostname => {
            let environment = &host.metadata.environment;
            let platform = &host.metadata.platform;
            if !index.has_component(environment, platform, HOSTNAME_COMPONENT) {
                return Err(InventoryError::HostnameComponentMissing {
                    environment: environment.clone(),
                    platform: platform.clone(),
                });
            }
            match index.sibling(environment, platform, HOSTNAME_COMPONENT, &host.compute.ordinal())
            {
                Some(sibling) => Ok(hostname_entries(sibling)?.into_iter().next()),
                None => Ok(None),
            }
        }
    }
}

/// Full hostname candidate set from the host's hostname sibling
///
/// `Ok(None)` when the scope has no hostname component or no sibling shares
/// the ordinal; unlike identity resolution, an absent component is not an
/// error here because the host vars merely omit the field.
pub fn sibling_hostnames(
    host: &HostRecord,
    index: &InstanceIndex,
) -> InventoryResult<Option<Vec<String>>> {
    let environment = &host.metadata.environment;
    let platform = &host.metadata.platform;
    if !index.has_component(environment, platform, HOSTNAME_COMPONENT) {
        return Ok(None);
    }
    match index.sibling(environment, platform, HOSTNAME_COMPONENT, &host.compute.ordinal()) {
        Some(sibling) => Ok(Some(hostname_entries(sibling)?)),
        None => Ok(None),
    }
}

/// Decode a hostname sibling's `entries` attribute into candidate names
///
/// Entry keys are candidate hostnames, except that the upstream system also
/// reports each IP as if it were a hostname; dotted-quad keys are excluded.
/// Candidates come back sorted so the selection is reproducible.
fn hostname_entries(sibling: &ResourceRecord) -> InventoryResult<Vec<String>> {
    let raw = sibling
        .attr_str("entries")
        .ok_or_else(|| InventoryError::MissingAttribute {
            attribute: "entries".to_string(),
            ci_name: sibling.ci_name.clone(),
        })?;
    let entries: BTreeMap<String, Value> =
        serde_json::from_str(raw).map_err(|source| InventoryError::MalformedAttribute {
            attribute: "entries".to_string(),
            ci_name: sibling.ci_name.clone(),
            source,
        })?;
    Ok(entries
        .into_keys()
        .filter(|name| !is_ipv4(name))
        .collect())
}

/// An IPv4 dotted-quad must never surface as a hostname
fn is_ipv4(name: &str) -> bool {
    name.parse::<Ipv4Addr>().is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{compute_instance, host_record, hostname_instance};
    use std::sync::Arc;

    fn indexed(entries: &str) -> InstanceIndex {
        let mut index = InstanceIndex::new();
        index.insert_instances(
            "prod",
            "web",
            "hostname",
            &[Arc::new(hostname_instance(51, "hostname-100-1", entries))],
        );
        index
    }

    #[test]
    fn test_host_method_round_trips_names() {
        for name in ["public_ip", "private_ip", "hostname"] {
            let method: HostMethod = name.parse().unwrap();
            assert_eq!(method.to_string(), name);
        }
        assert!("junk".parse::<HostMethod>().is_err());
    }

    #[test]
    fn test_address_methods_read_attributes_directly() {
        let host = host_record(compute_instance(41, "compute-100-1", "prod", "web"));
        let index = InstanceIndex::new();
        assert_eq!(
            resolve_host_id(&host, HostMethod::PublicIp, &index).unwrap(),
            Some("1.2.3.4".to_string())
        );
        assert_eq!(
            resolve_host_id(&host, HostMethod::PrivateIp, &index).unwrap(),
            Some("10.0.0.1".to_string())
        );
    }

    #[test]
    fn test_hostname_method_excludes_ipv4_entries() {
        let host = host_record(compute_instance(41, "compute-100-1", "prod", "web"));
        let index = indexed(r#"{"10.0.0.5": {}, "web01.example.com": {}}"#);
        assert_eq!(
            resolve_host_id(&host, HostMethod::Hostname, &index).unwrap(),
            Some("web01.example.com".to_string())
        );
    }

    #[test]
    fn test_hostname_method_is_deterministic() {
        let host = host_record(compute_instance(41, "compute-100-1", "prod", "web"));
        let index = indexed(r#"{"zz.example.com": {}, "aa.example.com": {}}"#);
        let first = resolve_host_id(&host, HostMethod::Hostname, &index).unwrap();
        let second = resolve_host_id(&host, HostMethod::Hostname, &index).unwrap();
        assert_eq!(first, second);
        assert_eq!(first, Some("aa.example.com".to_string()));
    }

    #[test]
    fn test_hostname_method_without_component_is_a_config_error() {
        let host = host_record(compute_instance(41, "compute-100-1", "prod", "web"));
        let index = InstanceIndex::new();
        let err = resolve_host_id(&host, HostMethod::Hostname, &index).unwrap_err();
        assert!(matches!(
            err,
            InventoryError::HostnameComponentMissing { .. }
        ));
    }

    #[test]
    fn test_hostname_method_without_sibling_is_unresolved() {
        let host = host_record(compute_instance(42, "compute-100-2", "prod", "web"));
        let index = indexed(r#"{"web01.example.com": {}}"#);
        assert_eq!(
            resolve_host_id(&host, HostMethod::Hostname, &index).unwrap(),
            None
        );
    }

    #[test]
    fn test_hostname_method_with_only_ips_is_unresolved() {
        let host = host_record(compute_instance(41, "compute-100-1", "prod", "web"));
        let index = indexed(r#"{"10.0.0.5": {}, "192.168.1.9": {}}"#);
        assert_eq!(
            resolve_host_id(&host, HostMethod::Hostname, &index).unwrap(),
            None
        );
    }

    #[test]
    fn test_malformed_entries_is_a_per_host_error() {
        let host = host_record(compute_instance(41, "compute-100-1", "prod", "web"));
        let index = indexed("not json");
        let err = resolve_host_id(&host, HostMethod::Hostname, &index).unwrap_err();
        assert!(err.is_per_host());
    }

    #[test]
    fn test_sibling_hostnames_returns_full_filtered_set() {
        let host = host_record(compute_instance(41, "compute-100-1", "prod", "web"));
        let index = indexed(r#"{"10.1.1.1": {}, "web1.internal": {}, "alias.internal": {}}"#);
        assert_eq!(
            sibling_hostnames(&host, &index).unwrap(),
            Some(vec![
                "alias.internal".to_string(),
                "web1.internal".to_string()
            ])
        );

        // absent component is not an error for host vars
        let empty = InstanceIndex::new();
        assert_eq!(sibling_hostnames(&host, &empty).unwrap(), None);
    }

    #[test]
    fn test_ipv4_detection() {
        assert!(is_ipv4("10.0.0.5"));
        assert!(is_ipv4("255.255.255.255"));
        assert!(!is_ipv4("web01.example.com"));
        assert!(!is_ipv4("1.2.3.4.example.com"));
        assert!(!is_ipv4("1.2.3"));
    }
}
