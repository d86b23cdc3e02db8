//! Inventory view assembly

use crate::catalog::{HostCatalog, HostRecord};
use crate::error::InventoryResult;
use crate::identity::{resolve_host_id, sibling_hostnames, HostMethod};
use crate::index::InstanceIndex;
use crate::resource::{ResourceRecord, FQDN_COMPONENT, OS_COMPONENT};
use crate::vars::{OverlayKind, VariableOverlays};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Name of the group holding every host
pub const ALL_HOSTS_GROUP: &str = "oo";

/// The `--list` document: `_meta.hostvars` plus one entry per group
#[derive(Debug, Serialize)]
pub struct ListView {
    #[serde(rename = "_meta")]
    pub meta: Meta,
    #[serde(flatten)]
    pub groups: BTreeMap<String, Group>,
}

/// The `_meta` block of a list view
#[derive(Debug, Serialize)]
pub struct Meta {
    pub hostvars: BTreeMap<String, HostVars>,
}

/// A host group: member identities plus shared variables
#[derive(Debug, Serialize)]
pub struct Group {
    pub hosts: Vec<String>,
    pub vars: Value,
}

/// Per-host variable object surfaced in `_meta.hostvars` and the host view
///
/// Attributes the compute record does not carry are omitted from the JSON
/// rather than serialized as null.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostVars {
    pub ansible_ssh_host: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oo_public_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oo_instance_name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oo_instance_id: Option<Value>,
    pub oo_namespace: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oo_organization: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oo_assembly: Option<Value>,
    pub oo_environment: String,
    pub oo_platform: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oo_owner: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oo_mgmt_url: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oo_component: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oo_instance: Option<Value>,
    pub oo_compute_name: String,
    pub oo_component_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oo_cloud: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oo_host_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oo_hypervisor: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oo_availability_zone: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oo_instance_size: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oo_num_cores: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oo_ram: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oo_server_image_name: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oo_server_image_id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oo_private_ip: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oo_vm_state: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oo_hostnames: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oo_os_type: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oo_os_name: Option<Value>,
    pub global: BTreeMap<String, Value>,
    pub platform: BTreeMap<String, Value>,
}

/// Environment group variables
#[derive(Debug, Serialize)]
struct EnvGroupVars<'a> {
    oo_env_id: i64,
    oo_env_name: &'a str,
    oo_env_namespace: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    oo_env_profile: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    oo_env_availability: Option<&'a Value>,
    global: BTreeMap<String, Value>,
}

/// Platform and platform-compute group variables
#[derive(Debug, Serialize)]
struct PlatformGroupVars {
    global: BTreeMap<String, Value>,
    platform: BTreeMap<String, Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fqdn_aliases: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    fqdn_full_aliases: Option<Value>,
}

/// Assembles the list and host views from gathered inventory state
#[derive(Debug)]
pub struct ViewAssembler<'a> {
    catalog: &'a HostCatalog,
    index: &'a InstanceIndex,
    overlays: &'a VariableOverlays,
    method: HostMethod,
    /// Group names get an `env-<name>-` prefix on assembly-wide runs so that
    /// identically-named platforms across environments stay distinct
    prefix_env: bool,
}

impl<'a> ViewAssembler<'a> {
    #[must_use]
    pub fn new(
        catalog: &'a HostCatalog,
        index: &'a InstanceIndex,
        overlays: &'a VariableOverlays,
        method: HostMethod,
        prefix_env: bool,
    ) -> Self {
        Self {
            catalog,
            index,
            overlays,
            method,
            prefix_env,
        }
    }

    /// Build the full grouped inventory document
    pub fn generate_list(&self) -> InventoryResult<ListView> {
        let hosts = self.catalog.hosts();
        let mut resolved: Vec<Option<String>> = vec![None; hosts.len()];
        let mut hostvars = BTreeMap::new();

        for (position, host) in hosts.iter().enumerate() {
            let Some(host_id) = self.resolve_or_skip(host)? else {
                continue;
            };
            let vars = match self.host_vars(host, &host_id) {
                Ok(vars) => vars,
                Err(err) if err.is_per_host() => {
                    eprintln!("Warning: {err}; host {} omitted", host.compute.ci_name);
                    continue;
                }
                Err(err) => return Err(err),
            };
            resolved[position] = Some(host_id.clone());
            if hostvars.insert(host_id.clone(), vars).is_some() {
                eprintln!("Warning: host identity collision on {host_id}; later host wins");
            }
        }

        let mut groups = BTreeMap::new();
        groups.insert(
            ALL_HOSTS_GROUP.to_string(),
            Group {
                hosts: resolved.iter().flatten().cloned().collect(),
                vars: Value::Object(Map::new()),
            },
        );

        for (environment, members) in self.catalog.env_groups() {
            let vars = EnvGroupVars {
                oo_env_id: environment.ci_id,
                oo_env_name: &environment.ci_name,
                oo_env_namespace: &environment.ns_path,
                oo_env_profile: environment.attr("profile"),
                oo_env_availability: environment.attr("availability"),
                global: self.overlays.overlay(environment, OverlayKind::Global),
            };
            groups.insert(
                format!("env-{}", environment.ci_name),
                Group {
                    hosts: member_ids(members, &resolved),
                    vars: serde_json::to_value(vars)?,
                },
            );
        }

        for (platform, members) in self.catalog.platform_groups() {
            let Some(environment) = self.catalog.environment_of_platform(platform.ci_id) else {
                continue;
            };
            groups.insert(
                self.platform_group_name(environment, platform, None),
                Group {
                    hosts: member_ids(members, &resolved),
                    vars: self.platform_group_vars(environment, platform)?,
                },
            );
        }

        for (platform, component_name, members) in self.catalog.platform_compute_groups() {
            let Some(environment) = self.catalog.environment_of_platform(platform.ci_id) else {
                continue;
            };
            groups.insert(
                self.platform_group_name(environment, platform, Some(component_name)),
                Group {
                    hosts: member_ids(members, &resolved),
                    vars: self.platform_group_vars(environment, platform)?,
                },
            );
        }

        Ok(ListView {
            meta: Meta { hostvars },
            groups,
        })
    }

    /// Build the variable object for one identified host
    ///
    /// Scans the global host list; when several hosts share the identity the
    /// last one wins, matching the list view's collision behavior so the two
    /// views stay consistent. `Ok(None)` when nothing matches.
    pub fn generate_host(&self, host_id: &str) -> InventoryResult<Option<HostVars>> {
        let wanted = host_id.trim();
        let mut found = None;
        for host in self.catalog.hosts() {
            let Some(candidate) = self.resolve_or_skip(host)? else {
                continue;
            };
            if candidate.trim() != wanted {
                continue;
            }
            match self.host_vars(host, &candidate) {
                Ok(vars) => found = Some(vars),
                Err(err) if err.is_per_host() => {
                    eprintln!("Warning: {err}; host {} omitted", host.compute.ci_name);
                }
                Err(err) => return Err(err),
            }
        }
        Ok(found)
    }

    /// Resolve an identity, downgrading per-host failures to omission
    fn resolve_or_skip(&self, host: &HostRecord) -> InventoryResult<Option<String>> {
        match resolve_host_id(host, self.method, self.index) {
            Ok(Some(host_id)) => Ok(Some(host_id)),
            Ok(None) => {
                eprintln!(
                    "Warning: no {} identity for {}; host omitted",
                    self.method, host.compute.ci_name
                );
                Ok(None)
            }
            Err(err) if err.is_per_host() => {
                eprintln!("Warning: {err}; host {} omitted", host.compute.ci_name);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    fn platform_group_name(
        &self,
        environment: &ResourceRecord,
        platform: &ResourceRecord,
        component: Option<&str>,
    ) -> String {
        let name = match component {
            Some(component) => format!("platform-{}-{component}", platform.ci_name),
            None => format!("platform-{}", platform.ci_name),
        };
        if self.prefix_env {
            format!("env-{}-{name}", environment.ci_name)
        } else {
            name
        }
    }

    fn platform_group_vars(
        &self,
        environment: &ResourceRecord,
        platform: &ResourceRecord,
    ) -> InventoryResult<Value> {
        let mut vars = PlatformGroupVars {
            global: self.overlays.overlay(environment, OverlayKind::Global),
            platform: self.overlays.overlay(platform, OverlayKind::Platform),
            fqdn_aliases: None,
            fqdn_full_aliases: None,
        };
        if let Some(fqdn) =
            self.index
                .first_instance(&environment.ci_name, &platform.ci_name, FQDN_COMPONENT)
        {
            vars.fqdn_aliases = alias_list(fqdn, "aliases");
            vars.fqdn_full_aliases = alias_list(fqdn, "full_aliases");
        }
        Ok(serde_json::to_value(vars)?)
    }

    fn host_vars(&self, host: &HostRecord, host_id: &str) -> InventoryResult<HostVars> {
        let compute = &host.compute;
        let metadata = &host.metadata;
        let ordinal = compute.ordinal();

        let oo_hostnames = sibling_hostnames(host, self.index)?;
        let os_sibling = self.index.sibling(
            &metadata.environment,
            &metadata.platform,
            OS_COMPONENT,
            &ordinal,
        );

        let attr = |name: &str| compute.attr(name).cloned();

        Ok(HostVars {
            ansible_ssh_host: host_id.to_string(),
            oo_public_ip: compute.attr_str("public_ip").map(str::to_owned),
            oo_instance_name: attr("instance_name"),
            oo_instance_id: attr("instance_id"),
            oo_namespace: compute.ns_path.clone(),
            oo_organization: metadata.organization.clone(),
            oo_assembly: metadata.assembly.clone(),
            oo_environment: metadata.environment.clone(),
            oo_platform: metadata.platform.clone(),
            oo_owner: metadata.owner.clone(),
            oo_mgmt_url: metadata.mgmt_url.clone(),
            oo_component: metadata.component.clone(),
            oo_instance: metadata.instance.clone(),
            oo_compute_name: compute.ci_name.clone(),
            oo_component_name: host.component_name.clone(),
            oo_cloud: compute.deployed_to.clone(),
            oo_host_id: attr("host_id"),
            oo_hypervisor: attr("hypervisor"),
            oo_availability_zone: attr("availability_zone"),
            oo_instance_size: attr("size"),
            oo_num_cores: attr("cores"),
            oo_ram: attr("ram"),
            oo_server_image_name: attr("server_image_name"),
            oo_server_image_id: attr("server_image_id"),
            oo_private_ip: compute.attr_str("private_ip").map(str::to_owned),
            oo_vm_state: attr("vm_state"),
            oo_hostnames,
            oo_os_type: os_sibling.and_then(|os| os.attr("ostype").cloned()),
            oo_os_name: os_sibling.and_then(|os| os.attr("osname").cloned()),
            global: self
                .overlays
                .overlay(&host.environment, OverlayKind::Global),
            platform: self
                .overlays
                .overlay(&host.platform, OverlayKind::Platform),
        })
    }
}

/// Resolve membership indices into identities, dropping omitted hosts
fn member_ids(members: &[usize], resolved: &[Option<String>]) -> Vec<String> {
    members
        .iter()
        .filter_map(|&position| resolved.get(position).cloned().flatten())
        .collect()
}

/// Decode a JSON-array alias attribute; malformed values are warned and dropped
fn alias_list(fqdn: &ResourceRecord, attribute: &str) -> Option<Value> {
    let raw = fqdn.attr_str(attribute)?;
    if raw.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ Value::Array(_)) => Some(value),
        Ok(_) | Err(_) => {
            eprintln!(
                "Warning: malformed {attribute} attribute on {}; dropped",
                fqdn.ci_name
            );
            None
        }
    }
}
