//! Host catalog: compute hosts and their group memberships

use crate::error::InventoryError;
use crate::resource::{ComputeMetadata, ResourceRecord};
use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

/// One compute host with its owning scopes resolved
///
/// Carrying the environment, platform, and component on the record makes the
/// reverse lookups total by construction.
#[derive(Debug, Clone)]
pub struct HostRecord {
    /// The compute instance itself
    pub compute: Arc<ResourceRecord>,
    /// Metadata decoded once at ingestion
    pub metadata: ComputeMetadata,
    /// Name of the declared component this instance runs under
    pub component_name: String,
    /// Owning environment
    pub environment: Arc<ResourceRecord>,
    /// Owning platform
    pub platform: Arc<ResourceRecord>,
}

/// A compute instance skipped at ingestion, with the reason
#[derive(Debug)]
pub struct SkippedHost {
    pub ci_name: String,
    pub reason: InventoryError,
}

/// Ordered membership lists, one per scope key
#[derive(Debug)]
struct GroupSet<K> {
    order: Vec<K>,
    members: HashMap<K, Vec<usize>>,
}

impl<K> Default for GroupSet<K> {
    fn default() -> Self {
        Self {
            order: Vec::new(),
            members: HashMap::new(),
        }
    }
}

impl<K: Eq + Hash + Clone> GroupSet<K> {
    fn push(&mut self, key: K, host: usize) {
        if let Some(list) = self.members.get_mut(&key) {
            list.push(host);
        } else {
            self.order.push(key.clone());
            self.members.insert(key, vec![host]);
        }
    }

    fn iter(&self) -> impl Iterator<Item = (&K, &[usize])> {
        self.order
            .iter()
            .filter_map(|key| self.members.get(key).map(|list| (key, list.as_slice())))
    }
}

/// Accumulates compute hosts and the group structures derived from them
///
/// Groups are created on first use and preserve discovery order; indices in
/// the membership lists point into the global host list.
#[derive(Debug, Default)]
pub struct HostCatalog {
    hosts: Vec<HostRecord>,
    env_groups: GroupSet<i64>,
    platform_groups: GroupSet<i64>,
    platform_compute_groups: GroupSet<(i64, String)>,
    scopes: HashMap<i64, Arc<ResourceRecord>>,
    env_by_platform: HashMap<i64, Arc<ResourceRecord>>,
    skipped: Vec<SkippedHost>,
}

impl HostCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ingest the instances of one component
    ///
    /// Components that are not compute-classified contribute nothing here;
    /// they may still be indexed for sibling lookups. An instance whose
    /// metadata does not decode is skipped and recorded, not fatal.
    pub fn ingest_component(
        &mut self,
        environment: &Arc<ResourceRecord>,
        platform: &Arc<ResourceRecord>,
        component: &ResourceRecord,
        instances: &[Arc<ResourceRecord>],
    ) {
        if !component.is_compute() {
            return;
        }
        self.scopes
            .entry(environment.ci_id)
            .or_insert_with(|| Arc::clone(environment));
        self.scopes
            .entry(platform.ci_id)
            .or_insert_with(|| Arc::clone(platform));
        self.env_by_platform
            .entry(platform.ci_id)
            .or_insert_with(|| Arc::clone(environment));

        for instance in instances {
            let metadata = match ComputeMetadata::decode(instance) {
                Ok(metadata) => metadata,
                Err(reason) => {
                    self.skipped.push(SkippedHost {
                        ci_name: instance.ci_name.clone(),
                        reason,
                    });
                    continue;
                }
            };
            let host = self.hosts.len();
            self.hosts.push(HostRecord {
                compute: Arc::clone(instance),
                metadata,
                component_name: component.ci_name.clone(),
                environment: Arc::clone(environment),
                platform: Arc::clone(platform),
            });
            self.env_groups.push(environment.ci_id, host);
            self.platform_groups.push(platform.ci_id, host);
            self.platform_compute_groups
                .push((platform.ci_id, component.ci_name.clone()), host);
        }
    }

    /// All compute hosts in discovery order
    #[must_use]
    pub fn hosts(&self) -> &[HostRecord] {
        &self.hosts
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.hosts.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.hosts.is_empty()
    }

    /// Per-environment membership lists in discovery order
    pub fn env_groups(&self) -> impl Iterator<Item = (&Arc<ResourceRecord>, &[usize])> {
        self.env_groups
            .iter()
            .filter_map(|(id, members)| self.scopes.get(id).map(|scope| (scope, members)))
    }

    /// Per-platform membership lists in discovery order
    pub fn platform_groups(&self) -> impl Iterator<Item = (&Arc<ResourceRecord>, &[usize])> {
        self.platform_groups
            .iter()
            .filter_map(|(id, members)| self.scopes.get(id).map(|scope| (scope, members)))
    }

    /// Per-(platform, compute component) membership lists in discovery order
    pub fn platform_compute_groups(
        &self,
    ) -> impl Iterator<Item = (&Arc<ResourceRecord>, &str, &[usize])> {
        self.platform_compute_groups.iter().filter_map(|(key, members)| {
            self.scopes
                .get(&key.0)
                .map(|scope| (scope, key.1.as_str(), members))
        })
    }

    /// Owning environment of a platform that produced hosts
    #[must_use]
    pub fn environment_of_platform(&self, platform_id: i64) -> Option<&Arc<ResourceRecord>> {
        self.env_by_platform.get(&platform_id)
    }

    /// Hosts skipped at ingestion
    #[must_use]
    pub fn skipped(&self) -> &[SkippedHost] {
        &self.skipped
    }
}
