//! Composite-keyed instance index for sibling lookups

use crate::resource::ResourceRecord;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

/// Scope key isolating ordinal lookups per (environment, platform, component)
///
/// Same-ordinal instances under unrelated platforms never merge because their
/// composite keys differ.
fn composite_key(environment: &str, platform: &str, component: &str) -> String {
    format!("{environment}:{platform}:{component}")
}

/// Lookup from component scope to instances keyed by ordinal
///
/// Ordinal maps are ordered so every "first sibling" selection is the
/// lexicographically smallest ordinal rather than whatever a hash map
/// happens to yield.
#[derive(Debug, Default)]
pub struct InstanceIndex {
    components: HashMap<String, BTreeMap<String, Arc<ResourceRecord>>>,
}

impl InstanceIndex {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a component scope
    ///
    /// Key presence marks the component as declared in the design, even when
    /// its instance listing later fails or returns nothing. The hostname
    /// satisfiability check relies on this.
    pub fn register_component(&mut self, environment: &str, platform: &str, component: &str) {
        self.components
            .entry(composite_key(environment, platform, component))
            .or_default();
    }

    /// Insert the instances of one component into its scope
    pub fn insert_instances(
        &mut self,
        environment: &str,
        platform: &str,
        component: &str,
        instances: &[Arc<ResourceRecord>],
    ) {
        let by_ordinal = self
            .components
            .entry(composite_key(environment, platform, component))
            .or_default();
        for instance in instances {
            by_ordinal.insert(instance.ordinal(), Arc::clone(instance));
        }
    }

    /// Whether the design declares this component in the given scope
    #[must_use]
    pub fn has_component(&self, environment: &str, platform: &str, component: &str) -> bool {
        self.components
            .contains_key(&composite_key(environment, platform, component))
    }

    /// The sibling instance sharing an ordinal within the scope
    #[must_use]
    pub fn sibling(
        &self,
        environment: &str,
        platform: &str,
        component: &str,
        ordinal: &str,
    ) -> Option<&Arc<ResourceRecord>> {
        self.components
            .get(&composite_key(environment, platform, component))?
            .get(ordinal)
    }

    /// The instance with the smallest ordinal in the scope
    #[must_use]
    pub fn first_instance(
        &self,
        environment: &str,
        platform: &str,
        component: &str,
    ) -> Option<&Arc<ResourceRecord>> {
        self.components
            .get(&composite_key(environment, platform, component))?
            .values()
            .next()
    }
}
