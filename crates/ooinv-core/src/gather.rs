//! Remote traversal that builds the inventory aggregate

use crate::catalog::{HostCatalog, SkippedHost};
use crate::client::{ClientError, ResourceClient};
use crate::error::{InventoryError, InventoryResult};
use crate::identity::HostMethod;
use crate::index::InstanceIndex;
use crate::resource::ResourceRecord;
use crate::vars::VariableOverlays;
use crate::view::{HostVars, ListView, ViewAssembler};
use std::sync::Arc;

/// How a failed per-component instance listing is handled
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Record the failure and continue with a degraded index
    #[default]
    BestEffort,
    /// Fail the whole run on the first listing failure
    Abort,
}

/// One component listing skipped under the best-effort policy
#[derive(Debug)]
pub struct ListingFailure {
    pub environment: String,
    pub platform: String,
    pub component: String,
    pub error: ClientError,
}

/// Settings for one gather run
#[derive(Debug, Clone, Default)]
pub struct GatherOptions {
    /// Target one environment; `None` scans every environment of the assembly
    pub environment: Option<String>,
    /// Identity strategy for the generated views
    pub host_method: HostMethod,
    /// Listing-failure tolerance
    pub failure_policy: FailurePolicy,
}

/// Drives a [`ResourceClient`] through the assembly hierarchy
///
/// Instances are listed once per component and feed both the instance index
/// and the host catalog.
pub struct Gatherer<'a, C: ResourceClient> {
    client: &'a C,
    options: GatherOptions,
}

impl<'a, C: ResourceClient> Gatherer<'a, C> {
    #[must_use]
    pub fn new(client: &'a C, options: GatherOptions) -> Self {
        Self { client, options }
    }

    /// Perform the full remote traversal and return the immutable aggregate
    pub fn gather(&self) -> InventoryResult<Inventory> {
        let mut state = GatherState::default();

        let clouds: Vec<Arc<ResourceRecord>> = self
            .client
            .list_clouds()?
            .into_iter()
            .map(Arc::new)
            .collect();

        let environments: Vec<Arc<ResourceRecord>> = match &self.options.environment {
            Some(name) => vec![Arc::new(self.client.get_environment(name)?)],
            None => self
                .client
                .list_environments()?
                .into_iter()
                .map(Arc::new)
                .collect(),
        };

        for environment in &environments {
            self.gather_environment(environment, &mut state)?;
        }

        Ok(Inventory {
            index: state.index,
            catalog: state.catalog,
            overlays: state.overlays,
            clouds,
            failures: state.failures,
            host_method: self.options.host_method,
            scoped: self.options.environment.is_some(),
        })
    }

    fn gather_environment(
        &self,
        environment: &Arc<ResourceRecord>,
        state: &mut GatherState,
    ) -> InventoryResult<()> {
        let env_name = environment.ci_name.as_str();
        state.overlays.set_global(
            environment,
            shared(self.client.list_global_variables(env_name)?),
        );

        for platform in self.client.list_platforms(env_name)? {
            let platform = Arc::new(platform);
            state.overlays.set_platform(
                &platform,
                shared(
                    self.client
                        .list_platform_variables(env_name, &platform.ci_name)?,
                ),
            );

            let components = self
                .client
                .list_platform_components(env_name, &platform.ci_name)?;
            for component in components {
                state
                    .index
                    .register_component(env_name, &platform.ci_name, &component.ci_name);

                let listing =
                    self.client
                        .list_instances(env_name, &platform.ci_name, &component.ci_name);
                let instances = match listing {
                    Ok(instances) => shared(instances),
                    Err(error) => {
                        if self.options.failure_policy == FailurePolicy::Abort {
                            return Err(InventoryError::Listing {
                                environment: env_name.to_string(),
                                platform: platform.ci_name.clone(),
                                component: component.ci_name.clone(),
                                source: error,
                            });
                        }
                        state.failures.push(ListingFailure {
                            environment: env_name.to_string(),
                            platform: platform.ci_name.clone(),
                            component: component.ci_name.clone(),
                            error,
                        });
                        continue;
                    }
                };

                state.index.insert_instances(
                    env_name,
                    &platform.ci_name,
                    &component.ci_name,
                    &instances,
                );
                state
                    .catalog
                    .ingest_component(environment, &platform, &component, &instances);
            }
        }
        Ok(())
    }
}

#[derive(Default)]
struct GatherState {
    index: InstanceIndex,
    catalog: HostCatalog,
    overlays: VariableOverlays,
    failures: Vec<ListingFailure>,
}

fn shared(records: Vec<ResourceRecord>) -> Vec<Arc<ResourceRecord>> {
    records.into_iter().map(Arc::new).collect()
}

/// Gathered inventory state; the terminal producer of the two views
#[derive(Debug)]
pub struct Inventory {
    index: InstanceIndex,
    catalog: HostCatalog,
    overlays: VariableOverlays,
    clouds: Vec<Arc<ResourceRecord>>,
    failures: Vec<ListingFailure>,
    host_method: HostMethod,
    scoped: bool,
}

impl Inventory {
    /// Generate the grouped inventory document (`--list`)
    pub fn generate_list(&self) -> InventoryResult<ListView> {
        self.assembler().generate_list()
    }

    /// Generate the variable object for one host (`--host`)
    pub fn generate_host(&self, host_id: &str) -> InventoryResult<Option<HostVars>> {
        self.assembler().generate_host(host_id)
    }

    fn assembler(&self) -> ViewAssembler<'_> {
        ViewAssembler::new(
            &self.catalog,
            &self.index,
            &self.overlays,
            self.host_method,
            !self.scoped,
        )
    }

    /// Clouds known to the organization
    #[must_use]
    pub fn clouds(&self) -> &[Arc<ResourceRecord>] {
        &self.clouds
    }

    /// Component listings skipped under the best-effort policy
    #[must_use]
    pub fn failures(&self) -> &[ListingFailure] {
        &self.failures
    }

    /// Compute instances skipped at ingestion
    #[must_use]
    pub fn skipped_hosts(&self) -> &[SkippedHost] {
        self.catalog.skipped()
    }

    /// Number of cataloged hosts
    #[must_use]
    pub fn host_count(&self) -> usize {
        self.catalog.len()
    }
}
