//! Boundary to the remote resource-listing service

use crate::resource::ResourceRecord;
use thiserror::Error;

/// Result type for client operations
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors surfaced by a resource client implementation
#[derive(Error, Debug)]
pub enum ClientError {
    /// The request could not be completed
    #[error("request for {resource} failed")]
    Transport {
        resource: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The response did not decode into the expected shape
    #[error("unexpected response for {resource}: {reason}")]
    UnexpectedResponse { resource: String, reason: String },

    /// The named resource does not exist
    #[error("resource not found: {0}")]
    NotFound(String),
}

/// Listing operations the engine consumes, scoped to one organization/assembly
///
/// Implementations own transport and authentication; the engine treats every
/// returned record as opaque and immutable.
pub trait ResourceClient {
    /// List all clouds known to the organization
    fn list_clouds(&self) -> ClientResult<Vec<ResourceRecord>>;

    /// List the assembly's environments
    fn list_environments(&self) -> ClientResult<Vec<ResourceRecord>>;

    /// Fetch one environment by name
    fn get_environment(&self, environment: &str) -> ClientResult<ResourceRecord>;

    /// List the platforms of an environment
    fn list_platforms(&self, environment: &str) -> ClientResult<Vec<ResourceRecord>>;

    /// List the declared components of a platform
    fn list_platform_components(
        &self,
        environment: &str,
        platform: &str,
    ) -> ClientResult<Vec<ResourceRecord>>;

    /// List the global variables of an environment
    fn list_global_variables(&self, environment: &str) -> ClientResult<Vec<ResourceRecord>>;

    /// List the variables of a platform
    fn list_platform_variables(
        &self,
        environment: &str,
        platform: &str,
    ) -> ClientResult<Vec<ResourceRecord>>;

    /// List the running instances of one component
    ///
    /// May fail per call; the gatherer decides whether that degrades or
    /// aborts the run.
    fn list_instances(
        &self,
        environment: &str,
        platform: &str,
        component: &str,
    ) -> ClientResult<Vec<ResourceRecord>>;
}
