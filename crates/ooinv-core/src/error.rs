//! Error types for the inventory engine

use crate::client::ClientError;
use thiserror::Error;

/// Result type for inventory operations
pub type InventoryResult<T> = Result<T, InventoryError>;

/// Errors that can occur while gathering or querying an inventory
#[derive(Error, Debug)]
pub enum InventoryError {
    /// A remote listing call failed
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Instance listing for one component failed under the abort policy
    #[error("listing instances of {environment}/{platform}/{component} failed")]
    Listing {
        environment: String,
        platform: String,
        component: String,
        #[source]
        source: ClientError,
    },

    /// The hostname method needs a hostname component the design does not declare
    #[error("host method 'hostname' requires a hostname component in {environment}/{platform}")]
    HostnameComponentMissing {
        environment: String,
        platform: String,
    },

    /// A JSON-encoded attribute failed to decode
    #[error("malformed {attribute} attribute on {ci_name}")]
    MalformedAttribute {
        attribute: String,
        ci_name: String,
        #[source]
        source: serde_json::Error,
    },

    /// A required attribute is absent from a record
    #[error("missing {attribute} attribute on {ci_name}")]
    MissingAttribute { attribute: String, ci_name: String },

    /// View serialization failed
    #[error("failed to serialize view")]
    Serialize(#[from] serde_json::Error),
}

impl InventoryError {
    /// Whether this error affects a single host rather than the whole run
    ///
    /// Per-host errors skip the affected host with a warning; everything else
    /// aborts view generation.
    #[must_use]
    pub fn is_per_host(&self) -> bool {
        matches!(
            self,
            Self::MalformedAttribute { .. } | Self::MissingAttribute { .. }
        )
    }
}
