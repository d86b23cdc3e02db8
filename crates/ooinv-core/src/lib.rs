//! OneOps inventory engine
//!
//! Correlates the OneOps organization → assembly → environment → platform →
//! component → instance hierarchy into a flat host/group model and generates
//! Ansible dynamic-inventory views from it.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::too_many_lines
)]

pub mod catalog;
pub mod client;
pub mod error;
pub mod gather;
pub mod identity;
pub mod index;
pub mod resource;
pub mod vars;
pub mod view;

#[cfg(test)]
pub(crate) mod fixtures;

pub use client::{ClientError, ClientResult, ResourceClient};
pub use error::{InventoryError, InventoryResult};
pub use gather::{FailurePolicy, GatherOptions, Gatherer, Inventory};
pub use identity::HostMethod;
pub use resource::ResourceRecord;
pub use view::{HostVars, ListView};
