//! Blocking OneOps API client
//!
//! Implements the engine's `ResourceClient` boundary over the OneOps
//! transition and operations HTTP APIs.

#![forbid(unsafe_code)]
#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::missing_errors_doc, clippy::module_name_repetitions)]

pub mod client;
pub mod wire;

pub use client::{OoClient, OoConfig};
