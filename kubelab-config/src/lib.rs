//! Configuration management for the kubelab services.
//!
//! Provides environment detection, configuration loading from YAML files with
//! environment variable overrides, secret handling, and the shared Postgres
//! connection configuration used by the data service and the cluster CLI.

mod environment;
mod load;
mod secret;
pub mod shared;

pub use environment::*;
pub use load::*;
pub use secret::*;
