//! Telemetry for the kubelab services.
//!
//! Provides structured logging initialization shared by the gateway, the data
//! service and the cluster CLI. Production logs as JSON to rotating files,
//! development logs pretty-printed to the console.

pub mod tracing;
