//! Public API gateway for the kubelab demo.
//!
//! A read-only proxy in front of the internal data service: two user routes
//! are forwarded upstream with their status and body unchanged, and a health
//! route reports gateway liveness together with upstream reachability. No
//! aggregation, no retries, no circuit breaking.

pub mod client;
pub mod config;
pub mod routes;
pub mod startup;
