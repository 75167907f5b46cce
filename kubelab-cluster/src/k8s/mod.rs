//! Kubernetes integration for the cluster CLI.
//!
//! This module contains the abstractions and implementations used to apply
//! the lab workloads (namespace, secret, config maps, deployments, services)
//! and to observe pod phases. Consumers should depend on the trait
//! [`K8sClient`] and avoid relying on a specific transport.
//!
//! The default client, [`http::HttpK8sClient`], is backed by the [`kube`]
//! crate and talks to the cluster using the ambient configuration (the
//! `~/.kube/config` context the cluster tool just created). Keeping the
//! abstraction in [`base`] lets us swap implementations in tests.

mod base;
pub mod http;

pub use base::*;
