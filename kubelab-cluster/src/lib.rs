//! Cluster orchestration CLI for the kubelab demo.
//!
//! Automates the local Kubernetes workflow across three interchangeable
//! cluster tools (k3d, kind, Minikube): cluster creation, image loading,
//! workload deployment, and smoke testing. Every command is a linear sequence
//! of "check precondition, run external command, verify expected state" steps
//! that stops on the first error; there is no rollback and no reconciliation
//! loop.

pub mod cli;
pub mod deploy;
pub mod k8s;
pub mod smoke;
pub mod tool;
