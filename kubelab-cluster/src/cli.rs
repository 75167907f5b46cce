use clap::{Parser, Subcommand};

use crate::tool::Tool;

/// Local Kubernetes lab orchestration across k3d, kind and Minikube.
#[derive(Debug, Parser)]
#[command(name = "kubelab-cluster", version)]
pub struct Cli {
    /// Cluster tool used as the deployment target.
    #[arg(long, global = true, value_enum, default_value_t = Tool::K3d)]
    pub tool: Tool,

    /// Name of the local cluster.
    #[arg(long, global = true, default_value = "kubelab")]
    pub cluster: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create the cluster; prompts to delete and recreate it if it already exists.
    Up {
        /// Answer yes to the delete-and-recreate prompt.
        #[arg(long)]
        yes: bool,
    },

    /// Delete the cluster.
    Down,

    /// Load the locally built service images into the cluster.
    Load {
        /// Gateway image reference.
        #[arg(long, default_value = "kubelab-gateway:latest")]
        gateway_image: String,

        /// Data service image reference.
        #[arg(long, default_value = "kubelab-data:latest")]
        data_image: String,
    },

    /// Apply the lab workloads and wait for the pods to come up.
    Deploy {
        /// Gateway image reference.
        #[arg(long, default_value = "kubelab-gateway:latest")]
        gateway_image: String,

        /// Data service image reference.
        #[arg(long, default_value = "kubelab-data:latest")]
        data_image: String,

        /// Password stored in the postgres credentials secret.
        #[arg(long, default_value = "postgres")]
        db_password: String,

        /// Seconds to wait for all pods to reach Running.
        #[arg(long, default_value_t = 120)]
        timeout_secs: u64,
    },

    /// Print the phase of every lab pod.
    Status,

    /// Run the smoke tests against a deployed lab.
    Smoke {
        /// Public base URL of the gateway.
        #[arg(long, default_value = "http://localhost:30080")]
        base_url: String,
    },
}
