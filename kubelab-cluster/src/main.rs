use clap::Parser;
use kubelab_cluster::cli::{Cli, Command};
use kubelab_cluster::deploy::{self, DeployImages, EXPECTED_PODS, NAMESPACE};
use kubelab_cluster::k8s::K8sClient;
use kubelab_cluster::k8s::http::HttpK8sClient;
use kubelab_cluster::smoke::run_smoke;
use kubelab_cluster::tool::ClusterTool;
use kubelab_telemetry::tracing::init_tracing;
use std::io::{BufRead, Write};
use std::time::Duration;
use tracing::info;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let _log_flusher = init_tracing(env!("CARGO_BIN_NAME"))?;

    let tool = ClusterTool::new(cli.tool);

    match cli.command {
        Command::Up { yes } => up(&tool, &cli.cluster, yes).await?,
        Command::Down => down(&tool, &cli.cluster).await?,
        Command::Load {
            gateway_image,
            data_image,
        } => {
            info!(image = gateway_image, "loading gateway image");
            tool.load_image(&cli.cluster, &gateway_image).await?;
            info!(image = data_image, "loading data service image");
            tool.load_image(&cli.cluster, &data_image).await?;
            println!("Images loaded into cluster '{}'.", cli.cluster);
        }
        Command::Deploy {
            gateway_image,
            data_image,
            db_password,
            timeout_secs,
        } => {
            let k8s = HttpK8sClient::new().await?;
            let images = DeployImages {
                gateway: gateway_image,
                data_service: data_image,
            };
            deploy::deploy(
                &k8s,
                &images,
                &db_password,
                Duration::from_secs(timeout_secs),
            )
            .await?;
            println!("Lab deployed; {EXPECTED_PODS} pods Running in namespace '{NAMESPACE}'.");
        }
        Command::Status => {
            let k8s = HttpK8sClient::new().await?;
            let phases = k8s.get_pod_phases(NAMESPACE).await?;
            if phases.is_empty() {
                println!("No pods found in namespace '{NAMESPACE}'.");
            }
            for (name, phase) in phases {
                println!("{name}\t{phase}");
            }
        }
        Command::Smoke { base_url } => {
            let k8s = HttpK8sClient::new().await?;
            run_smoke(&base_url, &k8s, NAMESPACE, EXPECTED_PODS).await?;
            println!("Smoke tests passed against {base_url}.");
        }
    }

    Ok(())
}

async fn up(tool: &ClusterTool, cluster: &str, yes: bool) -> anyhow::Result<()> {
    if tool.cluster_exists(cluster).await? {
        if !yes && !confirm_recreate(cluster)? {
            println!("Keeping existing cluster '{cluster}'.");
            return Ok(());
        }

        info!(cluster, "deleting existing cluster");
        tool.delete_cluster(cluster).await?;
    }

    info!(cluster, tool = %tool.tool(), "creating cluster");
    tool.create_cluster(cluster).await?;
    println!("Cluster '{cluster}' is up.");

    Ok(())
}

async fn down(tool: &ClusterTool, cluster: &str) -> anyhow::Result<()> {
    if !tool.cluster_exists(cluster).await? {
        println!("Cluster '{cluster}' does not exist, nothing to delete.");
        return Ok(());
    }

    info!(cluster, "deleting cluster");
    tool.delete_cluster(cluster).await?;
    println!("Cluster '{cluster}' deleted.");

    Ok(())
}

/// Asks on the terminal whether an existing cluster should be deleted and
/// recreated. Anything other than `y`/`yes` keeps the cluster.
fn confirm_recreate(cluster: &str) -> anyhow::Result<bool> {
    print!("Cluster '{cluster}' already exists. Delete and recreate it? [y/N] ");
    std::io::stdout().flush()?;

    let mut answer = String::new();
    std::io::stdin().lock().read_line(&mut answer)?;

    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}
