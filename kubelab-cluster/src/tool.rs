use clap::ValueEnum;
use std::fmt;
use thiserror::Error;
use tokio::process::Command;

/// The three interchangeable local cluster tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Tool {
    K3d,
    Kind,
    Minikube,
}

impl Tool {
    /// Name of the executable to invoke.
    pub fn program(&self) -> &'static str {
        match self {
            Tool::K3d => "k3d",
            Tool::Kind => "kind",
            Tool::Minikube => "minikube",
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.program())
    }
}

/// Errors surfaced when invoking a cluster tool CLI.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("cluster tool '{command}' failed to start: {message}")]
    Unavailable { command: String, message: String },

    #[error("cluster tool '{command}' failed (status {status:?}): {stderr}")]
    Failed {
        command: String,
        status: Option<i32>,
        stderr: String,
    },

    #[error("cluster tool '{command}' produced unreadable output: {message}")]
    UnexpectedOutput { command: String, message: String },
}

/// Command-backed wrapper around one of the cluster tool CLIs.
///
/// Each operation shells out to the selected tool and blocks until it exits.
/// A non-zero exit status is an error; there are no retries.
pub struct ClusterTool {
    tool: Tool,
}

impl ClusterTool {
    pub fn new(tool: Tool) -> Self {
        Self { tool }
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Reports whether a cluster with the given name already exists.
    pub async fn cluster_exists(&self, name: &str) -> Result<bool, ToolError> {
        let args = self.list_args();
        let stdout = self.run(&args).await?;
        let clusters = parse_cluster_names(self.tool, &stdout)
            .map_err(|message| ToolError::UnexpectedOutput {
                command: self.command_label(&args),
                message,
            })?;

        Ok(clusters.iter().any(|cluster| cluster == name))
    }

    pub async fn create_cluster(&self, name: &str) -> Result<(), ToolError> {
        self.run(&self.create_args(name)).await.map(|_| ())
    }

    pub async fn delete_cluster(&self, name: &str) -> Result<(), ToolError> {
        self.run(&self.delete_args(name)).await.map(|_| ())
    }

    /// Loads a locally built Docker image into the cluster.
    pub async fn load_image(&self, name: &str, image: &str) -> Result<(), ToolError> {
        self.run(&self.load_args(name, image)).await.map(|_| ())
    }

    fn list_args(&self) -> Vec<String> {
        let args: &[&str] = match self.tool {
            Tool::K3d => &["cluster", "list", "-o", "json"],
            Tool::Kind => &["get", "clusters"],
            Tool::Minikube => &["profile", "list", "-o", "json"],
        };

        args.iter().map(ToString::to_string).collect()
    }

    fn create_args(&self, name: &str) -> Vec<String> {
        let args: &[&str] = match self.tool {
            Tool::K3d => &["cluster", "create", name, "--wait"],
            Tool::Kind => &["create", "cluster", "--name", name, "--wait", "60s"],
            Tool::Minikube => &["start", "-p", name],
        };

        args.iter().map(ToString::to_string).collect()
    }

    fn delete_args(&self, name: &str) -> Vec<String> {
        let args: &[&str] = match self.tool {
            Tool::K3d => &["cluster", "delete", name],
            Tool::Kind => &["delete", "cluster", "--name", name],
            Tool::Minikube => &["delete", "-p", name],
        };

        args.iter().map(ToString::to_string).collect()
    }

    fn load_args(&self, name: &str, image: &str) -> Vec<String> {
        let args: &[&str] = match self.tool {
            Tool::K3d => &["image", "import", image, "-c", name],
            Tool::Kind => &["load", "docker-image", image, "--name", name],
            Tool::Minikube => &["image", "load", image, "-p", name],
        };

        args.iter().map(ToString::to_string).collect()
    }

    fn command_label(&self, args: &[String]) -> String {
        let mut label = self.tool.program().to_string();
        for arg in args {
            label.push(' ');
            label.push_str(arg);
        }
        label
    }

    async fn run(&self, args: &[String]) -> Result<String, ToolError> {
        let output = Command::new(self.tool.program())
            .args(args)
            .output()
            .await
            .map_err(|error| ToolError::Unavailable {
                command: self.command_label(args),
                message: error.to_string(),
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_owned();
            return Err(ToolError::Failed {
                command: self.command_label(args),
                status: output.status.code(),
                stderr,
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

/// Extracts cluster names from a tool's list output.
///
/// k3d and Minikube emit JSON, kind emits one bare name per line.
fn parse_cluster_names(tool: Tool, stdout: &str) -> Result<Vec<String>, String> {
    match tool {
        Tool::K3d => {
            let clusters: serde_json::Value =
                serde_json::from_str(stdout).map_err(|e| e.to_string())?;
            let clusters = clusters
                .as_array()
                .ok_or_else(|| "expected a JSON array of clusters".to_string())?;

            Ok(clusters
                .iter()
                .filter_map(|cluster| cluster["name"].as_str())
                .map(ToString::to_string)
                .collect())
        }
        Tool::Kind => Ok(stdout
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(ToString::to_string)
            .collect()),
        Tool::Minikube => {
            let profiles: serde_json::Value =
                serde_json::from_str(stdout).map_err(|e| e.to_string())?;
            let profiles = profiles["valid"]
                .as_array()
                .ok_or_else(|| "expected a `valid` array of profiles".to_string())?;

            Ok(profiles
                .iter()
                .filter_map(|profile| profile["Name"].as_str())
                .map(ToString::to_string)
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_k3d_cluster_list_output_is_parsed() {
        let stdout = r#"[{"name":"kubelab","serversCount":1},{"name":"other","serversCount":1}]"#;

        let clusters = parse_cluster_names(Tool::K3d, stdout).unwrap();

        assert_eq!(clusters, vec!["kubelab", "other"]);
    }

    #[test]
    fn test_kind_cluster_list_output_is_parsed() {
        let stdout = "kubelab\nother\n";

        let clusters = parse_cluster_names(Tool::Kind, stdout).unwrap();

        assert_eq!(clusters, vec!["kubelab", "other"]);
    }

    #[test]
    fn test_kind_empty_output_means_no_clusters() {
        let clusters = parse_cluster_names(Tool::Kind, "").unwrap();

        assert!(clusters.is_empty());
    }

    #[test]
    fn test_minikube_profile_list_output_is_parsed() {
        let stdout = r#"{"invalid":[],"valid":[{"Name":"kubelab","Status":"Running"}]}"#;

        let clusters = parse_cluster_names(Tool::Minikube, stdout).unwrap();

        assert_eq!(clusters, vec!["kubelab"]);
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        assert!(parse_cluster_names(Tool::K3d, "not json").is_err());
        assert!(parse_cluster_names(Tool::Minikube, "{}").is_err());
    }

    #[test]
    fn test_load_args_match_each_tool() {
        let image = "kubelab-gateway:latest";

        let k3d = ClusterTool::new(Tool::K3d);
        assert_eq!(
            k3d.load_args("kubelab", image),
            ["image", "import", image, "-c", "kubelab"]
        );

        let kind = ClusterTool::new(Tool::Kind);
        assert_eq!(
            kind.load_args("kubelab", image),
            ["load", "docker-image", image, "--name", "kubelab"]
        );

        let minikube = ClusterTool::new(Tool::Minikube);
        assert_eq!(
            minikube.load_args("kubelab", image),
            ["image", "load", image, "-p", "kubelab"]
        );
    }

    #[test]
    fn test_command_label_includes_all_args() {
        let tool = ClusterTool::new(Tool::Kind);
        let args = tool.delete_args("kubelab");

        assert_eq!(
            tool.command_label(&args),
            "kind delete cluster --name kubelab"
        );
    }
}
