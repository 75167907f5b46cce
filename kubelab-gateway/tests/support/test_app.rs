#![allow(dead_code)]

use kubelab_config::Environment;
use kubelab_gateway::client::DataServiceClient;
use kubelab_gateway::config::DataServiceConfig;
use kubelab_gateway::startup::run;
use std::io;
use std::net::TcpListener;

pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    server_handle: tokio::task::JoinHandle<io::Result<()>>,
}

impl TestApp {
    pub async fn get_users(&self) -> reqwest::Response {
        self.api_client
            .get(format!("{}/api/users", &self.address))
            .send()
            .await
            .expect("failed to execute request")
    }

    pub async fn get_user(&self, user_id: i64) -> reqwest::Response {
        self.api_client
            .get(format!("{}/api/users/{user_id}", &self.address))
            .send()
            .await
            .expect("failed to execute request")
    }

    pub async fn get_health(&self) -> reqwest::Response {
        self.api_client
            .get(format!("{}/api/health", &self.address))
            .send()
            .await
            .expect("failed to execute request")
    }

    pub async fn get_root(&self) -> reqwest::Response {
        self.api_client
            .get(format!("{}/", &self.address))
            .send()
            .await
            .expect("failed to execute request")
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.server_handle.abort();
    }
}

/// Spawns the gateway on a random port, pointed at the given upstream.
///
/// Tests pass the URL of an `httpmock` server standing in for the data
/// service, or the URL of a closed port to exercise the unreachable paths.
pub async fn spawn_test_app(upstream_base_url: &str) -> TestApp {
    // We set the environment to dev.
    Environment::Dev.set();

    let base_address = "127.0.0.1";
    let listener =
        TcpListener::bind(format!("{base_address}:0")).expect("failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let client = DataServiceClient::new(&DataServiceConfig {
        base_url: upstream_base_url.to_string(),
        request_timeout_secs: 5,
        health_timeout_secs: 2,
    });

    let server = run(listener, client).await.expect("failed to bind address");

    let server_handle = tokio::spawn(server);

    TestApp {
        address: format!("http://{base_address}:{port}"),
        api_client: reqwest::Client::new(),
        server_handle,
    }
}

/// Returns a URL on which nothing is listening.
pub fn closed_port_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").expect("failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    format!("http://127.0.0.1:{port}")
}
