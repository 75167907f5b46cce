#![allow(dead_code)]

use kubelab_config::{Environment, load_config};
use kubelab_data::{config::DataConfig, startup::run};
use sqlx::PgPool;
use std::io;
use std::net::TcpListener;
use tokio::runtime::Handle;
use uuid::Uuid;

use crate::support::database::{create_data_database, drop_pg_database};

pub struct TestApp {
    pub address: String,
    pub api_client: reqwest::Client,
    pub pool: PgPool,
    config: DataConfig,
    server_handle: tokio::task::JoinHandle<io::Result<()>>,
}

impl TestApp {
    pub async fn get_users(&self) -> reqwest::Response {
        self.api_client
            .get(format!("{}/data/users", &self.address))
            .send()
            .await
            .expect("failed to execute request")
    }

    pub async fn get_user(&self, user_id: &str) -> reqwest::Response {
        self.api_client
            .get(format!("{}/data/users/{user_id}", &self.address))
            .send()
            .await
            .expect("failed to execute request")
    }

    pub async fn get_health(&self) -> reqwest::Response {
        self.api_client
            .get(format!("{}/actuator/health", &self.address))
            .send()
            .await
            .expect("failed to execute request")
    }

    /// Inserts a row directly through the pool and returns its generated id.
    ///
    /// The service itself has no write path, so tests seed the table here.
    pub async fn seed_user(&self, name: &str, email: &str) -> i64 {
        let (id,): (i64,) =
            sqlx::query_as("insert into users (name, email) values ($1, $2) returning id")
                .bind(name)
                .bind(email)
                .fetch_one(&self.pool)
                .await
                .expect("failed to seed user");

        id
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        // First, abort the server task to ensure it's terminated.
        self.server_handle.abort();

        // To use `block_in_place,` we need a multithreaded runtime since when a blocking
        // task is issued, the runtime will offload existing tasks to another worker.
        tokio::task::block_in_place(move || {
            Handle::current()
                .block_on(async move { drop_pg_database(&self.config.database).await });
        });
    }
}

pub async fn spawn_test_app() -> TestApp {
    // We set the environment to dev.
    Environment::Dev.set();

    let base_address = "127.0.0.1";
    let listener =
        TcpListener::bind(format!("{base_address}:0")).expect("failed to bind random port");
    let port = listener.local_addr().unwrap().port();

    let mut config = load_config::<DataConfig>().expect("Failed to read configuration");
    // We use a random database name.
    config.database.name = Uuid::new_v4().to_string();

    let pool = create_data_database(&config.database).await;

    let server = run(listener, pool.clone())
        .await
        .expect("failed to bind address");

    let server_handle = tokio::spawn(server);

    TestApp {
        address: format!("http://{base_address}:{port}"),
        api_client: reqwest::Client::new(),
        pool,
        config,
        server_handle,
    }
}
