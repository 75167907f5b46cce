use std::net::TcpListener;

use actix_web::{App, HttpServer, dev::Server, web};
use kubelab_config::shared::{IntoConnectOptions, PgConnectionConfig};
use sqlx::{PgPool, postgres::PgPoolOptions};
use tracing_actix_web::TracingLogger;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    config::DataConfig,
    routes::{
        ErrorBody,
        health::{Component, ComponentStatus, Components, HealthResponse, health},
        path_error_handler,
        users::{UserResponse, read_all_users, read_user},
    },
};

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(config: DataConfig) -> Result<Self, anyhow::Error> {
        let connection_pool = get_connection_pool(&config.database);

        // Synchronize the schema before accepting traffic. The service owns
        // the `users` table and this is the only place it is ever created.
        sqlx::migrate!("./migrations").run(&connection_pool).await?;

        let address = format!("{}:{}", config.application.host, config.application.port);
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();

        let server = run(listener, connection_pool).await?;

        Ok(Self { port, server })
    }

    pub async fn migrate_database(config: PgConnectionConfig) -> Result<(), anyhow::Error> {
        let connection_pool = get_connection_pool(&config);

        sqlx::migrate!("./migrations").run(&connection_pool).await?;

        Ok(())
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub fn get_connection_pool(config: &PgConnectionConfig) -> PgPool {
    PgPoolOptions::new().connect_lazy_with(config.with_db())
}

pub async fn run(listener: TcpListener, connection_pool: PgPool) -> Result<Server, anyhow::Error> {
    let connection_pool = web::Data::new(connection_pool);

    #[derive(OpenApi)]
    #[openapi(
        paths(
            crate::routes::health::health,
            crate::routes::users::read_all_users,
            crate::routes::users::read_user,
        ),
        components(schemas(
            UserResponse,
            ErrorBody,
            HealthResponse,
            Components,
            Component,
            ComponentStatus,
        ))
    )]
    struct ApiDoc;

    let openapi = ApiDoc::openapi();

    let server = HttpServer::new(move || {
        App::new()
            .wrap(
                sentry::integrations::actix::Sentry::builder()
                    .capture_server_errors(true)
                    .start_transaction(true)
                    .finish(),
            )
            .wrap(TracingLogger::default())
            .app_data(web::PathConfig::default().error_handler(path_error_handler))
            .service(health)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
            .service(
                web::scope("data")
                    .service(read_all_users)
                    .service(read_user),
            )
            .app_data(connection_pool.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
