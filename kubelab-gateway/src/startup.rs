use std::net::TcpListener;

use actix_web::{App, HttpServer, dev::Server, web};
use tracing_actix_web::TracingLogger;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    client::DataServiceClient,
    config::GatewayConfig,
    routes::{
        ErrorResponse,
        health::{HealthResponse, health},
        root,
        users::{User, get_user, get_users},
    },
};

pub struct Application {
    port: u16,
    server: Server,
}

impl Application {
    pub async fn build(config: GatewayConfig) -> Result<Self, anyhow::Error> {
        let client = DataServiceClient::new(&config.data_service);

        let address = format!("{}:{}", config.application.host, config.application.port);
        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();

        let server = run(listener, client).await?;

        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub async fn run(listener: TcpListener, client: DataServiceClient) -> Result<Server, anyhow::Error> {
    let client = web::Data::new(client);

    #[derive(OpenApi)]
    #[openapi(
        paths(
            crate::routes::health::health,
            crate::routes::users::get_users,
            crate::routes::users::get_user,
        ),
        components(schemas(User, ErrorResponse, HealthResponse))
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
            .service(root)
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
            .service(
                web::scope("api")
                    .service(health)
                    .service(get_users)
                    .service(get_user),
            )
            .app_data(client.clone())
    })
    .listen(listener)?
    .run();

    Ok(server)
}
