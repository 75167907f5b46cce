use anyhow::anyhow;
use kubelab_config::{Environment, load_config};
use kubelab_gateway::{config::GatewayConfig, startup::Application};
use kubelab_telemetry::tracing::init_tracing;
use std::env;
use std::sync::Arc;
use tracing::{error, info};

fn main() -> anyhow::Result<()> {
    // Initialize tracing from the binary name
    let _log_flusher = init_tracing(env!("CARGO_BIN_NAME"))?;

    // Initialize Sentry before the async runtime starts
    let _sentry_guard = init_sentry()?;

    // We start the runtime.
    actix_web::rt::System::new().block_on(async_main())?;

    Ok(())
}

async fn async_main() -> anyhow::Result<()> {
    if env::args().len() != 1 {
        let message = "the gateway does not take command line arguments";
        error!("{message}");
        return Err(anyhow!(message));
    }

    let config = load_config::<GatewayConfig>()?;
    info!(
        data_service_url = config.data_service.base_url,
        "upstream data service",
    );

    let application = Application::build(config).await?;
    application.run_until_stopped().await?;

    Ok(())
}

fn init_sentry() -> anyhow::Result<Option<sentry::ClientInitGuard>> {
    if let Ok(config) = load_config::<GatewayConfig>()
        && let Some(sentry_config) = &config.sentry
    {
        info!("initializing sentry with supplied dsn");

        let environment = Environment::load()?;
        let guard = sentry::init(sentry::ClientOptions {
            dsn: Some(sentry_config.dsn.parse()?),
            environment: Some(environment.to_string().into()),
            traces_sample_rate: 1.0,
            max_request_body_size: sentry::MaxRequestBodySize::Always,
            integrations: vec![Arc::new(
                sentry::integrations::panic::PanicIntegration::new(),
            )],
            ..Default::default()
        });

        // Set service tag to differentiate the gateway from the data service
        sentry::configure_scope(|scope| {
            scope.set_tag("service", "gateway");
        });

        return Ok(Some(guard));
    }

    info!("sentry not configured for the gateway, skipping initialization");

    Ok(None)
}
