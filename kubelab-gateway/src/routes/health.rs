use actix_web::{HttpResponse, Responder, get, web::Data};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::client::DataServiceClient;

/// Name reported in the health payload.
const SERVICE_NAME: &str = "kubelab-gateway";

/// Health payload of the gateway.
///
/// The gateway itself is always reported healthy when it can answer at all;
/// the upstream data service reachability is reported alongside without
/// affecting the status code.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    #[schema(example = "healthy")]
    pub status: String,
    #[schema(example = "kubelab-gateway")]
    pub service: String,
    #[schema(example = "0.1.0")]
    pub version: String,
    #[schema(example = "connected")]
    pub data_service_status: String,
}

#[utoipa::path(
    summary = "Gateway health status",
    description = "Returns the health status of the gateway and data service connectivity.",
    responses(
        (status = 200, description = "Health check passed", body = HealthResponse),
    ),
    tag = "Health",
)]
#[get("/health")]
pub async fn health(client: Data<DataServiceClient>) -> impl Responder {
    let data_service_status = match client.health().await {
        Ok(status) if status.is_success() => "connected".to_string(),
        Ok(status) => format!("unhealthy (status: {})", status.as_u16()),
        Err(e) => format!("unreachable ({e})"),
    };

    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        service: SERVICE_NAME.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        data_service_status,
    })
}
