use actix_web::{HttpResponse, Responder, get, web::Data};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::warn;
use utoipa::ToSchema;

/// Actuator-style component status.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq, ToSchema)]
pub enum ComponentStatus {
    #[serde(rename = "UP")]
    Up,
    #[serde(rename = "DOWN")]
    Down,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Component {
    pub status: ComponentStatus,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct Components {
    pub db: Component,
}

/// Health payload served at `/actuator/health`, the liveness and readiness
/// probe target of the deployment manifests.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: ComponentStatus,
    pub components: Components,
}

#[utoipa::path(
    summary = "Service health status",
    description = "Reports service health including database connectivity. \
                   Returns 503 when the database is unreachable.",
    responses(
        (status = 200, description = "Service and database are up", body = HealthResponse),
        (status = 503, description = "Database is unreachable", body = HealthResponse),
    ),
    tag = "Health",
)]
#[get("/actuator/health")]
pub async fn health(pool: Data<PgPool>) -> impl Responder {
    let db_status = match sqlx::query("select 1").execute(&**pool).await {
        Ok(_) => ComponentStatus::Up,
        Err(e) => {
            warn!("database ping failed during health check: {e}");
            ComponentStatus::Down
        }
    };

    let db_is_up = db_status == ComponentStatus::Up;
    let response = HealthResponse {
        status: if db_is_up {
            ComponentStatus::Up
        } else {
            ComponentStatus::Down
        },
        components: Components {
            db: Component { status: db_status },
        },
    };

    if db_is_up {
        HttpResponse::Ok().json(response)
    } else {
        HttpResponse::ServiceUnavailable().json(response)
    }
}
