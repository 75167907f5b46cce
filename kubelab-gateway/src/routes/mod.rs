use actix_web::{HttpResponse, Responder, get};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

pub mod health;
pub mod users;

/// Standard error payload returned by the gateway.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    /// Error message.
    #[schema(example = "User with ID 42 not found")]
    pub detail: String,
    /// HTTP status code, repeated in the body.
    #[schema(example = 404)]
    pub status_code: u16,
}

/// Welcome document pointing at the interesting endpoints.
#[get("/")]
pub async fn root() -> impl Responder {
    HttpResponse::Ok().json(serde_json::json!({
        "message": "Welcome to the kubelab API gateway",
        "docs": "/swagger-ui/",
        "health": "/api/health",
    }))
}
