use actix_web::error::{InternalError, PathError};
use actix_web::http::StatusCode;
use actix_web::{HttpRequest, HttpResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use utoipa::ToSchema;

pub mod health;
pub mod users;

/// Structured error payload returned by every error response of this service.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Time at which the error response was produced.
    pub timestamp: DateTime<Utc>,
    /// HTTP status code, repeated in the body.
    #[schema(example = 404)]
    pub status: u16,
    /// Short reason phrase for the status.
    #[schema(example = "Not Found")]
    pub error: String,
    /// Human readable message.
    #[schema(example = "User not found with id: 42")]
    pub message: String,
    /// Per-field validation messages, present only for validation failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<BTreeMap<String, String>>,
}

impl ErrorBody {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            status: status.as_u16(),
            error: status
                .canonical_reason()
                .unwrap_or("Unknown")
                .to_string(),
            message: message.into(),
            field_errors: None,
        }
    }

    pub fn with_field_error(
        mut self,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        self.field_errors
            .get_or_insert_with(BTreeMap::new)
            .insert(field.into(), message.into());
        self
    }

    pub fn into_response(self) -> HttpResponse {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        HttpResponse::build(status).json(self)
    }
}

/// Maps path extraction failures (e.g. a non-numeric `{id}`) to a structured
/// 400 payload with field-level detail instead of actix's plain-text default.
pub fn path_error_handler(err: PathError, _req: &HttpRequest) -> actix_web::Error {
    let body = ErrorBody::new(StatusCode::BAD_REQUEST, "Invalid input parameters")
        .with_field_error("id", err.to_string());
    let response = body.into_response();
    InternalError::from_response(err, response).into()
}
