use actix_web::{
    HttpResponse, Responder, ResponseError, get,
    http::{StatusCode, header::ContentType},
    web::{Data, Json, Path},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;
use utoipa::ToSchema;

use crate::client::{DataServiceClient, UpstreamError};
use crate::routes::ErrorResponse;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User with ID {0} not found")]
    UserNotFound(i64),

    #[error("Data service error: {body}")]
    Upstream { status: StatusCode, body: String },

    #[error("Data service unavailable: {0}")]
    Unavailable(String),
}

impl UserError {
    /// Maps an upstream failure on the single-user route, turning an upstream
    /// 404 into the gateway's own not-found message.
    fn for_user(user_id: i64, error: UpstreamError) -> Self {
        match error {
            UpstreamError::ErrorStatus { status, .. } if status == StatusCode::NOT_FOUND => {
                UserError::UserNotFound(user_id)
            }
            error => error.into(),
        }
    }
}

impl From<UpstreamError> for UserError {
    fn from(error: UpstreamError) -> Self {
        match error {
            UpstreamError::ErrorStatus { status, body } => UserError::Upstream { status, body },
            UpstreamError::Unreachable(e) => UserError::Unavailable(e.to_string()),
        }
    }
}

impl ResponseError for UserError {
    fn status_code(&self) -> StatusCode {
        match self {
            UserError::UserNotFound(_) => StatusCode::NOT_FOUND,
            // The upstream status is passed through unchanged.
            UserError::Upstream { status, .. } => *status,
            UserError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let UserError::Unavailable(detail) = self {
            error!("data service unreachable: {detail}");
        }

        let error_response = ErrorResponse {
            detail: self.to_string(),
            status_code: self.status_code().as_u16(),
        };
        let body =
            serde_json::to_string(&error_response).expect("failed to serialize error message");
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .body(body)
    }
}

/// User as returned by the data service and passed through by the gateway.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct User {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "john.doe@example.com")]
    pub email: String,
}

#[utoipa::path(
    summary = "Get all users",
    description = "Retrieves all users from the data service.",
    responses(
        (status = 200, description = "Successfully retrieved users", body = Vec<User>),
        (status = 503, description = "Data service unavailable", body = ErrorResponse),
    ),
    tag = "Users",
)]
#[get("/users")]
pub async fn get_users(client: Data<DataServiceClient>) -> Result<impl Responder, UserError> {
    let users: Vec<User> = client.get_users().await?;

    Ok(Json(users))
}

#[utoipa::path(
    summary = "Get user by ID",
    description = "Retrieves a specific user by ID from the data service.",
    params(
        ("id" = i64, Path, description = "Id of the user"),
    ),
    responses(
        (status = 200, description = "Successfully retrieved user", body = User),
        (status = 404, description = "User not found", body = ErrorResponse),
        (status = 503, description = "Data service unavailable", body = ErrorResponse),
    ),
    tag = "Users",
)]
#[get("/users/{id}")]
pub async fn get_user(
    client: Data<DataServiceClient>,
    id: Path<i64>,
) -> Result<impl Responder, UserError> {
    let user_id = id.into_inner();

    let user: User = client
        .get_user(user_id)
        .await
        .map_err(|e| UserError::for_user(user_id, e))?;

    Ok(Json(user))
}
