use actix_web::{
    HttpResponse, Responder, ResponseError, get,
    http::StatusCode,
    web::{Data, Json, Path},
};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use thiserror::Error;
use tracing::{error, info};
use utoipa::ToSchema;

use crate::db;
use crate::db::users::{User, UsersDbError};
use crate::routes::ErrorBody;

#[derive(Debug, Error)]
pub enum UserError {
    #[error("User not found with id: {0}")]
    UserNotFound(i64),

    #[error("User id must be a positive integer, got {0}")]
    InvalidUserId(i64),

    #[error(transparent)]
    UsersDb(#[from] UsersDbError),
}

impl UserError {
    pub fn to_message(&self) -> String {
        match self {
            // Do not expose internal database details in error messages
            UserError::UsersDb(UsersDbError::Database(_)) => {
                "An unexpected error occurred".to_string()
            }
            // Every other message is ok, as they do not divulge sensitive information
            e => e.to_string(),
        }
    }
}

impl ResponseError for UserError {
    fn status_code(&self) -> StatusCode {
        match self {
            UserError::UserNotFound(_) => StatusCode::NOT_FOUND,
            UserError::InvalidUserId(_) => StatusCode::BAD_REQUEST,
            UserError::UsersDb(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // The full detail stays in the server-side logs only.
        if let UserError::UsersDb(e) = self {
            error!("failed to serve a users request: {e}");
        }

        let body = ErrorBody::new(self.status_code(), self.to_message());
        let body = match self {
            UserError::InvalidUserId(id) => {
                body.with_field_error("id", format!("must be a positive integer, got {id}"))
            }
            _ => body,
        };

        body.into_response()
    }
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = 1)]
    pub id: i64,
    #[schema(example = "John Doe")]
    pub name: String,
    #[schema(example = "john.doe@example.com")]
    pub email: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
        }
    }
}

#[utoipa::path(
    summary = "Get all users",
    description = "Retrieve a list of all users from the PostgreSQL database.",
    responses(
        (status = 200, description = "Successfully retrieved users", body = Vec<UserResponse>),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    tag = "Users",
)]
#[get("/users")]
pub async fn read_all_users(pool: Data<PgPool>) -> Result<impl Responder, UserError> {
    let users: Vec<UserResponse> = db::users::read_all_users(&**pool)
        .await?
        .into_iter()
        .map(Into::into)
        .collect();

    info!(count = users.len(), "found users");

    Ok(Json(users))
}

#[utoipa::path(
    summary = "Get user by ID",
    description = "Retrieve a specific user by their ID.",
    params(
        ("id" = i64, Path, description = "Id of the user"),
    ),
    responses(
        (status = 200, description = "Successfully retrieved user", body = UserResponse),
        (status = 400, description = "Invalid user id", body = ErrorBody),
        (status = 404, description = "User not found", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody),
    ),
    tag = "Users",
)]
#[get("/users/{id}")]
pub async fn read_user(pool: Data<PgPool>, id: Path<i64>) -> Result<impl Responder, UserError> {
    let user_id = id.into_inner();
    if user_id < 1 {
        return Err(UserError::InvalidUserId(user_id));
    }

    let response: UserResponse = db::users::read_user(&**pool, user_id)
        .await?
        .map(Into::into)
        .ok_or(UserError::UserNotFound(user_id))?;

    info!(user_id, "found user");

    Ok(Json(response))
}
