use sqlx::PgExecutor;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UsersDbError {
    #[error("Error while interacting with Postgres for users: {0}")]
    Database(#[from] sqlx::Error),
}

/// A row of the `users` table.
#[derive(Debug, sqlx::FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
}

pub async fn read_all_users<'c, E>(executor: E) -> Result<Vec<User>, UsersDbError>
where
    E: PgExecutor<'c>,
{
    let users = sqlx::query_as::<_, User>(
        r#"
        select id, name, email
        from users
        order by id
        "#,
    )
    .fetch_all(executor)
    .await?;

    Ok(users)
}

pub async fn read_user<'c, E>(executor: E, user_id: i64) -> Result<Option<User>, UsersDbError>
where
    E: PgExecutor<'c>,
{
    let user = sqlx::query_as::<_, User>(
        r#"
        select id, name, email
        from users
        where id = $1
        "#,
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await?;

    Ok(user)
}
