//! Credential store: account rows live here and nowhere else.
//!
//! Email uniqueness is enforced by the UNIQUE constraint in the schema, not
//! by a lookup-then-insert in application code, so concurrent registrations
//! of the same address cannot race.

use thiserror::Error;

use super::{DbPool, User};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("email is already registered")]
    DuplicateEmail,
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("database error")]
    Unavailable(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.message().contains("UNIQUE constraint failed") {
                return StoreError::DuplicateEmail;
            }
        }
        StoreError::Unavailable(err)
    }
}

/// Insert a new account and return its generated id.
pub async fn create_user(
    pool: &DbPool,
    name: &str,
    email: &str,
    password_hash: &str,
) -> Result<String, StoreError> {
    if name.is_empty() {
        return Err(StoreError::MissingField("name"));
    }
    if email.is_empty() {
        return Err(StoreError::MissingField("email"));
    }
    if password_hash.is_empty() {
        return Err(StoreError::MissingField("password_hash"));
    }

    let id = uuid::Uuid::new_v4().to_string();
    let created_at = chrono::Utc::now().to_rfc3339();

    sqlx::query("INSERT INTO users (id, name, email, password_hash, created_at) VALUES (?, ?, ?, ?, ?)")
        .bind(&id)
        .bind(name)
        .bind(email)
        .bind(password_hash)
        .bind(&created_at)
        .execute(pool)
        .await?;

    Ok(id)
}

pub async fn find_by_email(pool: &DbPool, email: &str) -> Result<Option<User>, StoreError> {
    let user: Option<User> = sqlx::query_as("SELECT * FROM users WHERE email = ?")
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn count_users(pool: &DbPool) -> Result<i64, StoreError> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    Ok(count.0)
}
