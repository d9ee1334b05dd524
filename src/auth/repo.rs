use sqlx::PgPool;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::auth::password::HASH_ALGORITHM;
use crate::auth::repo_types::User;

const USER_COLUMNS: &str = "id, username, display_name, email, password_hash, hash_algorithm, \
                            created_at, updated_at, last_login";

/// Fields for a new user row. `username`/`email` must already be lowercase.
#[derive(Debug)]
pub struct NewUser<'a> {
    pub username: &'a str,
    pub display_name: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
}

/// Insert failures. The duplicate variants come from the unique indexes on
/// `LOWER(username)` / `LOWER(email)` and are how a lost registration race
/// surfaces; the check-then-insert in the gate is only an early exit.
#[derive(Debug, thiserror::Error)]
pub enum InsertUserError {
    #[error("username already taken")]
    DuplicateUsername,
    #[error("email already taken")]
    DuplicateEmail,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

impl User {
    pub async fn insert(db: &PgPool, new: NewUser<'_>) -> Result<User, InsertUserError> {
        let result = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (username, display_name, email, password_hash, hash_algorithm)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#,
        ))
        .bind(new.username)
        .bind(new.display_name)
        .bind(new.email)
        .bind(new.password_hash)
        .bind(HASH_ALGORITHM)
        .fetch_one(db)
        .await;

        match result {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(db_err)) => match db_err.constraint() {
                Some("idx_users_username_lower") => Err(InsertUserError::DuplicateUsername),
                Some("idx_users_email_lower") => Err(InsertUserError::DuplicateEmail),
                _ => Err(sqlx::Error::Database(db_err).into()),
            },
            Err(e) => Err(e.into()),
        }
    }

    pub async fn find_by_id(db: &PgPool, id: Uuid) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"SELECT {USER_COLUMNS} FROM users WHERE id = $1"#,
        ))
        .bind(id)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Find a user by the lowercase form of their username.
    pub async fn find_by_lower_username(db: &PgPool, username: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"SELECT {USER_COLUMNS} FROM users WHERE LOWER(username) = $1"#,
        ))
        .bind(username)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Find a user by the lowercase form of their email.
    pub async fn find_by_lower_email(db: &PgPool, email: &str) -> anyhow::Result<Option<User>> {
        let user = sqlx::query_as::<_, User>(&format!(
            r#"SELECT {USER_COLUMNS} FROM users WHERE LOWER(email) = $1"#,
        ))
        .bind(email)
        .fetch_optional(db)
        .await?;
        Ok(user)
    }

    /// Stamp a successful login, returning the new timestamp.
    pub async fn update_last_login(db: &PgPool, id: Uuid) -> anyhow::Result<OffsetDateTime> {
        let (last_login,): (OffsetDateTime,) = sqlx::query_as(
            r#"
            UPDATE users
            SET last_login = now(), updated_at = now()
            WHERE id = $1
            RETURNING last_login
            "#,
        )
        .bind(id)
        .fetch_one(db)
        .await?;
        Ok(last_login)
    }
}
