use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool};

/// Server-side session row backing the `session` cookie. The token is an
/// opaque credential, so the row is never serialized to clients.
#[derive(Debug, Clone, FromRow)]
pub struct Session {
    pub id: i64,
    pub token: String,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

const SESSION_COLUMNS: &str = "id, token, user_id, expires_at, created_at";

impl Session {
    pub fn is_expired(&self) -> bool {
        self.expires_at < Utc::now()
    }

    pub async fn create(
        pool: &SqlitePool,
        user_id: i64,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Self, sqlx::Error> {
        sqlx::query_as::<_, Session>(&format!(
            "INSERT INTO sessions (token, user_id, expires_at)
             VALUES ($1, $2, $3)
             RETURNING {SESSION_COLUMNS}"
        ))
        .bind(token)
        .bind(user_id)
        .bind(expires_at)
        .fetch_one(pool)
        .await
    }

    /// Look up a session by token, skipping rows that have already expired.
    pub async fn find_valid_by_token(
        pool: &SqlitePool,
        token: &str,
    ) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, Session>(&format!(
            "SELECT {SESSION_COLUMNS} FROM sessions
             WHERE token = $1 AND datetime(expires_at) > datetime('now')"
        ))
        .bind(token)
        .fetch_optional(pool)
        .await
    }

    pub async fn delete_by_token(pool: &SqlitePool, token: &str) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE token = $1")
            .bind(token)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn delete_expired(pool: &SqlitePool) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM sessions WHERE datetime(expires_at) <= datetime('now')")
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}
