//! Background service that garbage-collects expired sessions.

use std::time::Duration;

use db::{DBService, models::session::Session};
use sqlx::SqlitePool;
use thiserror::Error;
use tokio::time::interval;
use tracing::{debug, error, info};

#[derive(Debug, Error)]
pub enum SweeperError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Expired sessions are already invisible to lookups; the sweeper keeps the
/// table from accumulating dead rows.
pub struct SessionSweeper {
    db: DBService,
    poll_interval: Duration,
}

impl SessionSweeper {
    /// Spawn the background sweeper loop.
    pub async fn spawn(db: DBService) -> tokio::task::JoinHandle<()> {
        let sweeper = Self {
            db,
            poll_interval: Duration::from_secs(600), // every 10 minutes
        };
        tokio::spawn(async move {
            sweeper.start().await;
        })
    }

    async fn start(&self) {
        info!(
            "Starting session sweeper with interval {:?}",
            self.poll_interval
        );

        let mut interval = interval(self.poll_interval);

        loop {
            interval.tick().await;
            if let Err(e) = Self::sweep(&self.db.pool).await {
                error!("Error sweeping expired sessions: {}", e);
            }
        }
    }

    /// One sweep pass; returns how many sessions were removed.
    pub async fn sweep(pool: &SqlitePool) -> Result<u64, SweeperError> {
        let removed = Session::delete_expired(pool).await?;
        if removed > 0 {
            info!(removed, "swept expired sessions");
        } else {
            debug!("session sweep: nothing to remove");
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use db::models::user::User;

    use super::*;

    #[tokio::test]
    async fn test_sweep_removes_only_expired_sessions() {
        let db = DBService::new_in_memory().await.unwrap();
        let user = User::create(&db.pool, "alice@example.com", "Alice", "hash")
            .await
            .unwrap();

        Session::create(&db.pool, user.id, "live", Utc::now() + Duration::days(1))
            .await
            .unwrap();
        Session::create(&db.pool, user.id, "stale", Utc::now() - Duration::days(1))
            .await
            .unwrap();

        assert_eq!(SessionSweeper::sweep(&db.pool).await.unwrap(), 1);
        assert!(
            Session::find_valid_by_token(&db.pool, "live")
                .await
                .unwrap()
                .is_some()
        );
        assert_eq!(SessionSweeper::sweep(&db.pool).await.unwrap(), 0);
    }
}
