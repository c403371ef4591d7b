//! Credential verification and session lifecycle.

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier, password_hash::SaltString,
};
use chrono::{Duration, Utc};
use db::models::{
    session::Session,
    user::{User, UserPublic},
};
use rand::RngCore;
use sqlx::SqlitePool;
use thiserror::Error;
use tracing::{info, warn};

/// Server-side session lifetime. The cookie itself carries no expiry; stale
/// rows are rejected at lookup and swept in the background.
pub const SESSION_TTL_DAYS: i64 = 30;

const TOKEN_BYTES: usize = 32;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0} is required")]
    MissingField(&'static str),
    #[error("user already exists")]
    UserExists,
    #[error("invalid email or password")]
    InvalidCredentials,
    #[error("password hashing failed: {0}")]
    Hash(String),
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// A freshly minted session: the public user plus the opaque token destined
/// for the `session` cookie. The token is a credential, so this stays an
/// internal shape; only `user` is ever serialized.
#[derive(Debug, Clone)]
pub struct AuthSession {
    pub user: UserPublic,
    pub token: String,
}

pub struct AuthService;

impl AuthService {
    /// Register a new account and log it in. Duplicate emails fail with a
    /// deliberately unspecific error.
    pub async fn signup(
        pool: &SqlitePool,
        email: &str,
        password: &str,
        name: &str,
    ) -> Result<AuthSession, AuthError> {
        let email = non_empty(email, "email")?;
        let password = non_empty(password, "password")?;
        let name = non_empty(name, "name")?;

        if User::find_by_email(pool, email).await?.is_some() {
            return Err(AuthError::UserExists);
        }

        let password_hash = Self::hash_password(password)?;
        let user = match User::create(pool, email, name, &password_hash).await {
            Ok(user) => user,
            // Lost a race with a concurrent signup for the same email.
            Err(e) if is_unique_violation(&e) => return Err(AuthError::UserExists),
            Err(e) => return Err(e.into()),
        };

        info!(user_id = user.id, "user registered");
        Self::start_session(pool, user).await
    }

    /// Verify credentials and mint a session. Unknown emails and wrong
    /// passwords are indistinguishable to the caller.
    pub async fn login(
        pool: &SqlitePool,
        email: &str,
        password: &str,
    ) -> Result<AuthSession, AuthError> {
        let email = non_empty(email, "email")?;
        let password = non_empty(password, "password")?;

        let Some(user) = User::find_by_email(pool, email).await? else {
            // Burn a hash anyway so the unknown-email path costs the same
            // as a failed verification.
            let _ = Self::hash_password(password);
            return Err(AuthError::InvalidCredentials);
        };

        if !Self::verify_password(password, &user.password_hash) {
            return Err(AuthError::InvalidCredentials);
        }

        Self::start_session(pool, user).await
    }

    /// Delete the session behind `token` if it exists. Always succeeds.
    pub async fn logout(pool: &SqlitePool, token: &str) -> Result<(), AuthError> {
        let removed = Session::delete_by_token(pool, token).await?;
        if removed > 0 {
            info!("session terminated");
        }
        Ok(())
    }

    /// Resolve the user behind a session token. Read-only; expired or
    /// unknown tokens resolve to `None`.
    pub async fn current_user(
        pool: &SqlitePool,
        token: &str,
    ) -> Result<Option<UserPublic>, AuthError> {
        let Some(session) = Session::find_valid_by_token(pool, token).await? else {
            return Ok(None);
        };
        let user = User::find_by_id(pool, session.user_id).await?;
        Ok(user.map(User::into_public))
    }

    /// 32 bytes from the OS CSPRNG, hex-encoded to 64 characters.
    pub fn generate_token() -> String {
        let mut bytes = [0u8; TOKEN_BYTES];
        rand::rngs::OsRng.fill_bytes(&mut bytes);
        hex::encode(bytes)
    }

    async fn start_session(pool: &SqlitePool, user: User) -> Result<AuthSession, AuthError> {
        let token = Self::generate_token();
        let expires_at = Utc::now() + Duration::days(SESSION_TTL_DAYS);
        Session::create(pool, user.id, &token, expires_at).await?;
        Ok(AuthSession {
            user: user.into_public(),
            token,
        })
    }

    fn hash_password(password: &str) -> Result<String, AuthError> {
        let salt = SaltString::generate(&mut rand::thread_rng());
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AuthError::Hash(e.to_string()))
    }

    fn verify_password(password: &str, stored_hash: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(stored_hash) else {
            warn!("stored password hash is malformed");
            return false;
        };
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }
}

fn non_empty<'a>(value: &'a str, field: &'static str) -> Result<&'a str, AuthError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        Err(AuthError::MissingField(field))
    } else {
        Ok(trimmed)
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    err.as_database_error()
        .is_some_and(|e| e.is_unique_violation())
}
