use async_trait::async_trait;
use sqlx::PgPool;
use time::OffsetDateTime;
use tracing::{debug, error, instrument};

use super::{StoreError, UserStore, hash_session_id, token_expiry};
use crate::models::{ProviderTokens, SessionId, UserRecord};
use crate::utils::constant::SESSION_TOKEN_EXPIRY;

const USER_COLUMNS: &str =
    "id, username, discord_access_token, discord_refresh_token, discord_token_expires_at";

/// PostgreSQL backed user store. Schema lives in `migrations/`.
#[derive(Debug, Clone)]
pub struct PgUserStore {
    db_pool: PgPool,
}

impl PgUserStore {
    pub fn new(db_pool: PgPool) -> Self {
        Self { db_pool }
    }

    /// Runs the embedded migrations.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.db_pool).await
    }

    #[instrument(skip(self))]
    pub async fn create_user(&self, username: &str) -> Result<UserRecord, StoreError> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "INSERT INTO users (username) VALUES ($1) RETURNING {USER_COLUMNS}"
        ))
        .bind(username)
        .fetch_one(&self.db_pool)
        .await?;

        debug!(user_id = user.id, "User created");
        Ok(user)
    }

    /// Opens a session for the user and returns its id. Only the hash is stored.
    #[instrument(skip(self))]
    pub async fn create_session(&self, user_id: i64) -> Result<SessionId, StoreError> {
        let session_id = SessionId::generate();
        let expires_at = OffsetDateTime::now_utc() + SESSION_TOKEN_EXPIRY;

        sqlx::query(
            "INSERT INTO user_sessions (session_hash, user_id, expires_at) VALUES ($1, $2, $3)",
        )
        .bind(hash_session_id(&session_id))
        .bind(user_id)
        .bind(expires_at)
        .execute(&self.db_pool)
        .await?;

        Ok(session_id)
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    #[instrument(skip_all)]
    async fn find_user_by_session(
        &self,
        session_id: &SessionId,
    ) -> Result<Option<UserRecord>, StoreError> {
        sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            SELECT {USER_COLUMNS} FROM users
            WHERE id = (
                SELECT user_id FROM user_sessions
                WHERE session_hash = $1 AND expires_at > NOW()
            )
            "#
        ))
        .bind(hash_session_id(session_id))
        .fetch_optional(&self.db_pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to look up session");
            StoreError::Db(e)
        })
    }

    #[instrument(skip(self))]
    async fn find_user_by_id(&self, user_id: i64) -> Result<Option<UserRecord>, StoreError> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(user_id)
        .fetch_optional(&self.db_pool)
        .await?;

        Ok(user)
    }

    #[instrument(skip(self, tokens))]
    async fn update_user_tokens(
        &self,
        user_id: i64,
        tokens: &ProviderTokens,
    ) -> Result<UserRecord, StoreError> {
        let updated = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            UPDATE users
            SET discord_access_token = $2,
                discord_refresh_token = $3,
                discord_token_expires_at = $4
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user_id)
        .bind(&tokens.access_token)
        .bind(&tokens.refresh_token)
        .bind(token_expiry(tokens))
        .fetch_optional(&self.db_pool)
        .await
        .map_err(|e| {
            error!(error = %e, "Failed to store Discord tokens");
            StoreError::Db(e)
        })?;

        let user = updated.ok_or(StoreError::UserNotFound(user_id))?;
        debug!("Stored Discord tokens");
        Ok(user)
    }
}
