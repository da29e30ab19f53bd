use std::collections::HashMap;

use crate::domain::error::DomainError;
use async_trait::async_trait;
use sqlx::PgPool;
use tokio::sync::RwLock;
use tracing::error;
use uuid::Uuid;

/// Maps opaque session tokens to user ids.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create(&self, user_id: i64) -> Result<Uuid, DomainError>;
    async fn find_user_id(&self, session_id: Uuid) -> Result<Option<i64>, DomainError>;
    async fn delete(&self, session_id: Uuid) -> Result<(), DomainError>;
}

#[derive(Clone)]
pub struct PostgresSessionRepository {
    pool: PgPool,
}

impl PostgresSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for PostgresSessionRepository {
    async fn create(&self, user_id: i64) -> Result<Uuid, DomainError> {
        let session_id = Uuid::new_v4();
        sqlx::query("INSERT INTO sessions (id, user_id) VALUES ($1, $2)")
            .bind(session_id)
            .bind(user_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("failed to create session for user {}: {}", user_id, e);
                DomainError::from(e)
            })?;

        Ok(session_id)
    }

    async fn find_user_id(&self, session_id: Uuid) -> Result<Option<i64>, DomainError> {
        sqlx::query_scalar::<_, i64>("SELECT user_id FROM sessions WHERE id = $1")
            .bind(session_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                error!("failed to look up session: {}", e);
                DomainError::from(e)
            })
    }

    async fn delete(&self, session_id: Uuid) -> Result<(), DomainError> {
        sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(session_id)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                error!("failed to delete session: {}", e);
                DomainError::from(e)
            })?;

        Ok(())
    }
}

#[derive(Default)]
pub struct InMemorySessionRepository {
    sessions: RwLock<HashMap<Uuid, i64>>,
}

impl InMemorySessionRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn create(&self, user_id: i64) -> Result<Uuid, DomainError> {
        let session_id = Uuid::new_v4();
        self.sessions.write().await.insert(session_id, user_id);
        Ok(session_id)
    }

    async fn find_user_id(&self, session_id: Uuid) -> Result<Option<i64>, DomainError> {
        Ok(self.sessions.read().await.get(&session_id).copied())
    }

    async fn delete(&self, session_id: Uuid) -> Result<(), DomainError> {
        self.sessions.write().await.remove(&session_id);
        Ok(())
    }
}
