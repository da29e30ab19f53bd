use std::sync::Arc;

use tracing::{info, warn};

use crate::data::post_repository::{InMemoryPostRepository, PostRepository, PostgresPostRepository};
use crate::data::session_repository::{
    InMemorySessionRepository, PostgresSessionRepository, SessionRepository,
};
use crate::data::user_repository::{InMemoryUserRepository, PostgresUserRepository, UserRepository};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::database::{create_pool, reset_schema, run_migrations};

/// The three repositories, all backed by the same store.
#[derive(Clone)]
pub struct Storage {
    pub users: Arc<dyn UserRepository>,
    pub posts: Arc<dyn PostRepository>,
    pub sessions: Arc<dyn SessionRepository>,
    pub persistent: bool,
}

impl Storage {
    pub fn in_memory() -> Self {
        Self {
            users: Arc::new(InMemoryUserRepository::new()),
            posts: Arc::new(InMemoryPostRepository::new()),
            sessions: Arc::new(InMemorySessionRepository::new()),
            persistent: false,
        }
    }

    pub fn postgres(pool: sqlx::PgPool) -> Self {
        Self {
            users: Arc::new(PostgresUserRepository::new(pool.clone())),
            posts: Arc::new(PostgresPostRepository::new(pool.clone())),
            sessions: Arc::new(PostgresSessionRepository::new(pool)),
            persistent: true,
        }
    }

    /// Opens the store described by `config`, migrating (or resetting) Postgres first.
    pub async fn open(config: &AppConfig) -> anyhow::Result<Self> {
        let Some(database_url) = config.database_url.as_deref() else {
            warn!("DATABASE_URL not set, using in-memory storage; data is lost on exit");
            return Ok(Self::in_memory());
        };

        let pool = create_pool(database_url).await?;
        if config.reset_database {
            reset_schema(&pool).await?;
        } else {
            run_migrations(&pool).await?;
        }
        info!("using PostgreSQL storage");

        Ok(Self::postgres(pool))
    }
}
