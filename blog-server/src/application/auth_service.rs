use std::sync::Arc;

use tracing::{info, instrument};
use uuid::Uuid;

use crate::data::session_repository::SessionRepository;
use crate::data::user_repository::UserRepository;
use crate::domain::{
    error::DomainError,
    user::{SeedOutcome, User},
};
use crate::infrastructure::security::{hash_password, verify_password};

pub const DEFAULT_ADMIN_USERNAME: &str = "admin";
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin";

#[derive(Clone)]
pub struct AuthService {
    users: Arc<dyn UserRepository>,
    sessions: Arc<dyn SessionRepository>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, sessions: Arc<dyn SessionRepository>) -> Self {
        Self { users, sessions }
    }

    pub async fn get_user(&self, id: i64) -> Result<User, DomainError> {
        self.users
            .find_by_id(id)
            .await?
            .ok_or(DomainError::UserNotFound(id))
    }

    /// Checks a username/password pair. `Ok(None)` means the credentials were wrong.
    #[instrument(skip(self, password))]
    pub async fn authenticate(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Option<User>, DomainError> {
        let Some(user) = self.users.find_by_username(username).await? else {
            return Ok(None);
        };

        let valid = verify_password(password, &user.password_hash)
            .map_err(|err| DomainError::Internal(format!("stored hash unreadable: {err}")))?;

        Ok(valid.then_some(user))
    }

    /// Binds a fresh session to `user` and returns its token.
    #[instrument(skip(self, user), fields(user_id = user.id))]
    pub async fn login(&self, user: &User) -> Result<Uuid, DomainError> {
        let session_id = self.sessions.create(user.id).await?;
        info!(username = %user.username, "session opened");
        Ok(session_id)
    }

    pub async fn current_user(&self, session_id: Uuid) -> Result<Option<User>, DomainError> {
        match self.sessions.find_user_id(session_id).await? {
            Some(user_id) => self.users.find_by_id(user_id).await,
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    pub async fn logout(&self, session_id: Uuid) -> Result<(), DomainError> {
        self.sessions.delete(session_id).await
    }

    #[instrument(skip(self, password))]
    pub async fn create_user(&self, username: &str, password: &str) -> Result<User, DomainError> {
        if username.is_empty() || username.chars().count() > 150 {
            return Err(DomainError::InvalidInput(
                "username must be between 1 and 150 characters".into(),
            ));
        }

        let hash =
            hash_password(password).map_err(|err| DomainError::Internal(err.to_string()))?;
        self.users.create(username, &hash).await
    }

    /// Creates the account unless one with that username already exists.
    /// An existing account keeps its password.
    pub async fn ensure_user(
        &self,
        username: &str,
        password: &str,
    ) -> Result<SeedOutcome, DomainError> {
        if self.users.find_by_username(username).await?.is_some() {
            return Ok(SeedOutcome::AlreadyExists);
        }

        match self.create_user(username, password).await {
            Ok(_) => Ok(SeedOutcome::Created),
            // lost a race with another seeder
            Err(DomainError::UserAlreadyExists(_)) => Ok(SeedOutcome::AlreadyExists),
            Err(err) => Err(err),
        }
    }
}
