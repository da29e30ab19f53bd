use std::sync::Arc;

use crate::data::post_repository::PostRepository;
use crate::domain::{
    error::DomainError,
    post::{MAX_TITLE_LEN, Post},
};
use tracing::instrument;
use uuid::Uuid;

#[derive(Clone)]
pub struct PostService {
    repo: Arc<dyn PostRepository>,
}

impl PostService {
    pub fn new(repo: Arc<dyn PostRepository>) -> Self {
        Self { repo }
    }

    pub async fn get_post(&self, id: Uuid) -> Result<Post, DomainError> {
        self.repo
            .find_by_id(id)
            .await?
            .ok_or(DomainError::PostNotFound(id))
    }

    pub async fn list_posts(&self) -> Result<Vec<Post>, DomainError> {
        self.repo.list_all().await
    }

    #[instrument(skip(self, content))]
    pub async fn create_post(&self, title: String, content: String) -> Result<Post, DomainError> {
        validate_title(&title)?;
        self.repo.create(Post::new(title, content)).await
    }

    /// Overwrites title and content. Concurrent updates are last-write-wins.
    #[instrument(skip(self, content))]
    pub async fn update_post(
        &self,
        id: Uuid,
        title: String,
        content: String,
    ) -> Result<Post, DomainError> {
        validate_title(&title)?;
        self.repo
            .update(id, title, content)
            .await?
            .ok_or(DomainError::PostNotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn delete_post(&self, id: Uuid) -> Result<(), DomainError> {
        if self.repo.delete(id).await? {
            Ok(())
        } else {
            Err(DomainError::PostNotFound(id))
        }
    }
}

fn validate_title(title: &str) -> Result<(), DomainError> {
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(DomainError::InvalidInput(format!(
            "title must be at most {MAX_TITLE_LEN} characters"
        )));
    }
    Ok(())
}
