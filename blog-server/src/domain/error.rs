use actix_web::{
    HttpResponse, ResponseError,
    http::{StatusCode, header},
};
use thiserror::Error;
use tracing::error;
use uuid::Uuid;

pub const LOGIN_PATH: &str = "/login";
pub const NOT_FOUND_MESSAGE: &str = "The page you were looking for does not exist.";
pub const INTERNAL_MESSAGE: &str = "Something went wrong on our side.";

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("user not found: {0}")]
    UserNotFound(i64),
    #[error("user already exists: {0}")]
    UserAlreadyExists(String),
    #[error("post not found: {0}")]
    PostNotFound(Uuid),
    #[error("malformed post id: {0}")]
    MalformedPostId(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("unauthenticated")]
    Unauthenticated,
    #[error("internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for DomainError {
    fn from(err: sqlx::Error) -> Self {
        DomainError::Internal(format!("database error: {err}"))
    }
}

impl From<tera::Error> for DomainError {
    fn from(err: tera::Error) -> Self {
        DomainError::Internal(format!("template error: {err:?}"))
    }
}

impl ResponseError for DomainError {
    fn status_code(&self) -> StatusCode {
        match self {
            DomainError::UserNotFound(_)
            | DomainError::PostNotFound(_)
            | DomainError::MalformedPostId(_) => StatusCode::NOT_FOUND,
            DomainError::Unauthenticated => StatusCode::FOUND,
            DomainError::UserAlreadyExists(_) => StatusCode::CONFLICT,
            DomainError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            DomainError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Plain-text body; `presentation::error_pages` swaps it for the templated page.
    fn error_response(&self) -> HttpResponse {
        match self {
            DomainError::Unauthenticated => HttpResponse::Found()
                .insert_header((header::LOCATION, LOGIN_PATH))
                .finish(),
            _ => {
                if let DomainError::Internal(details) = self {
                    error!(%details, "request failed");
                }
                HttpResponse::build(self.status_code())
                    .content_type("text/plain; charset=utf-8")
                    .body(self.public_message())
            }
        }
    }
}

impl DomainError {
    /// What the visitor is told. Internal details stay in the log.
    pub fn public_message(&self) -> String {
        match self {
            DomainError::UserNotFound(_)
            | DomainError::PostNotFound(_)
            | DomainError::MalformedPostId(_) => NOT_FOUND_MESSAGE.to_string(),
            DomainError::InvalidInput(message) => message.clone(),
            DomainError::UserAlreadyExists(_) => self.to_string(),
            DomainError::Unauthenticated => "Please log in to continue.".to_string(),
            DomainError::Internal(_) => INTERNAL_MESSAGE.to_string(),
        }
    }
}
