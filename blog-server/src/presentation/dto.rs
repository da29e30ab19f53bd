use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Body of both the new-post and edit-post forms.
#[derive(Debug, Deserialize)]
pub struct PostForm {
    pub title: String,
    pub content: String,
}
