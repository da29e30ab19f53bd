use crate::application::post_service::PostService;
use crate::domain::error::DomainError;
use crate::presentation::dto::PostForm;
use crate::presentation::flash::Flash;
use crate::presentation::utils::{
    AuthenticatedUser, parse_post_id, post_path, redirect, request_id,
};
use crate::presentation::views::Views;
use actix_web::{HttpRequest, HttpResponse, web};
use tera::Context;
use tracing::info;

pub async fn index(
    req: HttpRequest,
    posts: web::Data<PostService>,
    views: web::Data<Views>,
) -> Result<HttpResponse, DomainError> {
    let mut context = Context::new();
    context.insert("posts", &posts.list_posts().await?);
    views.page(&req, "index.html", context)
}

pub async fn dashboard(
    req: HttpRequest,
    _user: AuthenticatedUser,
    posts: web::Data<PostService>,
    views: web::Data<Views>,
) -> Result<HttpResponse, DomainError> {
    let mut context = Context::new();
    context.insert("posts", &posts.list_posts().await?);
    views.page(&req, "dashboard.html", context)
}

pub async fn show_post(
    req: HttpRequest,
    posts: web::Data<PostService>,
    views: web::Data<Views>,
    path: web::Path<String>,
) -> Result<HttpResponse, DomainError> {
    let post_id = parse_post_id(&path)?;
    let post = posts.get_post(post_id).await?;

    let mut context = Context::new();
    context.insert("post", &post);
    views.page(&req, "post.html", context)
}

pub async fn new_post_form(
    req: HttpRequest,
    _user: AuthenticatedUser,
    views: web::Data<Views>,
) -> Result<HttpResponse, DomainError> {
    views.page(&req, "new_post.html", Context::new())
}

pub async fn create_post(
    req: HttpRequest,
    user: AuthenticatedUser,
    posts: web::Data<PostService>,
    form: web::Form<PostForm>,
) -> Result<HttpResponse, DomainError> {
    let PostForm { title, content } = form.into_inner();
    let post = posts.create_post(title, content).await?;

    info!(
        request_id = %request_id(&req),
        username = %user.username,
        post_id = %post.id,
        "post created"
    );

    Ok(redirect(&post_path(post.id))
        .cookie(Flash::PostCreated.cookie())
        .finish())
}

pub async fn edit_post_form(
    req: HttpRequest,
    _user: AuthenticatedUser,
    posts: web::Data<PostService>,
    views: web::Data<Views>,
    path: web::Path<String>,
) -> Result<HttpResponse, DomainError> {
    let post_id = parse_post_id(&path)?;
    let post = posts.get_post(post_id).await?;

    let mut context = Context::new();
    context.insert("post", &post);
    views.page(&req, "edit_post.html", context)
}

pub async fn update_post(
    req: HttpRequest,
    user: AuthenticatedUser,
    posts: web::Data<PostService>,
    path: web::Path<String>,
    form: web::Form<PostForm>,
) -> Result<HttpResponse, DomainError> {
    let post_id = parse_post_id(&path)?;
    let PostForm { title, content } = form.into_inner();
    let post = posts.update_post(post_id, title, content).await?;

    info!(
        request_id = %request_id(&req),
        username = %user.username,
        post_id = %post.id,
        "post updated"
    );

    Ok(redirect(&post_path(post.id))
        .cookie(Flash::PostUpdated.cookie())
        .finish())
}

pub async fn delete_post(
    req: HttpRequest,
    user: AuthenticatedUser,
    posts: web::Data<PostService>,
    path: web::Path<String>,
) -> Result<HttpResponse, DomainError> {
    let post_id = parse_post_id(&path)?;
    posts.delete_post(post_id).await?;

    info!(
        request_id = %request_id(&req),
        username = %user.username,
        post_id = %post_id,
        "post deleted"
    );

    Ok(redirect("/").cookie(Flash::PostDeleted.cookie()).finish())
}
