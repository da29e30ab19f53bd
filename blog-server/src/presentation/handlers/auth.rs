use crate::application::auth_service::AuthService;
use crate::domain::error::DomainError;
use crate::presentation::dto::LoginForm;
use crate::presentation::utils::{AuthenticatedUser, CookieSettings, redirect, request_id};
use crate::presentation::views::Views;
use actix_web::{HttpRequest, HttpResponse, web};
use tera::Context;
use tracing::{info, warn};

pub const LOGIN_FAILED_MESSAGE: &str = "Incorrect username or password!";

pub async fn login_form(
    req: HttpRequest,
    views: web::Data<Views>,
) -> Result<HttpResponse, DomainError> {
    views.page(&req, "login.html", Context::new())
}

/// Bad credentials re-render the form with a message instead of redirecting.
/// A session the browser already holds is replaced, not kept alongside.
pub async fn login(
    req: HttpRequest,
    previous: Option<AuthenticatedUser>,
    service: web::Data<AuthService>,
    views: web::Data<Views>,
    cookies: web::Data<CookieSettings>,
    form: web::Form<LoginForm>,
) -> Result<HttpResponse, DomainError> {
    let Some(user) = service.authenticate(&form.username, &form.password).await? else {
        warn!(
            request_id = %request_id(&req),
            username = %form.username,
            "login failed"
        );

        let mut context = Context::new();
        context.insert("error", LOGIN_FAILED_MESSAGE);
        context.insert("username", &form.username);
        return views.page(&req, "login.html", context);
    };

    if let Some(previous) = previous {
        service.logout(previous.session_id).await?;
    }
    let session_id = service.login(&user).await?;

    info!(
        request_id = %request_id(&req),
        username = %user.username,
        "user logged in"
    );

    Ok(redirect("/dashboard")
        .cookie(cookies.session(session_id))
        .finish())
}

pub async fn logout(
    req: HttpRequest,
    user: AuthenticatedUser,
    service: web::Data<AuthService>,
    cookies: web::Data<CookieSettings>,
) -> Result<HttpResponse, DomainError> {
    service.logout(user.session_id).await?;

    info!(
        request_id = %request_id(&req),
        username = %user.username,
        "user logged out"
    );

    Ok(redirect("/").cookie(cookies.clear_session()).finish())
}
