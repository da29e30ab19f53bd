use actix_web::http::StatusCode;
use actix_web::{HttpMessage, HttpRequest, HttpResponse};
use serde::Serialize;
use tera::{Context, Tera};

use crate::domain::error::DomainError;
use crate::presentation::flash;
use crate::presentation::utils::AuthenticatedUser;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../../templates/base.html")),
    ("index.html", include_str!("../../templates/index.html")),
    ("dashboard.html", include_str!("../../templates/dashboard.html")),
    ("post.html", include_str!("../../templates/post.html")),
    ("login.html", include_str!("../../templates/login.html")),
    ("new_post.html", include_str!("../../templates/new_post.html")),
    ("edit_post.html", include_str!("../../templates/edit_post.html")),
    ("not_found.html", include_str!("../../templates/not_found.html")),
    ("error.html", include_str!("../../templates/error.html")),
];

#[derive(Serialize)]
struct CurrentUser<'a> {
    username: &'a str,
}

/// Templates compiled into the binary.
#[derive(Clone)]
pub struct Views {
    tera: Tera,
}

impl Views {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TEMPLATES.iter().copied())?;
        Ok(Self { tera })
    }

    /// Renders a full page, adding the signed-in user and any pending flash to `context`.
    /// A shown flash is cleared on the way out.
    pub fn page(
        &self,
        req: &HttpRequest,
        template: &str,
        mut context: Context,
    ) -> Result<HttpResponse, DomainError> {
        let messages: Vec<&str> = flash::read(req).map(|f| f.message()).into_iter().collect();
        context.insert("flash_messages", &messages);

        let body = self.render(req, template, context)?;

        let mut response = HttpResponse::Ok();
        response.content_type("text/html; charset=utf-8");
        if flash::has_cookie(req) {
            response.cookie(flash::clear_cookie());
        }
        Ok(response.body(body))
    }

    /// Error page body: `not_found.html` for 404s, `error.html` otherwise.
    /// Pending flashes are left for the next regular page.
    pub fn error_page(
        &self,
        req: &HttpRequest,
        status: StatusCode,
        message: &str,
    ) -> Result<String, tera::Error> {
        let template = if status == StatusCode::NOT_FOUND {
            "not_found.html"
        } else {
            "error.html"
        };

        let mut context = Context::new();
        context.insert("status", &status.as_u16());
        context.insert("reason", status.canonical_reason().unwrap_or("Error"));
        context.insert("message", message);
        context.insert("flash_messages", &Vec::<&str>::new());
        self.render(req, template, context)
    }

    fn render(
        &self,
        req: &HttpRequest,
        template: &str,
        mut context: Context,
    ) -> Result<String, tera::Error> {
        {
            let extensions = req.extensions();
            let current_user = extensions
                .get::<AuthenticatedUser>()
                .map(|user| CurrentUser {
                    username: &user.username,
                });
            context.insert("current_user", &current_user);
        }

        self.tera.render(template, &context)
    }
}
