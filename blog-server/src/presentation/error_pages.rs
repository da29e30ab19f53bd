//! Replaces the bodies of error responses with the templated pages, so errors
//! keep the site's navigation. Covers both `DomainError`s and framework errors
//! such as unmatched routes and rejected form bodies.

use actix_web::body::MessageBody;
use actix_web::dev::ServiceResponse;
use actix_web::http::StatusCode;
use actix_web::http::header::{self, HeaderValue};
use actix_web::middleware::{ErrorHandlerResponse, ErrorHandlers};
use actix_web::{Result, web};
use tracing::error;

use crate::domain::error::{DomainError, INTERNAL_MESSAGE, NOT_FOUND_MESSAGE};
use crate::presentation::views::Views;

pub fn error_pages<B: MessageBody + 'static>() -> ErrorHandlers<B> {
    ErrorHandlers::new()
        .handler(StatusCode::BAD_REQUEST, render_error_page)
        .handler(StatusCode::NOT_FOUND, render_error_page)
        .handler(StatusCode::CONFLICT, render_error_page)
        .handler(StatusCode::INTERNAL_SERVER_ERROR, render_error_page)
}

fn render_error_page<B: MessageBody + 'static>(
    res: ServiceResponse<B>,
) -> Result<ErrorHandlerResponse<B>> {
    let status = res.status();
    let message = res
        .response()
        .error()
        .and_then(|err| err.as_error::<DomainError>())
        .map(DomainError::public_message)
        .unwrap_or_else(|| fallback_message(status).to_string());

    let Some(views) = res.request().app_data::<web::Data<Views>>().cloned() else {
        return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
    };

    let page = match views.error_page(res.request(), status, &message) {
        Ok(page) => page,
        Err(err) => {
            // keep the plain response rather than failing twice
            error!(error = ?err, %status, "error page failed to render");
            return Ok(ErrorHandlerResponse::Response(res.map_into_left_body()));
        }
    };

    let (req, response) = res.into_parts();
    let mut response = response.set_body(page).map_into_boxed_body();
    response.headers_mut().insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );

    Ok(ErrorHandlerResponse::Response(
        ServiceResponse::new(req, response).map_into_right_body(),
    ))
}

fn fallback_message(status: StatusCode) -> &'static str {
    match status {
        StatusCode::NOT_FOUND => NOT_FOUND_MESSAGE,
        StatusCode::BAD_REQUEST => "The submitted form was incomplete or malformed.",
        _ => INTERNAL_MESSAGE,
    }
}
