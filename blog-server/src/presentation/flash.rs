//! One-shot notices shown on the page a redirect lands on.
//!
//! The cookie carries a short code rather than the message text, so it never
//! needs quoting and a tampered value is simply ignored.

use actix_web::HttpRequest;
use actix_web::cookie::time::Duration;
use actix_web::cookie::{Cookie, SameSite};

pub const FLASH_COOKIE: &str = "flash";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flash {
    PostCreated,
    PostUpdated,
    PostDeleted,
}

impl Flash {
    pub fn message(self) -> &'static str {
        match self {
            Flash::PostCreated => "New post added successfully!",
            Flash::PostUpdated => "Post updated successfully!",
            Flash::PostDeleted => "Post deleted successfully!",
        }
    }

    fn code(self) -> &'static str {
        match self {
            Flash::PostCreated => "post_created",
            Flash::PostUpdated => "post_updated",
            Flash::PostDeleted => "post_deleted",
        }
    }

    fn from_code(code: &str) -> Option<Self> {
        match code {
            "post_created" => Some(Flash::PostCreated),
            "post_updated" => Some(Flash::PostUpdated),
            "post_deleted" => Some(Flash::PostDeleted),
            _ => None,
        }
    }

    pub fn cookie(self) -> Cookie<'static> {
        Cookie::build(FLASH_COOKIE, self.code())
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .max_age(Duration::seconds(60))
            .finish()
    }
}

/// The pending flash on this request, if any.
pub fn read(req: &HttpRequest) -> Option<Flash> {
    req.cookie(FLASH_COOKIE)
        .and_then(|cookie| Flash::from_code(cookie.value()))
}

pub fn has_cookie(req: &HttpRequest) -> bool {
    req.cookie(FLASH_COOKIE).is_some()
}

pub fn clear_cookie() -> Cookie<'static> {
    let mut cookie = Cookie::build(FLASH_COOKIE, "").path("/").finish();
    cookie.make_removal();
    cookie
}
