use crate::application::auth_service::{AuthService, DEFAULT_ADMIN_PASSWORD, DEFAULT_ADMIN_USERNAME};
use crate::application::post_service::PostService;
use crate::domain::user::SeedOutcome;
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::storage::Storage;
use crate::presentation::error_pages::error_pages;
use crate::presentation::handlers;
use crate::presentation::middleware::{
    RequestIdMiddleware, RequireLogin, SessionMiddleware, TimingMiddleware,
};
use crate::presentation::utils::CookieSettings;
use crate::presentation::views::Views;
use actix_cors::Cors;
use actix_web::body::MessageBody;
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::middleware::{DefaultHeaders, Logger};
use actix_web::{App, HttpResponse, HttpServer, Responder, web};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};

/// Everything the handlers share, built once at startup.
#[derive(Clone)]
pub struct AppState {
    pub auth: AuthService,
    pub posts: PostService,
    pub views: Views,
    pub cookies: CookieSettings,
}

impl AppState {
    pub fn new(storage: Storage, cookies: CookieSettings) -> anyhow::Result<Self> {
        Ok(Self {
            auth: AuthService::new(storage.users, storage.sessions),
            posts: PostService::new(storage.posts),
            views: Views::new()?,
            cookies,
        })
    }

    fn register(self, cfg: &mut web::ServiceConfig) {
        cfg.app_data(web::Data::new(self.auth))
            .app_data(web::Data::new(self.posts))
            .app_data(web::Data::new(self.views))
            .app_data(web::Data::new(self.cookies))
            .configure(routes);
    }
}

/// The route table. `/post/new` is registered before `/post/{id}` so it is not
/// swallowed by the id pattern.
pub fn routes(cfg: &mut web::ServiceConfig) {
    use handlers::{auth, post};

    cfg.route("/", web::get().to(post::index))
        .route("/health", web::get().to(health))
        .service(
            web::resource("/login")
                .route(web::get().to(auth::login_form))
                .route(web::post().to(auth::login)),
        )
        .service(
            web::resource("/logout")
                .wrap(RequireLogin)
                .route(web::get().to(auth::logout)),
        )
        .service(
            web::resource("/dashboard")
                .wrap(RequireLogin)
                .route(web::get().to(post::dashboard)),
        )
        .service(
            web::resource("/post/new")
                .wrap(RequireLogin)
                .route(web::get().to(post::new_post_form))
                .route(web::post().to(post::create_post)),
        )
        .service(
            web::resource("/post/edit/{id}")
                .wrap(RequireLogin)
                .route(web::get().to(post::edit_post_form))
                .route(web::post().to(post::update_post)),
        )
        .service(
            web::resource("/post/delete/{id}")
                .wrap(RequireLogin)
                .route(web::post().to(post::delete_post)),
        )
        .service(web::resource("/post/{id}").route(web::get().to(post::show_post)));
}

/// The application without transport concerns (CORS, access log), shared by
/// the server and the integration tests.
pub fn build_app(
    state: AppState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .configure(|cfg| state.register(cfg))
        .wrap(error_pages())
        .wrap(SessionMiddleware)
        .wrap(
            DefaultHeaders::new()
                .add(("X-Content-Type-Options", "nosniff"))
                .add(("Referrer-Policy", "no-referrer"))
                .add(("Permissions-Policy", "geolocation=()"))
                .add(("Cross-Origin-Opener-Policy", "same-origin")),
        )
        .wrap(TimingMiddleware)
        .wrap(RequestIdMiddleware)
}

/// Seeds the default account on the throwaway in-memory store so a dev
/// instance can be logged into at all. Persistent stores are seeded with
/// `blog-cli create-user`.
pub async fn seed_if_ephemeral(storage: &Storage, auth: &AuthService) -> anyhow::Result<()> {
    if storage.persistent {
        return Ok(());
    }

    if auth
        .ensure_user(DEFAULT_ADMIN_USERNAME, DEFAULT_ADMIN_PASSWORD)
        .await?
        == SeedOutcome::Created
    {
        warn!(
            username = DEFAULT_ADMIN_USERNAME,
            "seeded default account with default password on in-memory storage"
        );
    }
    Ok(())
}

pub async fn start_server(config: AppConfig, state: AppState) -> anyhow::Result<()> {
    let bind_address = (config.host.clone(), config.port);

    info!(host = %bind_address.0, port = bind_address.1, "HTTP server starting");

    HttpServer::new(move || {
        build_app(state.clone())
            .wrap(build_cors(&config))
            .wrap(Logger::default())
    })
    .bind(bind_address)?
    .run()
    .await
    .map_err(anyhow::Error::new)?;

    info!("HTTP server stopped");
    Ok(())
}

fn build_cors(config: &AppConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST"])
        .allowed_headers(vec![actix_web::http::header::CONTENT_TYPE])
        .supports_credentials()
        .max_age(3600);

    for origin in &config.cors_origins {
        cors = cors.allowed_origin(origin);
    }

    cors
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
}

async fn health() -> impl Responder {
    HttpResponse::Ok().json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
    })
}
