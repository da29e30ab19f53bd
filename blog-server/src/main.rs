use blog_server::infrastructure::config::AppConfig;
use blog_server::infrastructure::logging::init_logging;
use blog_server::infrastructure::storage::Storage;
use blog_server::presentation::utils::CookieSettings;
use blog_server::server::{AppState, seed_if_ephemeral, start_server};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = AppConfig::from_env()?;
    let storage = Storage::open(&config).await?;

    let state = AppState::new(
        storage.clone(),
        CookieSettings {
            secure: config.secure_cookies,
        },
    )?;
    seed_if_ephemeral(&storage, &state.auth).await?;

    start_server(config, state).await
}
