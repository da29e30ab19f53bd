use anyhow::Context;
use blog_server::application::auth_service::{
    AuthService, DEFAULT_ADMIN_PASSWORD, DEFAULT_ADMIN_USERNAME,
};
use blog_server::domain::user::SeedOutcome;
use blog_server::infrastructure::config::AppConfig;
use blog_server::infrastructure::database::{create_pool, reset_schema, run_migrations};
use blog_server::infrastructure::storage::Storage;
use clap::Parser;

/// Maintenance commands for the blog database.
#[derive(Parser, Debug)]
struct Cli {
    /// Overrides DATABASE_URL from the environment.
    #[clap(long)]
    database_url: Option<String>,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Parser, Debug)]
enum Command {
    /// Adds an account unless one with that username exists.
    CreateUser {
        #[clap(long, default_value = DEFAULT_ADMIN_USERNAME)]
        username: String,
        #[clap(long, default_value = DEFAULT_ADMIN_PASSWORD)]
        password: String,
    },
    /// Drops every table and recreates the schema.
    ResetDb,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();

    let database_url = match args.database_url {
        Some(url) => url,
        None => AppConfig::from_env()?
            .database_url
            .context("DATABASE_URL is not set and --database-url was not given")?,
    };

    let pool = create_pool(&database_url)
        .await
        .context("failed to connect to the database")?;

    match args.command {
        Command::CreateUser { username, password } => {
            run_migrations(&pool).await?;
            let storage = Storage::postgres(pool);
            let auth = AuthService::new(storage.users, storage.sessions);

            match auth.ensure_user(&username, &password).await? {
                SeedOutcome::Created => println!("User {username} added successfully."),
                SeedOutcome::AlreadyExists => println!("User {username} already exists."),
            }
        }
        Command::ResetDb => {
            reset_schema(&pool).await?;
            println!("Database reset.");
        }
    }

    Ok(())
}
