use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;

use tagblog::cli::{self, Cli, Command};
use tagblog::config::Config;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = Config::from_env()?;
    let pool = tagblog::db::init_pool(&config.database_url).await?;

    match cli.command.unwrap_or(Command::Serve) {
        Command::Serve => {
            let app = tagblog::build_app(pool, &config.media_url);

            let listener = TcpListener::bind(config.bind_addr)
                .await
                .with_context(|| format!("failed to bind {}", config.bind_addr))?;

            tracing::info!("listening on {}", config.bind_addr);
            axum::serve(listener, app).await.context("server error")?;
        }
        Command::CreateUser { username } => {
            cli::create_user(&pool, &username).await?;
        }
        Command::Import { file } => {
            let summary = cli::import_file(&pool, &file).await?;
            println!(
                "Imported {} posts ({} comments, {} likes)",
                summary.posts, summary.comments, summary.likes
            );
        }
    }

    Ok(())
}
