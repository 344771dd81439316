use anyhow::Context;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use school_scheduler_api::config::{AppConfig, StoreBackend};
use school_scheduler_api::{database, router, state::AppState};

#[derive(Parser, Debug)]
#[command(name = "school-scheduler-api", version, about = "School scheduling administrative API")]
struct Args {
    /// Port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Interface to bind
    #[arg(long, env = "HOST")]
    host: Option<String>,

    /// Record store backend
    #[arg(long, value_enum)]
    store: Option<StoreBackend>,

    /// PostgreSQL connection string
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, STORE_BACKEND, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,sqlx=warn")),
        )
        .init();

    let args = Args::parse();
    let config = apply_args(school_scheduler_api::config::config().clone(), args);
    tracing::info!(
        "Starting School Scheduler API in {:?} mode ({:?} store)",
        config.environment,
        config.database.backend
    );

    let store = database::connect(&config.database).await?;
    let app = router::app(AppState::new(store.clone()), &config);

    let bind_addr = config.bind_addr();
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;
    tracing::info!("Listening on http://{}", bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    store.close().await;
    tracing::info!("Server stopped");
    Ok(())
}

fn apply_args(mut config: AppConfig, args: Args) -> AppConfig {
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(host) = args.host {
        config.server.host = host;
    }
    if let Some(store) = args.store {
        config.database.backend = store;
    }
    if args.database_url.is_some() {
        config.database.url = args.database_url;
    }
    config
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
