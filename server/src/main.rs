use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use todo_server::{app, config, config::Config, cors_layer, store, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loaded before the subscriber so a `.env` file can also set RUST_LOG.
    let dotenv = config::load_dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    match dotenv {
        Ok(Some(path)) => tracing::info!("loaded environment from {}", path.display()),
        Ok(None) => tracing::debug!("no .env file found, using process environment"),
        Err(e) => tracing::warn!("ignoring unreadable .env file: {}", e),
    }

    let config = Config::from_env()?;

    // No degraded mode: without storage the service is useless.
    let store = match store::connect(&config).await {
        Ok(store) => store,
        Err(e) => {
            tracing::error!("unable to connect to storage: {}", e);
            return Err(e.into());
        }
    };

    let state = AppState::from_config(store, &config);
    let cors = cors_layer(&config.cors_origin)?;

    let listener = TcpListener::bind(&config.listen_addr).await?;
    tracing::info!("listening on {}", config.listen_addr);
    todo_server::run(listener, app(state, cors)).await?;
    tracing::info!("server stopped");
    Ok(())
}
