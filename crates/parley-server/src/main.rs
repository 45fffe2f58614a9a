mod configuration;
mod error;
mod routes;
mod state;

use std::sync::Arc;

use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use parley::capabilities::CapabilityRegistry;
use parley::runtime::OllamaRuntime;

use crate::configuration::Settings;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let settings = Settings::new()?;
    let addr = settings.server.socket_addr();

    // One registry and one runtime for the whole process; requests share
    // them immutably.
    let registry = Arc::new(CapabilityRegistry::standard());
    let runtime = Arc::new(OllamaRuntime::new(settings.runtime.clone().into_config())?);

    let uploads_dir = settings.uploads.dir.clone();
    tokio::fs::create_dir_all(&uploads_dir).await?;

    let state = AppState {
        runtime,
        registry,
        uploads_dir,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = routes::configure(state).layer(cors);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
