use std::net::SocketAddr;
use std::path::PathBuf;

use tower_http::services::ServeDir;
use tracing::{info, Level};

mod db;
mod rest;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();

    info!("Opening record store");
    let store = db::RecordStore::init().await?;

    // The built frontend is served as static files next to the API.
    let app = rest::app(rest::AppState::new(store))
        .fallback_service(ServeDir::new(PathBuf::from("../frontend/dist")));

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
