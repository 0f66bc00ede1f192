use std::process;
use std::sync::Arc;

use tagdb::config::Settings;
use tagdb::server;
use tagdb::store::TagStore;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let settings = match Settings::load() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&settings.log_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Nothing can be served without the schema in place.
    let store = match TagStore::new(settings.persistence_mode()) {
        Ok(store) => Arc::new(store),
        Err(e) => {
            error!(error = %e, "could not initialize the tag store");
            process::exit(1);
        }
    };
    info!(items = store.item_count(), mode = ?settings.persistence_mode(), "tag store ready");

    let address = settings.address();
    let listener = match tokio::net::TcpListener::bind(&address).await {
        Ok(listener) => listener,
        Err(e) => {
            error!(%address, error = %e, "could not bind");
            process::exit(1);
        }
    };
    info!("Launching on http://{address}");
    if let Err(e) = axum::serve(listener, server::router(store)).await {
        error!(error = %e, "server stopped");
        process::exit(1);
    }
}
