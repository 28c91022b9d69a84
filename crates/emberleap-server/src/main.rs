use tracing_subscriber::EnvFilter;

use emberleap_server::build_app;
use emberleap_server::config::ServerConfig;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let config = ServerConfig::load();
    if let Err(e) = config.validate() {
        tracing::error!("Invalid configuration: {e}");
        std::process::exit(1);
    }

    let addr = config.listen_addr.clone();
    let (app, state) = build_app(config);

    if let Err(e) = state.store.ensure_dir().await {
        tracing::error!(dir = %state.store.dir().display(), "Cannot create episodes directory: {e}");
        std::process::exit(1);
    }

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind to {addr}: {e}");
            std::process::exit(1);
        },
    };

    tracing::info!("Emberleap server listening on {addr}");
    tracing::info!(
        dir = %state.store.dir().display(),
        "Episodes will be saved to the episodes directory"
    );

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("Server error: {e}");
        std::process::exit(1);
    }
}
