use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use emberleap_server::build_app;
use emberleap_server::config::{LimitsConfig, ServerConfig};

pub struct TestServer {
    pub addr: SocketAddr,
    pub episodes_dir: PathBuf,
    _shutdown: tokio::task::JoinHandle<()>,
}

impl TestServer {
    /// Start a test server with default limits and a fresh episodes directory.
    pub async fn new() -> Self {
        Self::with_limits(LimitsConfig::default()).await
    }

    pub async fn with_limits(limits: LimitsConfig) -> Self {
        let episodes_dir = temp_episodes_dir();
        let config = ServerConfig {
            listen_addr: "127.0.0.1:0".to_string(),
            episodes_dir: episodes_dir.to_string_lossy().into_owned(),
            limits,
            ..ServerConfig::default()
        };
        Self::from_config(config, episodes_dir).await
    }

    async fn from_config(config: ServerConfig, episodes_dir: PathBuf) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let (app, state) = build_app(config);
        state.store.ensure_dir().await.unwrap();

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Give the server a moment to start accepting
        tokio::time::sleep(Duration::from_millis(20)).await;

        Self {
            addr,
            episodes_dir,
            _shutdown: handle,
        }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self._shutdown.abort();
        let _ = std::fs::remove_dir_all(&self.episodes_dir);
    }
}

/// Unique scratch directory under the system temp dir.
pub fn temp_episodes_dir() -> PathBuf {
    std::env::temp_dir().join(format!("emberleap-episodes-{}", uuid::Uuid::new_v4()))
}
