use std::sync::Arc;

use crate::config::ServerConfig;
use crate::episode_store::EpisodeStore;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<EpisodeStore>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            store: Arc::new(EpisodeStore::new(&config.episodes_dir)),
            config: Arc::new(config),
        }
    }
}
