use serde::Deserialize;

/// Top-level server configuration, loaded from `emberleap.toml`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub listen_addr: String,
    pub web_root: String,
    /// Directory uploaded episodes are written to.
    pub episodes_dir: String,
    /// Allow cross-origin uploads (game page hosted elsewhere).
    pub allow_any_origin: bool,
    pub limits: LimitsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0:8100".to_string(),
            web_root: "web".to_string(),
            episodes_dir: "episodes".to_string(),
            allow_any_origin: false,
            limits: LimitsConfig::default(),
        }
    }
}

/// Upload size limits.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
    /// Maximum level attempts per episode.
    pub max_levels: usize,
    /// Maximum frames across all attempts of an episode.
    pub max_frames: usize,
    /// Maximum events across all attempts of an episode.
    pub max_events: usize,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: 64 * 1024 * 1024,
            max_levels: 1_000,
            max_frames: 500_000,
            max_events: 100_000,
        }
    }
}

impl ServerConfig {
    /// Check the configuration for values the server cannot run with.
    pub fn validate(&self) -> Result<(), String> {
        if self.listen_addr.parse::<std::net::SocketAddr>().is_err() {
            return Err(format!(
                "listen_addr {:?} is not a valid socket address",
                self.listen_addr
            ));
        }
        if self.episodes_dir.trim().is_empty() {
            return Err("episodes_dir must not be empty".to_string());
        }
        if self.limits.max_body_bytes == 0 {
            return Err("limits.max_body_bytes must be > 0".to_string());
        }
        if self.limits.max_levels == 0 {
            return Err("limits.max_levels must be > 0".to_string());
        }
        if self.limits.max_frames == 0 {
            return Err("limits.max_frames must be > 0".to_string());
        }
        if self.allow_any_origin {
            tracing::warn!("allow_any_origin is set, any web page can upload episodes");
        }
        Ok(())
    }

    /// Load config from `EMBERLEAP_CONFIG` (default `emberleap.toml`) if it
    /// exists, then apply env var overrides.
    pub fn load() -> Self {
        let path =
            std::env::var("EMBERLEAP_CONFIG").unwrap_or_else(|_| "emberleap.toml".to_string());
        let mut config = match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str::<ServerConfig>(&content) {
                Ok(cfg) => {
                    tracing::info!("Loaded configuration from {path}");
                    cfg
                },
                Err(e) => {
                    tracing::warn!("Failed to parse {path}: {e}, using defaults");
                    ServerConfig::default()
                },
            },
            Err(_) => {
                tracing::info!("No {path} found, using defaults");
                ServerConfig::default()
            },
        };

        // Environment variable overrides
        if let Ok(addr) = std::env::var("EMBERLEAP_LISTEN_ADDR")
            && !addr.is_empty()
        {
            config.listen_addr = addr;
        }
        if let Ok(root) = std::env::var("EMBERLEAP_WEB_ROOT")
            && !root.is_empty()
        {
            config.web_root = root;
        }
        if let Ok(dir) = std::env::var("EMBERLEAP_EPISODES_DIR")
            && !dir.is_empty()
        {
            config.episodes_dir = dir;
        }
        if let Ok(val) = std::env::var("EMBERLEAP_MAX_BODY_BYTES")
            && let Ok(n) = val.parse::<usize>()
        {
            config.limits.max_body_bytes = n;
        }
        if let Ok(val) = std::env::var("EMBERLEAP_MAX_FRAMES")
            && let Ok(n) = val.parse::<usize>()
        {
            config.limits.max_frames = n;
        }

        config
    }
}
