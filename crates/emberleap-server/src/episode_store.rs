use std::path::{Path, PathBuf};

use emberleap_core::episode::Episode;

const FILE_PREFIX: &str = "episode_";
const FILE_SUFFIX: &str = ".json";

/// Failure while reading or writing stored episodes.
#[derive(Debug)]
pub enum StoreError {
    /// The requested name is not an episode file name.
    InvalidName(String),
    NotFound(String),
    Io(std::io::Error),
    Json(serde_json::Error),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(name) => write!(f, "invalid episode name: {name}"),
            Self::NotFound(name) => write!(f, "episode {name} not found"),
            Self::Io(e) => write!(f, "episode storage I/O error: {e}"),
            Self::Json(e) => write!(f, "episode encoding error: {e}"),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<std::io::Error> for StoreError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(e)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

/// Whether `name` looks like a file written by [`EpisodeStore::save`].
pub fn is_episode_file(name: &str) -> bool {
    name.starts_with(FILE_PREFIX)
        && name.ends_with(FILE_SUFFIX)
        && name.len() > FILE_PREFIX.len() + FILE_SUFFIX.len()
        && !name.contains(['/', '\\'])
        && !name.contains("..")
}

/// Fresh file name: `episode_<unix-secs>_<short-uuid>.json`.
pub fn episode_file_name() -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "{FILE_PREFIX}{}_{}{FILE_SUFFIX}",
        emberleap_core::time::unix_secs(),
        &id[..8]
    )
}

/// Flat directory of pretty-printed episode JSON files.
#[derive(Debug, Clone)]
pub struct EpisodeStore {
    dir: PathBuf,
}

impl EpisodeStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the episode directory if it does not exist yet.
    pub async fn ensure_dir(&self) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    /// Write `episode` to a new file and return the file name.
    pub async fn save(&self, episode: &Episode) -> Result<String, StoreError> {
        self.ensure_dir().await?;
        let name = episode_file_name();
        let body = serde_json::to_vec_pretty(episode)?;
        tokio::fs::write(self.dir.join(&name), body).await?;
        tracing::info!(
            file = %name,
            episode = %episode.id,
            levels = episode.levels.len(),
            frames = episode.total_frames(),
            "Saved episode"
        );
        Ok(name)
    }

    /// Names of all stored episodes, sorted. A missing directory is empty.
    pub async fn list(&self) -> Result<Vec<String>, StoreError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };
        let mut names = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            if let Some(name) = entry.file_name().to_str()
                && is_episode_file(name)
            {
                names.push(name.to_string());
            }
        }
        names.sort();
        Ok(names)
    }

    /// Read a stored episode back.
    pub async fn load(&self, name: &str) -> Result<Episode, StoreError> {
        if !is_episode_file(name) {
            return Err(StoreError::InvalidName(name.to_string()));
        }
        let bytes = match tokio::fs::read(self.dir.join(name)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(name.to_string()));
            },
            Err(e) => return Err(e.into()),
        };
        Ok(serde_json::from_slice(&bytes)?)
    }
}
