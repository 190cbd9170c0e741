use crate::geometry::PieceKind;
use crate::session::SessionConfig;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub piece: String,
    pub rounds: u32,
    pub trials_per_round: usize,
    pub countdown_secs: u32,
    pub response_window_ms: u64,
    pub round_delay_ms: u64,
    pub voice: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            piece: "knight".to_string(),
            rounds: 3,
            trials_per_round: 8,
            countdown_secs: 3,
            response_window_ms: 3000,
            round_delay_ms: 1500,
            voice: false,
        }
    }
}

impl Config {
    pub fn piece_kind(&self) -> PieceKind {
        match self.piece.to_lowercase().as_str() {
            "bishop" => PieceKind::Bishop,
            _ => PieceKind::Knight,
        }
    }

    pub fn to_session_config(&self) -> SessionConfig {
        SessionConfig {
            piece: self.piece_kind(),
            rounds: self.rounds,
            trials_per_round: self.trials_per_round,
            countdown_secs: self.countdown_secs,
            response_window: Duration::from_millis(self.response_window_ms),
            round_delay: Duration::from_millis(self.round_delay_ms),
            voice: self.voice,
        }
    }
}

pub trait ConfigStore {
    fn load(&self) -> Config;
    fn save(&self, cfg: &Config) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "boardsight") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("boardsight_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> Config {
        if let Ok(bytes) = fs::read(&self.path) {
            if let Ok(cfg) = serde_json::from_slice::<Config>(&bytes) {
                return cfg;
            }
        }
        Config::default()
    }

    fn save(&self, cfg: &Config) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
