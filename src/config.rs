use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::policy::{Difficulty, TimeLimit};

/// Last-used game settings, persisted between runs. `number_of_secs` of
/// `None` means an unlimited session.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Config {
    pub difficulty: String,
    pub number_of_secs: Option<u32>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            difficulty: "zen".to_string(),
            number_of_secs: Some(60),
        }
    }
}

impl Config {
    pub fn from_settings(difficulty: Difficulty, limit: TimeLimit) -> Self {
        Self {
            difficulty: difficulty.label(),
            number_of_secs: limit.seconds(),
        }
    }

    /// Unknown labels (hand-edited files, older versions) degrade to easy.
    pub fn difficulty(&self) -> Difficulty {
        Difficulty::from_label(&self.difficulty)
    }

    pub fn time_limit(&self) -> TimeLimit {
        match self.number_of_secs {
            Some(secs) if secs > 0 => TimeLimit::Seconds(secs),
            _ => TimeLimit::Infinite,
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
        let path = if let Some(pd) = ProjectDirs::from("", "", "klak") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("klak_config.json")
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
