use std::path::{Path, PathBuf};
use std::str::FromStr;

use feud_common::suggest::{env_parse, SuggestConfig};

use crate::error::AppError;

pub const SEED_FILE: &str = "seed.json";

/// Which seed categories a run processes.
///
/// The documented behaviour of this pipeline stops after the first category even
/// though its pacing is written for many; the script it was described from walks
/// every category. `First` follows the documented behaviour, `All` the script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryScope {
    First,
    All,
}

impl FromStr for CategoryScope {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "first" => Ok(Self::First),
            "all" => Ok(Self::All),
            other => Err(AppError::Config(format!(
                "FEUD_CATEGORY_SCOPE must be \"first\" or \"all\", got {other:?}"
            ))),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directory holding `seed.json` and the per-category outputs.
    pub data_dir: PathBuf,
    pub scope: CategoryScope,
    /// Suggestions requested per seed query.
    pub target_count: usize,
    pub suggest: SuggestConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Optional:
    /// - `FEUD_DATA_DIR`: data directory (default `data`)
    /// - `FEUD_CATEGORY_SCOPE`: `first` (default) or `all`
    /// - `FEUD_TARGET_COUNT`: suggestions per query (default 10)
    /// - plus the suggestion client variables read by [`SuggestConfig::from_env`]
    ///
    /// Fails if `<data_dir>/seed.json` does not exist.
    pub fn from_env() -> Result<Self, AppError> {
        let data_dir = std::env::var("FEUD_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("data"));

        let scope = match std::env::var("FEUD_CATEGORY_SCOPE") {
            Ok(raw) => raw.parse()?,
            Err(_) => CategoryScope::First,
        };

        let target_count = env_parse::<usize>("FEUD_TARGET_COUNT")?.unwrap_or(10);
        if target_count == 0 {
            return Err(AppError::Config(
                "FEUD_TARGET_COUNT must be at least 1".to_string(),
            ));
        }

        let seed_file = data_dir.join(SEED_FILE);
        if !seed_file.exists() {
            return Err(AppError::Config(format!(
                "{} not found. Please run from the project root directory.",
                seed_file.display()
            )));
        }

        let mut config = Self::with_data_dir(data_dir);
        config.scope = scope;
        config.target_count = target_count;
        config.suggest = SuggestConfig::from_env()?;
        Ok(config)
    }

    /// Configuration with defaults rooted at `data_dir`, without touching the environment.
    pub fn with_data_dir(data_dir: impl AsRef<Path>) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            scope: CategoryScope::First,
            target_count: 10,
            suggest: SuggestConfig::default(),
        }
    }

    pub fn seed_path(&self) -> PathBuf {
        self.data_dir.join(SEED_FILE)
    }
}
