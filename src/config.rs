use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Result, SearchError};

/// Config file looked up in the working directory when none is given
pub const DEFAULT_CONFIG_FILE: &str = "newsim.yaml";

/// Environment variables read by the CLI for `--corpus` and `--log-level`
pub const ENV_CORPUS: &str = "NEWSIM_CORPUS";
pub const ENV_LOG: &str = "NEWSIM_LOG";

/// Runtime configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// CSV corpus with Article, Date, Heading, NewsType columns
    pub corpus_path: PathBuf,

    /// Result count when a request does not specify one
    pub default_top_k: usize,

    /// Upper bound applied to requested result counts
    pub max_top_k: usize,

    /// Display width of article previews in text output
    pub preview_width: usize,

    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            corpus_path: PathBuf::from("Articles.csv"),
            default_top_k: 5,
            max_top_k: 10,
            preview_width: 200,
            log_level: "info".to_string(),
        }
    }
}

impl Config {
    /// Defaults, then the YAML file (if any). Not validated: callers apply
    /// their overrides first, then call [`validate`](Self::validate).
    ///
    /// An explicitly given `path` must exist; the default file is optional.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(p) => Self::from_file(p)?,
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_FILE))?
            }
            None => Self::default(),
        };

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            SearchError::config(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_yaml(&content)
            .map_err(|e| SearchError::config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| SearchError::config(e.to_string()))
    }

    pub fn validate(&self) -> Result<()> {
        if self.corpus_path.as_os_str().is_empty() {
            return Err(SearchError::config("corpus_path cannot be empty"));
        }
        if self.default_top_k == 0 {
            return Err(SearchError::config("default_top_k must be at least 1"));
        }
        if self.max_top_k < self.default_top_k {
            return Err(SearchError::config(format!(
                "max_top_k ({}) must not be below default_top_k ({})",
                self.max_top_k, self.default_top_k
            )));
        }
        Ok(())
    }
}
