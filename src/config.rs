use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::explain::DEFAULT_BUDGET;
use crate::graph::DEFAULT_MAX_HOPS;
use crate::recommend::DEFAULT_K;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub data: DataConfig,
    #[serde(default)]
    pub explain: ExplainConfig,
    #[serde(default)]
    pub recommend: RecommendConfig,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Input files produced by the upstream ingestion stage and the model export
#[derive(Debug, Clone, Deserialize)]
pub struct DataConfig {
    /// Knowledge-graph triples (`head_id`, `relation_id`, `tail_id`).
    pub kg_path: PathBuf,
    /// Interaction log (`user_id`, `item_id`, `rating`, `timestamp`).
    pub inter_path: PathBuf,
    /// Optional item metadata for display names.
    #[serde(default)]
    pub items_path: Option<PathBuf>,
    /// Exported model scores as TSV.
    #[serde(default)]
    pub scores_path: Option<PathBuf>,
    /// Exported model scores in the SQLite store; preferred over `scores_path`.
    #[serde(default)]
    pub scores_db: Option<PathBuf>,
}

/// Path search and explanation selection
#[derive(Debug, Clone, Deserialize)]
pub struct ExplainConfig {
    #[serde(default = "default_max_hops")]
    pub max_hops: usize,
    #[serde(default = "default_budget")]
    pub budget: usize,
    #[serde(default = "default_path_cache_capacity")]
    pub path_cache_capacity: usize,
}

impl Default for ExplainConfig {
    fn default() -> Self {
        Self {
            max_hops: default_max_hops(),
            budget: default_budget(),
            path_cache_capacity: default_path_cache_capacity(),
        }
    }
}

/// Recommendation defaults
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendConfig {
    #[serde(default = "default_k")]
    pub default_k: usize,
}

impl Default for RecommendConfig {
    fn default() -> Self {
        Self {
            default_k: default_k(),
        }
    }
}

fn default_max_hops() -> usize {
    DEFAULT_MAX_HOPS
}

fn default_budget() -> usize {
    DEFAULT_BUDGET
}

fn default_path_cache_capacity() -> usize {
    4096
}

fn default_k() -> usize {
    DEFAULT_K
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from a .env file (if present) first, then
    /// reads the path in KGEXPLAIN_CONFIG, or ./config.toml when unset.
    pub fn load() -> Result<Self> {
        let _ = dotenv::dotenv();

        let config_path = std::env::var("KGEXPLAIN_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config.toml"));

        Self::from_file(&config_path)
    }

    /// Load and validate a specific config file
    pub fn from_file(config_path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse {}", config_path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> Result<()> {
        for (key, path) in [("data.kg_path", &self.data.kg_path), ("data.inter_path", &self.data.inter_path)] {
            if !path.is_file() {
                anyhow::bail!("{} does not point to a file: {}", key, path.display());
            }
        }

        if let Some(items) = &self.data.items_path {
            if !items.is_file() {
                anyhow::bail!("data.items_path does not point to a file: {}", items.display());
            }
        }

        if self.data.scores_path.is_none() && self.data.scores_db.is_none() {
            anyhow::bail!("Set data.scores_path or data.scores_db to the exported model scores");
        }

        if self.explain.max_hops == 0 {
            anyhow::bail!("explain.max_hops must be greater than 0");
        }

        if self.explain.budget == 0 {
            anyhow::bail!("explain.budget must be greater than 0");
        }

        if self.recommend.default_k == 0 {
            anyhow::bail!("recommend.default_k must be greater than 0");
        }

        Ok(())
    }
}
