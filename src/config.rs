use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::RelgraphError;
use crate::graph::MetricOptions;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub relgraph: RelgraphConfig,
    #[serde(default)]
    pub query: QueryConfig,
}

/// Relgraph-specific configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RelgraphConfig {
    /// JSON dataset the CLI reads (and `merge` writes back).
    pub dataset_path: PathBuf,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Treat nodes that differ only in ASCII case as the same node.
    #[serde(default)]
    pub ignore_case: bool,
}

/// Query defaults
#[derive(Debug, Clone, Deserialize)]
pub struct QueryConfig {
    /// Traversal depth; negative means unbounded.
    #[serde(default = "default_depth")]
    pub default_depth: i64,
    #[serde(default)]
    pub log_scale: bool,
    #[serde(default)]
    pub normalize: bool,
    #[serde(default)]
    pub to_scale: bool,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            default_depth: default_depth(),
            log_scale: false,
            normalize: false,
            to_scale: false,
        }
    }
}

fn default_depth() -> i64 {
    -1
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from file
    ///
    /// Loads environment variables from .env file (if present) before loading config.
    /// Looks for config file in this order:
    /// 1. Path specified in RELGRAPH_CONFIG environment variable
    /// 2. ./relgraph.toml in current directory
    pub fn load() -> Result<Self> {
        Self::from_path(&Self::config_path())
    }

    /// Resolve the config file location, loading .env first
    pub fn config_path() -> PathBuf {
        let _ = dotenv::dotenv();

        std::env::var("RELGRAPH_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("relgraph.toml"))
    }

    /// Default settings around an explicit dataset, for running without a
    /// config file
    pub fn for_dataset(dataset_path: PathBuf) -> Self {
        Self {
            relgraph: RelgraphConfig {
                dataset_path,
                log_level: default_log_level(),
                ignore_case: false,
            },
            query: QueryConfig::default(),
        }
    }

    /// Load and validate configuration from an explicit path
    pub fn from_path(config_path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Config = toml::from_str(&config_str)
            .context("Failed to parse relgraph.toml")?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    fn validate(&self) -> crate::error::Result<()> {
        if self.relgraph.dataset_path.as_os_str().is_empty() {
            return Err(RelgraphError::Config(
                "relgraph.dataset_path must not be empty".to_string(),
            ));
        }

        if self.query.to_scale && !self.query.normalize {
            return Err(RelgraphError::Config(
                "query.to_scale requires query.normalize = true".to_string(),
            ));
        }

        Ok(())
    }

    /// Get dataset path
    pub fn dataset_path(&self) -> &Path {
        &self.relgraph.dataset_path
    }

    /// Configured traversal depth; `None` when unbounded
    pub fn default_depth(&self) -> Option<usize> {
        usize::try_from(self.query.default_depth).ok()
    }

    /// Metric post-processing taken from `[query]`
    pub fn metric_options(&self) -> MetricOptions {
        MetricOptions {
            log: self.query.log_scale,
            normalize: self.query.normalize,
            to_scale: self.query.to_scale,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Serialize config tests that mutate process-wide env so they don't race.
    static CONFIG_TEST_LOCK: Mutex<()> = Mutex::new(());

    fn write_config(temp_dir: &TempDir, content: &str) -> PathBuf {
        let config_path = temp_dir.path().join("relgraph.toml");
        fs::write(&config_path, content).unwrap();
        config_path
    }

    #[test]
    fn test_config_load_success() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let temp_dir = TempDir::new().unwrap();
        let config_path = write_config(
            &temp_dir,
            r#"
[relgraph]
dataset_path = "graph.json"
log_level = "debug"
ignore_case = true

[query]
default_depth = 2
normalize = true
to_scale = true
"#,
        );
        let original = std::env::var("RELGRAPH_CONFIG").ok();
        std::env::set_var("RELGRAPH_CONFIG", &config_path);
        let config = Config::load();
        std::env::remove_var("RELGRAPH_CONFIG");
        if let Some(v) = original {
            std::env::set_var("RELGRAPH_CONFIG", v);
        }

        assert!(config.is_ok(), "Config::load() failed: {:?}", config.err());
        let config = config.unwrap();
        assert_eq!(config.relgraph.log_level, "debug");
        assert!(config.relgraph.ignore_case);
        assert_eq!(config.dataset_path(), Path::new("graph.json"));
        assert_eq!(config.default_depth(), Some(2));
        let options = config.metric_options();
        assert!(options.normalize && options.to_scale && !options.log);
    }

    #[test]
    fn test_config_query_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = write_config(
            &temp_dir,
            r#"
[relgraph]
dataset_path = "graph.json"
"#,
        );
        let config = Config::from_path(&config_path).unwrap();
        assert_eq!(config.relgraph.log_level, "info");
        assert!(!config.relgraph.ignore_case);
        assert_eq!(config.default_depth(), None);
        assert_eq!(config.metric_options(), MetricOptions::default());
    }

    #[test]
    fn test_config_rejects_to_scale_without_normalize() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = write_config(
            &temp_dir,
            r#"
[relgraph]
dataset_path = "graph.json"

[query]
to_scale = true
"#,
        );
        let err = Config::from_path(&config_path).unwrap_err();
        assert!(err.to_string().contains("to_scale"));
        assert!(matches!(
            err.downcast_ref::<RelgraphError>(),
            Some(RelgraphError::Config(_))
        ));
    }

    #[test]
    fn test_config_rejects_empty_dataset_path() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = write_config(
            &temp_dir,
            r#"
[relgraph]
dataset_path = ""
"#,
        );
        let err = Config::from_path(&config_path).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<RelgraphError>(),
            Some(RelgraphError::Config(_))
        ));
    }

    #[test]
    fn test_config_for_dataset_uses_defaults() {
        let config = Config::for_dataset(PathBuf::from("g.json"));
        assert!(config.validate().is_ok());
        assert_eq!(config.dataset_path(), Path::new("g.json"));
        assert_eq!(config.relgraph.log_level, "info");
        assert!(!config.relgraph.ignore_case);
        assert_eq!(config.default_depth(), None);
        assert_eq!(config.metric_options(), MetricOptions::default());
    }

    #[test]
    fn test_config_path_follows_env() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let original = std::env::var("RELGRAPH_CONFIG").ok();
        std::env::set_var("RELGRAPH_CONFIG", "elsewhere/relgraph.toml");
        let path = Config::config_path();
        std::env::remove_var("RELGRAPH_CONFIG");
        if let Some(v) = original {
            std::env::set_var("RELGRAPH_CONFIG", v);
        }
        assert_eq!(path, PathBuf::from("elsewhere/relgraph.toml"));
    }

    #[test]
    fn test_config_invalid_path() {
        let _lock = CONFIG_TEST_LOCK.lock().unwrap();
        let original = std::env::var("RELGRAPH_CONFIG").ok();
        std::env::set_var("RELGRAPH_CONFIG", "nonexistent.toml");
        let config = Config::load();
        assert!(config.is_err());
        std::env::remove_var("RELGRAPH_CONFIG");
        if let Some(v) = original {
            std::env::set_var("RELGRAPH_CONFIG", v);
        }
    }
}
