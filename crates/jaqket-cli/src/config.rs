//! Configuration loading from TOML files

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Global configuration for the jaqket CLI
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub cache: CacheConfig,
    pub http: HttpConfig,
    pub dataset: DatasetConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    #[serde(deserialize_with = "deserialize_env_path")]
    pub dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        let dir = directories::ProjectDirs::from("", "", "jaqket")
            .map(|dirs| dirs.cache_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("./.jaqket-cache"));
        Self { dir }
    }
}

/// Timeouts in seconds
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub read_timeout: u64,
    pub connect_timeout: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        let defaults = jaqket_core::HttpConfig::default();
        Self {
            read_timeout: defaults.read_timeout.as_secs(),
            connect_timeout: defaults.connect_timeout.as_secs(),
        }
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Default)]
#[serde(default)]
pub struct DatasetConfig {
    /// Overrides the version fallback when `--num-contexts` is not given
    pub num_contexts: Option<usize>,
}

/// Deserialize a path that may be an environment variable reference like ${VAR}
fn deserialize_env_path<'de, D>(deserializer: D) -> Result<PathBuf, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    expand_env_var(&s)
        .map(PathBuf::from)
        .ok_or_else(|| serde::de::Error::custom(format!("environment variable not set: {s}")))
}

/// Expand ${VAR} to environment variable value
fn expand_env_var(s: &str) -> Option<String> {
    if let Some(var_name) = s.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        std::env::var(var_name).ok()
    } else {
        Some(s.to_string())
    }
}

impl Config {
    /// Load configuration from default locations
    ///
    /// Search order:
    /// 1. ./jaqket.toml (current directory)
    /// 2. ~/.config/jaqket/config.toml
    ///
    /// If no config file found, returns default config.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from("jaqket.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        if let Some(config_dir) = directories::ProjectDirs::from("", "", "jaqket") {
            let user_config = config_dir.config_dir().join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.http.read_timeout, 30);
        assert_eq!(config.http.connect_timeout, 30);
        assert!(config.dataset.num_contexts.is_none());
        assert!(!config.cache.dir.as_os_str().is_empty());
    }

    #[test]
    fn expand_env_var_simple() {
        std::env::set_var("JAQKET_TEST_VAR", "test_value");
        assert_eq!(
            expand_env_var("${JAQKET_TEST_VAR}"),
            Some("test_value".to_string())
        );
        std::env::remove_var("JAQKET_TEST_VAR");
    }

    #[test]
    fn expand_env_var_literal() {
        assert_eq!(expand_env_var("literal"), Some("literal".to_string()));
    }

    #[test]
    fn expand_env_var_missing() {
        assert_eq!(expand_env_var("${NONEXISTENT_VAR_12345}"), None);
    }

    #[test]
    fn parse_config_toml() {
        let toml = r#"
[cache]
dir = "/tmp/jaqket"

[http]
read_timeout = 60

[dataset]
num_contexts = 5
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.cache.dir, PathBuf::from("/tmp/jaqket"));
        assert_eq!(config.http.read_timeout, 60);
        assert_eq!(config.http.connect_timeout, 30);
        assert_eq!(config.dataset.num_contexts, Some(5));
    }

    #[test]
    fn cache_dir_from_env() {
        std::env::set_var("JAQKET_TEST_CACHE", "/tmp/from-env");
        let config: Config = toml::from_str("[cache]\ndir = \"${JAQKET_TEST_CACHE}\"\n").unwrap();
        assert_eq!(config.cache.dir, PathBuf::from("/tmp/from-env"));
        std::env::remove_var("JAQKET_TEST_CACHE");
    }

    #[test]
    fn cache_dir_unset_env_is_error() {
        let res = toml::from_str::<Config>("[cache]\ndir = \"${NONEXISTENT_VAR_54321}\"\n");
        assert!(res.is_err());
    }
}
