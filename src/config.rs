use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use crate::error::{ConfigError, Result};
use crate::news::NEWS_COLLECTION;
use crate::summary::api::DEFAULT_BASE_URL;
use crate::summary::SUMMARY_COLLECTION;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub summary_api: SummaryApiConfig,
    #[serde(default)]
    pub storage: StorageSettings,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SummaryApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Root for documents and images; the platform data directory when unset
    #[serde(default)]
    pub data_dir: Option<PathBuf>,

    #[serde(default = "default_news_collection")]
    pub news_collection: String,

    #[serde(default = "default_summary_collection")]
    pub summary_collection: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub json_format: bool,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .map_err(|_| ConfigError::NotFound(path.as_ref().display().to_string()))?;

        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// Load `path` when it exists, otherwise start from defaults. Environment
    /// overrides apply either way.
    pub fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            return Self::load_with_env(path);
        }
        let mut config = Self::default();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.summary_api.base_url)
            .map_err(|_| ConfigError::InvalidUrl(self.summary_api.base_url.clone()))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidUrl(self.summary_api.base_url.clone()));
        }

        if self.summary_api.timeout == 0 {
            return Err(ConfigError::Invalid("Timeout must be greater than 0".to_string()));
        }

        for (name, value) in [
            ("news_collection", &self.storage.news_collection),
            ("summary_collection", &self.storage.summary_collection),
        ] {
            if value.is_empty() {
                return Err(ConfigError::Invalid(format!("{} cannot be empty", name)));
            }
        }

        if self.storage.news_collection == self.storage.summary_collection {
            return Err(ConfigError::Invalid(
                "News and summary collections must differ".to_string(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(base_url) = std::env::var("COVID_NEWS_API_URL") {
            self.summary_api.base_url = base_url;
        }

        if let Ok(timeout) = std::env::var("COVID_NEWS_API_TIMEOUT") {
            if let Ok(val) = timeout.parse() {
                self.summary_api.timeout = val;
            }
        }

        if let Ok(dir) = std::env::var("COVID_NEWS_DATA_DIR") {
            self.storage.data_dir = Some(PathBuf::from(dir));
        }

        if let Ok(level) = std::env::var("COVID_NEWS_LOG_LEVEL") {
            self.logging.level = level;
        }
    }

    /// Directory holding documents and images.
    pub fn resolved_data_dir(&self) -> Result<PathBuf> {
        match &self.storage.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => Self::data_dir(),
        }
    }

    pub fn config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|dir| dir.join("covid-news"))
            .ok_or_else(|| ConfigError::Invalid("Could not determine config directory".to_string()))
    }

    pub fn data_dir() -> Result<PathBuf> {
        dirs::data_dir()
            .map(|dir| dir.join("covid-news"))
            .ok_or_else(|| ConfigError::Invalid("Could not determine data directory".to_string()))
    }

    pub fn default_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }
}

impl Default for SummaryApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout: default_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            data_dir: None,
            news_collection: default_news_collection(),
            summary_collection: default_summary_collection(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json_format: false,
        }
    }
}

fn default_base_url() -> String { DEFAULT_BASE_URL.to_string() }
fn default_timeout() -> u64 { 30 }
fn default_user_agent() -> String {
    format!("covid-news/{}", env!("CARGO_PKG_VERSION"))
}
fn default_news_collection() -> String { NEWS_COLLECTION.to_string() }
fn default_summary_collection() -> String { SUMMARY_COLLECTION.to_string() }
fn default_log_level() -> String { "warn".to_string() }

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        config.validate().unwrap();
        assert_eq!(config.summary_api.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.storage.news_collection, "news");
        assert_eq!(config.storage.summary_collection, "summary");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[summary_api]
base_url = "http://localhost:8080"

[storage]
data_dir = "/tmp/covid-news"
"#,
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.summary_api.base_url, "http://localhost:8080");
        assert_eq!(config.summary_api.timeout, 30);
        assert_eq!(config.resolved_data_dir().unwrap(), PathBuf::from("/tmp/covid-news"));
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");

        let mut config = Config::default();
        config.summary_api.timeout = 5;
        config.save(&path).unwrap();

        let loaded = Config::load(&path).unwrap();
        assert_eq!(loaded.summary_api.timeout, 5);
    }

    #[test]
    fn test_validation_failures() {
        let mut config = Config::default();
        config.summary_api.base_url = "ftp://example.com".to_string();
        assert!(matches!(config.validate(), Err(Error::InvalidUrl(_))));

        let mut config = Config::default();
        config.summary_api.timeout = 0;
        assert!(matches!(config.validate(), Err(Error::Invalid(_))));

        let mut config = Config::default();
        config.storage.summary_collection = "news".to_string();
        assert!(matches!(config.validate(), Err(Error::Invalid(_))));
    }

    #[test]
    fn test_load_or_default_without_file() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_or_default(dir.path().join("absent.toml")).unwrap();
        assert_eq!(config.storage.news_collection, "news");
    }

    #[test]
    fn test_missing_file() {
        let dir = TempDir::new().unwrap();
        let result = Config::load(dir.path().join("absent.toml"));
        assert!(matches!(result, Err(Error::NotFound(_))));
    }

    #[test]
    fn test_invalid_toml() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "summary_api = [").unwrap();
        assert!(matches!(Config::load(&path), Err(Error::Config(_))));
    }
}
