use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Environment variables consulted for the API key, in order
pub const API_KEY_ENV_VARS: [&str; 2] = ["GEMINI_API_KEY", "VITE_GEMINI_API_KEY"];

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// API key for the Gemini API
    pub gemini_api_key: Option<String>,

    /// Model used for `generateContent`
    pub model: String,

    /// API root, without a trailing slash
    pub base_url: String,

    /// UI preferences
    pub ui: UiConfig,

    /// Gemchat home directory
    #[serde(skip)]
    pub home: PathBuf,
}

/// What Stop does with text revealed so far
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopBehavior {
    /// Throw the partial reply away
    #[default]
    Discard,
    /// Keep the partial reply as a bot message
    Commit,
}

/// UI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub typing_interval_ms: u64,
    pub strip_emphasis: bool,
    pub on_stop: StopBehavior,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            typing_interval_ms: 10,
            strip_emphasis: true,
            on_stop: StopBehavior::Discard,
        }
    }
}

impl UiConfig {
    pub fn typing_interval(&self) -> Duration {
        Duration::from_millis(self.typing_interval_ms.max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            gemini_api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            ui: UiConfig::default(),
            home: default_home(),
        }
    }
}

fn default_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".gemchat")
}

impl Config {
    /// Path of the default config file
    pub fn default_path() -> PathBuf {
        default_home().join("config.toml")
    }

    /// Load configuration from `path`, or the default location when `None`.
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = path.map(Path::to_path_buf).unwrap_or_else(Self::default_path);

        let mut config = if config_path.exists() {
            let content = fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config file {}", config_path.display()))?;
            Self::from_toml(&content)
                .with_context(|| format!("Failed to parse config file {}", config_path.display()))?
        } else {
            Config::default()
        };

        // a bare file name has an empty parent
        config.home = match config_path.parent() {
            Some(parent) if parent.as_os_str().is_empty() => PathBuf::from("."),
            Some(parent) => parent.to_path_buf(),
            None => default_home(),
        };

        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    /// Where the TUI writes its log file
    pub fn log_path(&self) -> PathBuf {
        self.home.join("gemchat.log")
    }

    /// Get API key from config or environment
    pub fn api_key(&self) -> Option<String> {
        self.api_key_with(|name| std::env::var(name).ok())
    }

    /// Resolve the API key using `lookup` for environment variables
    pub fn api_key_with<F>(&self, lookup: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        self.gemini_api_key
            .clone()
            .filter(|key| !key.trim().is_empty())
            .or_else(|| {
                API_KEY_ENV_VARS
                    .iter()
                    .filter_map(|&name| lookup(name))
                    .find(|key| !key.trim().is_empty())
            })
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.model, "gemini-2.0-flash");
        assert_eq!(config.ui.typing_interval_ms, 10);
        assert!(config.ui.strip_emphasis);
        assert_eq!(config.ui.on_stop, StopBehavior::Discard);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            model = "gemini-1.5-pro"

            [ui]
            on_stop = "commit"
            "#,
        )
        .unwrap();

        assert_eq!(config.model, "gemini-1.5-pro");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.ui.on_stop, StopBehavior::Commit);
        assert_eq!(config.ui.typing_interval_ms, 10);
    }

    #[test]
    fn test_malformed_toml_is_error() {
        assert!(Config::from_toml("model = [").is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.home, dir.path());
        assert_eq!(config.log_path(), dir.path().join("gemchat.log"));
    }

    #[test]
    fn test_load_bare_file_name_uses_current_dir() {
        let config = Config::load(Some(Path::new("gemchat-missing.toml"))).unwrap();
        assert_eq!(config.home, PathBuf::from("."));
        assert_eq!(config.log_path(), Path::new(".").join("gemchat.log"));
    }

    #[test]
    fn test_load_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "gemini_api_key = \"from-file\"\n").unwrap();

        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.gemini_api_key.as_deref(), Some("from-file"));
    }

    #[test]
    fn test_api_key_prefers_config() {
        let config = Config {
            gemini_api_key: Some("cfg".to_string()),
            ..Config::default()
        };
        let key = config.api_key_with(|_| Some("env".to_string()));
        assert_eq!(key.as_deref(), Some("cfg"));
    }

    #[test]
    fn test_api_key_falls_back_through_env_vars() {
        let config = Config::default();
        let key = config.api_key_with(|name| {
            (name == "VITE_GEMINI_API_KEY").then(|| "vite".to_string())
        });
        assert_eq!(key.as_deref(), Some("vite"));

        assert_eq!(config.api_key_with(|_| None), None);
    }

    #[test]
    fn test_blank_api_key_ignored() {
        let config = Config {
            gemini_api_key: Some("  ".to_string()),
            ..Config::default()
        };
        assert_eq!(config.api_key_with(|_| Some(String::new())), None);
    }
}
