//! Configuration file parser for ~/.config/briefing/config.toml.
//!
//! The config file is optional: a missing file yields `Config::default()`.
//! Unknown keys are silently ignored by serde (with `deny_unknown_fields` off),
//! though we log a warning when the file contains potential typos.
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Env var that overrides `api_base_url` from the file.
pub const API_URL_ENV: &str = "BRIEFING_API_URL";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    /// Config file exceeds maximum allowed size.
    #[error("Config file too large: {0}")]
    TooLarge(String),

    /// A value parsed but is out of its allowed range.
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

// ============================================================================
// Configuration Structs
// ============================================================================

/// Top-level application configuration.
///
/// All fields use `#[serde(default)]` so any subset of keys can be specified.
/// Missing keys fall back to `Default::default()`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Root of the article API (`/api/v1/...` is appended).
    pub api_base_url: String,

    /// Articles requested per feed page.
    pub page_size: usize,

    /// Maximum results requested per search.
    pub search_limit: usize,

    /// Quiet period after the last keystroke before a search is issued.
    pub search_debounce_ms: u64,

    /// Queries shorter than this never reach the service.
    pub min_query_chars: usize,

    /// Number of past queries remembered.
    pub history_limit: usize,

    /// How often auto theme mode re-checks the time of day.
    pub theme_refresh_secs: u64,

    /// First local hour (inclusive) resolved as light in auto mode.
    pub day_start_hour: u32,

    /// First local hour (inclusive) resolved as dark again in auto mode.
    pub day_end_hour: u32,

    /// Rows from the end of the list at which the next page is requested.
    pub load_margin_rows: usize,

    /// How often the trending topics are fetched again.
    pub trending_refresh_secs: u64,

    /// Category filters offered alongside "All".
    pub categories: Vec<String>,

    /// Searches suggested while the query box is empty.
    pub suggested_searches: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: "http://127.0.0.1:8000".to_string(),
            page_size: 20,
            search_limit: 10,
            search_debounce_ms: 300,
            min_query_chars: 2,
            history_limit: 5,
            theme_refresh_secs: 60,
            day_start_hour: 6,
            day_end_hour: 18,
            load_margin_rows: 5,
            trending_refresh_secs: 300,
            categories: [
                "World",
                "Business",
                "Technology",
                "AI & Startups",
                "Science",
                "Health",
                "Politics",
                "Culture",
                "Sports",
                "Environment",
                "Education",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            suggested_searches: [
                "Climate Change",
                "AI Technology",
                "Sports News",
                "Politics",
                "Health",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
        }
    }
}

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    const KNOWN_KEYS: [&'static str; 13] = [
        "api_base_url",
        "page_size",
        "search_limit",
        "search_debounce_ms",
        "min_query_chars",
        "history_limit",
        "theme_refresh_secs",
        "day_start_hour",
        "day_end_hour",
        "load_margin_rows",
        "trending_refresh_secs",
        "categories",
        "suggested_searches",
    ];

    /// Load configuration from a TOML file.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Out-of-range values → `Err(ConfigError::Invalid)`
    /// - Unknown keys → silently accepted (serde default behavior), logged as warning
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        // Check file size before reading to avoid slurping a runaway file.
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                // Race condition: file deleted between metadata and read
                tracing::debug!(path = %path.display(), "Config file disappeared, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
        };

        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !Self::KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        tracing::info!(path = %path.display(), api = %config.api_base_url, "Loaded configuration");
        Ok(config)
    }

    /// Apply the `BRIEFING_API_URL` override, if set and non-empty.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var(API_URL_ENV) {
            if !url.trim().is_empty() {
                tracing::debug!(api = %url, "API base URL overridden from environment");
                self.api_base_url = url;
            }
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.page_size == 0 {
            return Err(ConfigError::Invalid("page_size must be at least 1".into()));
        }
        if self.search_limit == 0 {
            return Err(ConfigError::Invalid("search_limit must be at least 1".into()));
        }
        if self.theme_refresh_secs == 0 {
            return Err(ConfigError::Invalid(
                "theme_refresh_secs must be at least 1".into(),
            ));
        }
        if self.trending_refresh_secs == 0 {
            return Err(ConfigError::Invalid(
                "trending_refresh_secs must be at least 1".into(),
            ));
        }
        if self.day_start_hour >= self.day_end_hour || self.day_end_hour > 24 {
            return Err(ConfigError::Invalid(format!(
                "day hours must satisfy start < end <= 24 (got {}..{})",
                self.day_start_hour, self.day_end_hour
            )));
        }
        Ok(())
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn theme_refresh(&self) -> Duration {
        Duration::from_secs(self.theme_refresh_secs)
    }

    pub fn trending_refresh(&self) -> Duration {
        Duration::from_secs(self.trending_refresh_secs)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_config(name: &str, content: &str) -> (PathBuf, PathBuf) {
        let dir = std::env::temp_dir().join(format!("briefing_config_test_{name}"));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.toml");
        std::fs::write(&path, content).unwrap();
        (dir, path)
    }

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_base_url, "http://127.0.0.1:8000");
        assert_eq!(config.page_size, 20);
        assert_eq!(config.search_limit, 10);
        assert_eq!(config.search_debounce(), Duration::from_millis(300));
        assert_eq!(config.min_query_chars, 2);
        assert_eq!(config.history_limit, 5);
        assert_eq!(config.theme_refresh(), Duration::from_secs(60));
        assert_eq!((config.day_start_hour, config.day_end_hour), (6, 18));
        assert_eq!(config.trending_refresh(), Duration::from_secs(300));
        assert_eq!(config.categories.len(), 11);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_returns_default() {
        let path = Path::new("/tmp/briefing_test_nonexistent_config.toml");
        let config = Config::load(path).unwrap();
        assert_eq!(config.page_size, 20);
    }

    #[test]
    fn test_whitespace_only_file_returns_default() {
        let (dir, path) = write_config("whitespace", "   \n  \n  ");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.page_size, 20);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_partial_config_uses_defaults_for_missing() {
        let (dir, path) = write_config("partial", "page_size = 50\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.page_size, 50);
        assert_eq!(config.search_limit, 10); // default
        assert_eq!(config.history_limit, 5); // default
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_full_config() {
        let content = r#"
api_base_url = "https://news.example.com"
page_size = 30
search_limit = 15
search_debounce_ms = 250
min_query_chars = 3
history_limit = 8
theme_refresh_secs = 120
day_start_hour = 7
day_end_hour = 19
load_margin_rows = 2
trending_refresh_secs = 600
categories = ["World", "Science"]
suggested_searches = ["Rust"]
"#;
        let (dir, path) = write_config("full", content);
        let config = Config::load(&path).unwrap();
        assert_eq!(config.api_base_url, "https://news.example.com");
        assert_eq!(config.page_size, 30);
        assert_eq!(config.search_limit, 15);
        assert_eq!(config.search_debounce(), Duration::from_millis(250));
        assert_eq!(config.min_query_chars, 3);
        assert_eq!(config.history_limit, 8);
        assert_eq!(config.theme_refresh(), Duration::from_secs(120));
        assert_eq!((config.day_start_hour, config.day_end_hour), (7, 19));
        assert_eq!(config.load_margin_rows, 2);
        assert_eq!(config.trending_refresh(), Duration::from_secs(600));
        assert_eq!(config.categories, vec!["World", "Science"]);
        assert_eq!(config.suggested_searches, vec!["Rust"]);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_invalid_toml_returns_error() {
        let (dir, path) = write_config("invalid", "this is not [valid toml");
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().contains("Invalid TOML"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_wrong_type_returns_error() {
        let (dir, path) = write_config("wrongtype", "page_size = \"twenty\"\n");
        assert!(Config::load(&path).is_err());
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_unknown_keys_accepted() {
        let (dir, path) = write_config("unknown", "page_size = 25\ntotally_fake_key = 1\n");
        let config = Config::load(&path).unwrap();
        assert_eq!(config.page_size, 25);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let (dir, path) = write_config("zero_page", "page_size = 0\n");
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_zero_trending_refresh_rejected() {
        let (dir, path) = write_config("zero_trending", "trending_refresh_secs = 0\n");
        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("trending_refresh_secs"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_inverted_day_hours_rejected() {
        let (dir, path) = write_config("hours", "day_start_hour = 20\nday_end_hour = 6\n");
        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("day hours"));
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_too_large_file_rejected() {
        let (dir, path) = write_config("too_large", &"a".repeat(1_048_577));
        let err = Config::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::TooLarge(_)));
        assert!(err.to_string().contains("too large"));
        std::fs::remove_dir_all(&dir).ok();
    }
}
