use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::search::client::{DEFAULT_ACCEPT_LANGUAGE, DEFAULT_USER_AGENT};
use crate::search::request::DEFAULT_BASE_URL;
use crate::search::session::SessionOptions;
use crate::search::SearchFilters;

/// Configuration for the terminal search tool
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    /// Request and extraction settings
    pub search: SearchConfig,

    /// Table and color settings
    pub display: DisplayConfig,

    /// External player settings
    pub player: PlayerConfig,

    /// Log output settings
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Search-results endpoint
    pub base_url: String,

    /// Maximum records per fetched batch
    pub max_results: usize,

    /// Infer filters from query keywords
    pub smart_filters: bool,

    /// Request timeout (seconds)
    pub timeout_seconds: u64,

    /// Browser user agent sent with each request
    pub user_agent: String,

    /// Accept-Language header
    pub accept_language: String,

    /// Filters applied to every search unless overridden
    pub default_filters: SearchFilters,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Colored output
    pub color: bool,

    /// Emit OSC 8 hyperlinks in the URL column
    pub hyperlinks: bool,

    /// Start with the table sorted by view count
    pub sort_by_views: bool,

    /// Show description snippets under each row
    pub show_descriptions: bool,

    /// Maximum title column width
    pub title_width: usize,

    /// Maximum channel column width
    pub channel_width: usize,

    /// Print the ASCII banner in interactive mode
    pub show_banner: bool,

    /// Color names for each element
    pub theme: ThemeConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub accent: String,
    pub header: String,
    pub highlight: String,
    pub error: String,
    pub link: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerConfig {
    /// Players tried in order
    pub players: Vec<String>,

    /// Extra argument for audio-only playback with mpv
    pub audio_only_arg: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level for this crate
    pub level: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            max_results: 25,
            smart_filters: true,
            timeout_seconds: 15,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            accept_language: DEFAULT_ACCEPT_LANGUAGE.to_string(),
            default_filters: SearchFilters::default(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            color: true,
            hyperlinks: true,
            sort_by_views: false,
            show_descriptions: false,
            title_width: 50,
            channel_width: 20,
            show_banner: true,
            theme: ThemeConfig::default(),
        }
    }
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            accent: "bright green".to_string(),
            header: "bright cyan".to_string(),
            highlight: "bright yellow".to_string(),
            error: "bright red".to_string(),
            link: "green".to_string(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            players: vec!["mpv".to_string(), "vlc".to_string()],
            audio_only_arg: "--no-video".to_string(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from the first readable file, then apply environment overrides.
    ///
    /// An explicit path must exist and parse; the default locations are optional.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => Self::from_candidates(&Self::candidate_paths()),
        };

        config.apply_env();
        Ok(config)
    }

    /// Parse a single TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(path)
            .map_err(|e| anyhow!("Cannot read config {}: {}", path.display(), e))?;
        let config = toml::from_str(&config_str)
            .map_err(|e| anyhow!("Invalid config {}: {}", path.display(), e))?;
        tracing::info!("Loaded configuration from: {}", path.display());
        Ok(config)
    }

    /// First candidate that exists and parses; unreadable or invalid files are skipped
    pub fn from_candidates(paths: &[PathBuf]) -> Self {
        for path in paths {
            if !path.exists() {
                continue;
            }
            match Self::from_file(path) {
                Ok(config) => return config,
                Err(e) => tracing::warn!("{}", e),
            }
        }

        tracing::debug!("No configuration file found, using defaults");
        Self::default()
    }

    /// Config file locations, most specific first
    pub fn candidate_paths() -> Vec<PathBuf> {
        let mut paths = vec![
            PathBuf::from("yt-search.toml"),
            PathBuf::from("config/yt-search.toml"),
        ];

        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            paths.push(PathBuf::from(xdg).join("yt-search").join("config.toml"));
        } else if let Ok(home) = std::env::var("HOME") {
            paths.push(PathBuf::from(home).join(".config").join("yt-search").join("config.toml"));
        }

        paths
    }

    /// Override settings from environment variables
    pub fn apply_env(&mut self) {
        self.apply_env_from(|name| std::env::var(name).ok());
    }

    /// Override settings from any variable source. Invalid numbers are ignored.
    pub fn apply_env_from<L>(&mut self, lookup: L)
    where
        L: Fn(&str) -> Option<String>,
    {
        if let Some(max_results) = lookup("YT_SEARCH_MAX_RESULTS") {
            match max_results.trim().parse() {
                Ok(value) => self.search.max_results = value,
                Err(_) => tracing::warn!("Ignoring YT_SEARCH_MAX_RESULTS='{}'", max_results),
            }
        }

        if let Some(timeout) = lookup("YT_SEARCH_TIMEOUT") {
            match timeout.trim().parse() {
                Ok(value) => self.search.timeout_seconds = value,
                Err(_) => tracing::warn!("Ignoring YT_SEARCH_TIMEOUT='{}'", timeout),
            }
        }

        if let Some(base_url) = lookup("YT_SEARCH_BASE_URL") {
            self.search.base_url = base_url;
        }

        if let Some(log_level) = lookup("YT_SEARCH_LOG_LEVEL") {
            self.logging.level = log_level;
        }

        if lookup("NO_COLOR").is_some() || lookup("YT_SEARCH_NO_COLOR").is_some() {
            self.display.color = false;
        }
    }

    /// Save configuration to file
    pub fn save(&self, path: &Path) -> Result<()> {
        let config_str = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, config_str)?;
        tracing::info!("Configuration saved to: {}", path.display());
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.search.max_results == 0 {
            return Err(anyhow!("max_results must be greater than 0"));
        }

        if self.search.timeout_seconds == 0 {
            return Err(anyhow!("timeout_seconds must be greater than 0"));
        }

        Url::parse(&self.search.base_url)
            .map_err(|e| anyhow!("Invalid base_url '{}': {}", self.search.base_url, e))?;

        if self.display.title_width < 10 {
            return Err(anyhow!("title_width must be at least 10"));
        }

        Ok(())
    }

    /// Session settings for the search layer
    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            base_url: self.search.base_url.clone(),
            max_results: self.search.max_results,
            smart_filters: self.search.smart_filters,
        }
    }

    /// Get runtime configuration summary
    pub fn summary(&self) -> String {
        format!(
            "Search Configuration:\n\
            - Endpoint: {}\n\
            - Max Results: {}\n\
            - Smart Filters: {}\n\
            - Default Filters: {}\n\
            - Timeout: {}s\n\
            - Colors: {}\n\
            - Hyperlinks: {}\n\
            - Players: {}",
            self.search.base_url,
            self.search.max_results,
            self.search.smart_filters,
            self.search.default_filters,
            self.search.timeout_seconds,
            self.display.color,
            self.display.hyperlinks,
            self.player.players.join(", ")
        )
    }
}

/// Configuration builder for programmatic config creation
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.config.search.max_results = max_results;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.config.search.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.config.search.timeout_seconds = timeout_seconds;
        self
    }

    pub fn smart_filters(mut self, enable: bool) -> Self {
        self.config.search.smart_filters = enable;
        self
    }

    pub fn color(mut self, enable: bool) -> Self {
        self.config.display.color = enable;
        self
    }

    pub fn sort_by_views(mut self, enable: bool) -> Self {
        self.config.display.sort_by_views = enable;
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::DurationClass;
    use std::collections::HashMap;
    use std::io::Write;
    use std::sync::{Arc, Mutex};
    use tempfile::TempDir;
    use tracing_subscriber::fmt::MakeWriter;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.search.max_results, 25);
        assert!(config.search.smart_filters);
        assert!(!config.display.sort_by_views);
        assert_eq!(config.player.players, vec!["mpv", "vlc"]);
    }

    #[test]
    fn test_config_builder() {
        let config = ConfigBuilder::new()
            .with_max_results(10)
            .smart_filters(false)
            .sort_by_views(true)
            .build();

        assert_eq!(config.search.max_results, 10);
        assert!(!config.search.smart_filters);
        assert!(config.display.sort_by_views);

        let options = config.session_options();
        assert_eq!(options.max_results, 10);
        assert!(!options.smart_filters);
    }

    #[test]
    fn test_config_validation() {
        assert!(Config::default().validate().is_ok());
        assert!(ConfigBuilder::new().with_max_results(0).build().validate().is_err());
        assert!(ConfigBuilder::new().with_timeout(0).build().validate().is_err());
        assert!(ConfigBuilder::new().with_base_url("::nope").build().validate().is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = ConfigBuilder::new().with_max_results(7).color(false).build();
        config.search.default_filters.duration_class = Some(DurationClass::Long);
        config.save(&path).unwrap();

        let loaded = Config::from_file(&path).unwrap();
        assert_eq!(loaded.search.max_results, 7);
        assert!(!loaded.display.color);
        assert_eq!(loaded.search.default_filters.duration_class, Some(DurationClass::Long));
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[search]\nmax_results = 5\n\n[search.default_filters]\nsort_order = \"views\"\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.search.max_results, 5);
        assert_eq!(config.search.timeout_seconds, 15);
        assert_eq!(config.display.title_width, 50);
        assert_eq!(config.search.default_filters.to_string(), "sort=views");
    }

    /// Collects formatted log output so tests can assert on warnings
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<u8>>>);

    impl CapturedLogs {
        fn text(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }
    }

    impl Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    impl<'a> MakeWriter<'a> for CapturedLogs {
        type Writer = CapturedLogs;

        fn make_writer(&'a self) -> Self::Writer {
            self.clone()
        }
    }

    fn env(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| vars.get(name).cloned()
    }

    #[test]
    fn test_invalid_candidate_is_skipped_and_logged() {
        let temp_dir = TempDir::new().unwrap();
        let broken = temp_dir.path().join("yt-search.toml");
        let valid = temp_dir.path().join("config.toml");
        std::fs::write(&broken, "this is = = not toml [").unwrap();
        std::fs::write(&valid, "[search]\nmax_results = 9\n").unwrap();

        let logs = CapturedLogs::default();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(logs.clone())
            .with_max_level(tracing::Level::WARN)
            .with_ansi(false)
            .finish();

        let missing = temp_dir.path().join("missing.toml");
        let config = tracing::subscriber::with_default(subscriber, || {
            Config::from_candidates(&[missing.clone(), broken.clone(), valid.clone()])
        });

        assert_eq!(config.search.max_results, 9);
        let output = logs.text();
        assert!(output.contains("WARN"));
        assert!(output.contains("Invalid config"));
        assert!(output.contains("yt-search.toml"));
    }

    #[test]
    fn test_all_candidates_invalid_falls_back_to_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let broken = temp_dir.path().join("broken.toml");
        std::fs::write(&broken, "[search\nmax_results = ").unwrap();

        let config = Config::from_candidates(&[broken, temp_dir.path().join("absent.toml")]);
        assert_eq!(config.search.max_results, 25);
        assert_eq!(config.search.base_url, DEFAULT_BASE_URL);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config.apply_env_from(env(&[
            ("YT_SEARCH_MAX_RESULTS", "40"),
            ("YT_SEARCH_TIMEOUT", "3"),
            ("YT_SEARCH_BASE_URL", "http://localhost:8080/results"),
            ("YT_SEARCH_LOG_LEVEL", "debug"),
        ]));

        assert_eq!(config.search.max_results, 40);
        assert_eq!(config.search.timeout_seconds, 3);
        assert_eq!(config.search.base_url, "http://localhost:8080/results");
        assert_eq!(config.logging.level, "debug");
        assert!(config.display.color);
    }

    #[test]
    fn test_env_invalid_numbers_ignored() {
        let mut config = ConfigBuilder::new().with_max_results(12).with_timeout(7).build();
        config.apply_env_from(env(&[("YT_SEARCH_MAX_RESULTS", "lots"), ("YT_SEARCH_TIMEOUT", "-1")]));

        assert_eq!(config.search.max_results, 12);
        assert_eq!(config.search.timeout_seconds, 7);
    }

    #[test]
    fn test_env_disables_color() {
        let mut config = Config::default();
        config.apply_env_from(env(&[("NO_COLOR", "")]));
        assert!(!config.display.color);

        let mut config = Config::default();
        config.apply_env_from(env(&[("YT_SEARCH_NO_COLOR", "1")]));
        assert!(!config.display.color);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        assert!(Config::load(Some(&temp_dir.path().join("missing.toml"))).is_err());
    }
}
