//! Configuration management with TOML, environment variables, and CLI overrides.

use crate::verdict::Policy;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use tracing::debug;

/// Upper bound on review pages visited per product.
pub const MAX_PAGE_CAP: u32 = 10;

/// Application configuration with layered loading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Maximum number of review pages visited per product
    #[serde(default = "default_page_cap")]
    pub page_cap: u32,

    /// Minimum length of a review title, in characters
    #[serde(default = "default_min_title_len")]
    pub min_title_len: usize,

    /// Minimum length of a review body, in characters
    #[serde(default = "default_min_body_len")]
    pub min_body_len: usize,

    /// Minimum length of free text used when no review bodies are found
    #[serde(default = "default_min_general_len")]
    pub min_general_len: usize,

    /// Upper bound on each wait for page content to render
    #[serde(default = "default_ready_timeout_ms")]
    pub ready_timeout_ms: u64,

    /// Scroll distance applied before each extraction
    #[serde(default = "default_scroll_offset")]
    pub scroll_offset: i64,

    /// Aggregation policy for the final verdict
    #[serde(default)]
    pub policy: Policy,

    /// Proxy URL (e.g., socks5://host:port)
    #[serde(default)]
    pub proxy: Option<String>,

    /// Base delay between requests in milliseconds
    #[serde(default = "default_delay_ms")]
    pub delay_ms: u64,

    /// Random jitter added to delay (0 to this value)
    #[serde(default = "default_delay_jitter_ms")]
    pub delay_jitter_ms: u64,

    /// Output format
    #[serde(default)]
    pub format: OutputFormat,
}

fn default_page_cap() -> u32 {
    3
}

fn default_min_title_len() -> usize {
    4
}

fn default_min_body_len() -> usize {
    10
}

fn default_min_general_len() -> usize {
    30
}

fn default_ready_timeout_ms() -> u64 {
    10_000
}

fn default_scroll_offset() -> i64 {
    500
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_delay_jitter_ms() -> u64 {
    1000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            page_cap: default_page_cap(),
            min_title_len: default_min_title_len(),
            min_body_len: default_min_body_len(),
            min_general_len: default_min_general_len(),
            ready_timeout_ms: default_ready_timeout_ms(),
            scroll_offset: default_scroll_offset(),
            policy: Policy::default(),
            proxy: None,
            delay_ms: default_delay_ms(),
            delay_jitter_ms: default_delay_jitter_ms(),
            format: OutputFormat::Table,
        }
    }
}

impl Config {
    /// Creates a new default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading config from: {}", path.display());

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads configuration with fallback to default locations.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit_path {
            return Self::from_file(path);
        }

        let local_config = Path::new("review-verdict.toml");
        if local_config.exists() {
            debug!("Found review-verdict.toml in current directory");
            return Self::from_file(local_config);
        }

        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join("review-verdict").join("config.toml");
            if xdg_config.exists() {
                debug!("Found config in XDG config directory");
                return Self::from_file(xdg_config);
            }
        }

        debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Applies environment variable overrides.
    pub fn with_env(mut self) -> Self {
        if let Ok(proxy) = std::env::var("RV_PROXY") {
            self.proxy = Some(proxy);
        }

        if let Ok(delay) = std::env::var("RV_DELAY") {
            if let Ok(d) = delay.parse() {
                self.delay_ms = d;
            }
        }

        if let Ok(pages) = std::env::var("RV_PAGES") {
            if let Ok(p) = pages.parse() {
                self.page_cap = p;
            }
        }

        if let Ok(policy) = std::env::var("RV_POLICY") {
            if let Ok(p) = policy.parse() {
                self.policy = p;
            }
        }

        self
    }

    /// Page cap clamped to `1..=MAX_PAGE_CAP`.
    pub fn effective_page_cap(&self) -> u32 {
        self.page_cap.clamp(1, MAX_PAGE_CAP)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }
}

/// Output format for results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Markdown,
    Csv,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "table" => Ok(OutputFormat::Table),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "csv" => Ok(OutputFormat::Csv),
            _ => Err(format!("Unknown format: {}. Use: table, json, markdown, csv", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.page_cap, 3);
        assert_eq!(config.min_title_len, 4);
        assert_eq!(config.min_body_len, 10);
        assert_eq!(config.min_general_len, 30);
        assert_eq!(config.ready_timeout_ms, 10_000);
        assert_eq!(config.scroll_offset, 500);
        assert_eq!(config.policy, Policy::Percentage);
        assert_eq!(config.format, OutputFormat::Table);
        assert!(config.proxy.is_none());
    }

    #[test]
    fn test_effective_page_cap() {
        let mut config = Config::new();
        assert_eq!(config.effective_page_cap(), 3);

        config.page_cap = 0;
        assert_eq!(config.effective_page_cap(), 1);

        config.page_cap = 50;
        assert_eq!(config.effective_page_cap(), MAX_PAGE_CAP);
    }

    #[test]
    fn test_ready_timeout() {
        let config = Config { ready_timeout_ms: 250, ..Config::default() };
        assert_eq!(config.ready_timeout(), Duration::from_millis(250));
    }

    #[test]
    fn test_output_format_parsing() {
        assert_eq!("table".parse::<OutputFormat>().unwrap(), OutputFormat::Table);
        assert_eq!("JSON".parse::<OutputFormat>().unwrap(), OutputFormat::Json);
        assert_eq!("md".parse::<OutputFormat>().unwrap(), OutputFormat::Markdown);
        assert_eq!("csv".parse::<OutputFormat>().unwrap(), OutputFormat::Csv);

        let err = "invalid".parse::<OutputFormat>().unwrap_err();
        assert!(err.contains("Unknown format"));
        assert!(err.contains("table, json, markdown, csv"));
    }

    #[test]
    fn test_output_format_display() {
        assert_eq!(OutputFormat::Table.to_string(), "table");
        assert_eq!(OutputFormat::Json.to_string(), "json");
        assert_eq!(OutputFormat::Markdown.to_string(), "markdown");
        assert_eq!(OutputFormat::Csv.to_string(), "csv");
    }

    #[test]
    fn test_config_from_toml() {
        let toml = r#"
            page_cap = 5
            min_body_len = 20
            policy = "count-majority"
            format = "json"
        "#;

        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.page_cap, 5);
        assert_eq!(config.min_body_len, 20);
        assert_eq!(config.min_title_len, 4);
        assert_eq!(config.policy, Policy::CountMajority);
        assert_eq!(config.format, OutputFormat::Json);
    }

    #[test]
    fn test_config_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
            proxy = "socks5://localhost:1080"
            ready_timeout_ms = 2500
            "#
        )
        .unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.proxy.as_deref(), Some("socks5://localhost:1080"));
        assert_eq!(config.ready_timeout_ms, 2500);
    }

    #[test]
    fn test_config_from_file_not_found() {
        let result = Config::from_file("/nonexistent/path/config.toml");
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Failed to read config file"));
    }

    #[test]
    fn test_config_from_file_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "not valid toml {{{{").unwrap();

        let err = Config::from_file(file.path()).unwrap_err().to_string();
        assert!(err.contains("Failed to parse config file"));
    }

    #[test]
    fn test_config_load_explicit_path() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "page_cap = 7").unwrap();

        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.page_cap, 7);
    }

    #[test]
    fn test_config_with_env() {
        let orig_pages = std::env::var("RV_PAGES").ok();
        let orig_policy = std::env::var("RV_POLICY").ok();

        std::env::set_var("RV_PAGES", "6");
        std::env::set_var("RV_POLICY", "count-majority");

        let config = Config::new().with_env();
        assert_eq!(config.page_cap, 6);
        assert_eq!(config.policy, Policy::CountMajority);

        std::env::set_var("RV_PAGES", "50");
        let config = Config::new().with_env();
        assert_eq!(config.page_cap, 50);
        assert_eq!(config.effective_page_cap(), MAX_PAGE_CAP);

        std::env::set_var("RV_PAGES", "many");
        let config = Config::new().with_env();
        assert_eq!(config.page_cap, 3);

        match orig_pages {
            Some(v) => std::env::set_var("RV_PAGES", v),
            None => std::env::remove_var("RV_PAGES"),
        }
        match orig_policy {
            Some(v) => std::env::set_var("RV_POLICY", v),
            None => std::env::remove_var("RV_POLICY"),
        }
    }
}
