use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Placeholder in `feed.search_url` replaced by the show name.
pub const SHOW_PLACEHOLDER: &str = "%s";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("No config file found (searched: {0})")]
    NotFound(String),

    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    pub library: LibraryConfig,

    pub feed: FeedConfig,

    #[serde(default)]
    pub downloads: DownloadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub log_level: String,

    /// "pretty" (default) or "json"
    pub log_format: String,

    /// End-of-run summary on stdout: "text" (default) or "json"
    pub report_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            report_format: "text".to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Directory holding one folder per show.
    pub root_path: PathBuf,

    /// Shows to check, in processing order. Each name is also the show's
    /// folder name under `root_path`.
    pub shows: Vec<String>,

    /// Permission bits for newly created show folders (default 0o755)
    #[serde(default = "default_folder_mode")]
    pub folder_mode: u32,

    #[serde(default)]
    pub folder_uid: Option<u32>,

    #[serde(default)]
    pub folder_gid: Option<u32>,
}

const fn default_folder_mode() -> u32 {
    0o755
}

impl LibraryConfig {
    #[must_use]
    pub fn show_path(&self, show_name: &str) -> PathBuf {
        self.root_path.join(show_name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedConfig {
    /// Search feed URL with a single `%s` placeholder for the show name.
    pub search_url: String,

    /// Request timeout in seconds (default: 30)
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

const fn default_request_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    format!("showscout/{}", env!("CARGO_PKG_VERSION"))
}

impl FeedConfig {
    #[must_use]
    pub fn url_for_show(&self, show_name: &str) -> String {
        self.search_url
            .replacen(SHOW_PLACEHOLDER, &urlencoding::encode(show_name), 1)
    }

    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_seconds)
    }
}

/// Where fetched torrents would go. Carried for completeness; nothing in the
/// reconciliation reads these.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DownloadConfig {
    pub download_path: Option<PathBuf>,

    pub watch_path: Option<PathBuf>,
}

impl Config {
    /// Picks the config file to read: `path` when given, otherwise the first
    /// default location that exists.
    ///
    /// # Errors
    /// Returns [`ConfigError::NotFound`] when no default location exists.
    pub fn locate(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
        if let Some(path) = path {
            return Ok(path.to_path_buf());
        }

        let paths = Self::config_paths();
        if let Some(found) = paths.iter().find(|p| p.exists()) {
            return Ok(found.clone());
        }

        let searched = paths
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        Err(ConfigError::NotFound(searched))
    }

    /// # Errors
    /// Returns an error if the file cannot be read or is not valid config TOML.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;

        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("showscout.toml")];

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("showscout").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".showscout").join("config.toml"));
        }

        paths
    }

    /// # Errors
    /// Returns an error describing the first invalid setting found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.library.shows.is_empty() {
            return Err(ConfigError::Invalid(
                "library.shows must list at least one show".to_string(),
            ));
        }

        if let Some(blank) = self.library.shows.iter().position(|s| s.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "library.shows[{blank}] is empty"
            )));
        }

        if self.library.root_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "library.root_path cannot be empty".to_string(),
            ));
        }

        let placeholders = self.feed.search_url.matches(SHOW_PLACEHOLDER).count();
        if placeholders != 1 {
            return Err(ConfigError::Invalid(format!(
                "feed.search_url must contain exactly one '{SHOW_PLACEHOLDER}' placeholder, found {placeholders}"
            )));
        }

        let sample = self.feed.url_for_show("show");
        url::Url::parse(&sample).map_err(|e| {
            ConfigError::Invalid(format!(
                "feed.search_url is not a valid URL ({sample}): {e}"
            ))
        })?;

        if self.feed.request_timeout_seconds == 0 {
            return Err(ConfigError::Invalid(
                "feed.request_timeout_seconds must be > 0".to_string(),
            ));
        }

        if self.general.log_format != "pretty" && self.general.log_format != "json" {
            return Err(ConfigError::Invalid(format!(
                "general.log_format must be \"pretty\" or \"json\", got \"{}\"",
                self.general.log_format
            )));
        }

        if self.general.report_format != "text" && self.general.report_format != "json" {
            return Err(ConfigError::Invalid(format!(
                "general.report_format must be \"text\" or \"json\", got \"{}\"",
                self.general.report_format
            )));
        }

        Ok(())
    }
}
