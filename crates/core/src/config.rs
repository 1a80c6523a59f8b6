use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

/// Root console configuration. Loaded from an optional
/// `affiliate-console.toml` and environment variables with the prefix
/// `AFFILIATE_CONSOLE__`.
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub console: ConsoleConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    #[serde(default = "default_session_path")]
    pub path: PathBuf,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ConsoleConfig {
    #[serde(default = "default_quick_search_debounce_ms")]
    pub quick_search_debounce_ms: u64,
    #[serde(default = "default_toast_ttl_secs")]
    pub toast_ttl_secs: u64,
    #[serde(default = "default_export_dir")]
    pub export_dir: PathBuf,
}

// Default functions
fn default_base_url() -> String {
    "http://localhost:5000/api".to_string()
}
fn default_timeout_secs() -> u64 {
    30
}
fn default_user_agent() -> String {
    concat!("affiliate-console/", env!("CARGO_PKG_VERSION")).to_string()
}
fn default_session_path() -> PathBuf {
    PathBuf::from(".affiliate-session")
}
fn default_quick_search_debounce_ms() -> u64 {
    400
}
fn default_toast_ttl_secs() -> u64 {
    5
}
fn default_export_dir() -> PathBuf {
    PathBuf::from(".")
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            path: default_session_path(),
        }
    }
}

impl Default for ConsoleConfig {
    fn default() -> Self {
        Self {
            quick_search_debounce_ms: default_quick_search_debounce_ms(),
            toast_ttl_secs: default_toast_ttl_secs(),
            export_dir: default_export_dir(),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api: ApiConfig::default(),
            session: SessionConfig::default(),
            console: ConsoleConfig::default(),
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl ConsoleConfig {
    pub fn quick_search_debounce(&self) -> Duration {
        Duration::from_millis(self.quick_search_debounce_ms)
    }

    pub fn toast_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.toast_ttl_secs as i64)
    }
}

impl AppConfig {
    /// Load configuration from environment variables and optional config file.
    pub fn load() -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name("affiliate-console").required(false))
            .add_source(
                config::Environment::with_prefix("AFFILIATE_CONSOLE")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(","),
            );

        let config = builder.build()?;
        config.try_deserialize()
    }
}
