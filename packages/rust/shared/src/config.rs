//! Application configuration for counterclaim.
//!
//! User config lives at `~/.counterclaim/counterclaim.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CounterclaimError, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "counterclaim.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".counterclaim";

// ---------------------------------------------------------------------------
// Config structs (matching counterclaim.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Record store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Fact-check source settings.
    #[serde(default)]
    pub source: SourceConfig,

    /// Content transformer settings.
    #[serde(default)]
    pub spoofer: SpooferConfig,

    /// Publication target settings.
    #[serde(default)]
    pub publish: PublishConfig,

    /// Run scheduling settings.
    #[serde(default)]
    pub run: RunConfig,
}

/// `[storage]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the libSQL database file.
    #[serde(default = "default_db_path")]
    pub db_path: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
        }
    }
}

fn default_db_path() -> String {
    "var/counterclaim.db".into()
}

/// `[source]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Base URL of the fact-check listing. Article pages live at
    /// `<base_url><slug>/`.
    #[serde(default = "default_source_url")]
    pub base_url: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: default_source_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_source_url() -> String {
    "https://www.snopes.com/fact-check/".into()
}
fn default_timeout_secs() -> u64 {
    30
}

/// Which content transformer backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SpooferKind {
    /// Deterministic offline transformer, for development and tests.
    Mock,
    /// OpenAI chat-completions backend.
    Openai,
}

/// `[spoofer]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpooferConfig {
    /// Backend selection.
    #[serde(default = "default_spoofer_kind")]
    pub kind: SpooferKind,

    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Model to request from the OpenAI backend.
    #[serde(default = "default_model")]
    pub model: String,

    /// API base URL, overridable for self-hosted gateways and tests.
    #[serde(default = "default_openai_base_url")]
    pub base_url: String,
}

impl Default for SpooferConfig {
    fn default() -> Self {
        Self {
            kind: default_spoofer_kind(),
            api_key_env: default_api_key_env(),
            model: default_model(),
            base_url: default_openai_base_url(),
        }
    }
}

fn default_spoofer_kind() -> SpooferKind {
    SpooferKind::Mock
}
fn default_api_key_env() -> String {
    "OPENAI_API_KEY".into()
}
fn default_model() -> String {
    "gpt-4o-mini".into()
}
fn default_openai_base_url() -> String {
    "https://api.openai.com/v1".into()
}

/// Which publication target backend to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PublisherKind {
    /// Write artifacts to a local directory.
    File,
    /// Keep artifacts in memory, for tests.
    Memory,
}

/// `[publish]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Backend selection.
    #[serde(default = "default_publisher_kind")]
    pub kind: PublisherKind,

    /// Output directory for the file backend.
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            kind: default_publisher_kind(),
            output_dir: default_output_dir(),
        }
    }
}

fn default_publisher_kind() -> PublisherKind {
    PublisherKind::File
}
fn default_output_dir() -> String {
    "var/site".into()
}

/// `[run]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    /// Seconds between scheduled runs in serve mode.
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// How many spoofs the recent-items index lists.
    #[serde(default = "default_recent_limit")]
    pub recent_limit: u32,

    /// Port for the health endpoint in serve mode.
    #[serde(default = "default_health_port")]
    pub health_port: u16,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            recent_limit: default_recent_limit(),
            health_port: default_health_port(),
        }
    }
}

fn default_interval_secs() -> u64 {
    3600
}
fn default_recent_limit() -> u32 {
    21
}
fn default_health_port() -> u16 {
    8080
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.counterclaim/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| CounterclaimError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.counterclaim/counterclaim.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| CounterclaimError::io(path, e))?;

    toml::from_str(&content).map_err(|e| {
        CounterclaimError::config(format!("failed to parse {}: {e}", path.display()))
    })
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| CounterclaimError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| CounterclaimError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| CounterclaimError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Validate the parts of the config that must hold before any run starts.
///
/// The OpenAI backend needs its API key env var set; finding out mid-run
/// would waste a scrape, so this is checked once at startup.
pub fn validate_config(config: &AppConfig) -> Result<()> {
    if config.spoofer.kind == SpooferKind::Openai {
        let var_name = &config.spoofer.api_key_env;
        match std::env::var(var_name) {
            Ok(val) if !val.is_empty() => {}
            _ => {
                return Err(CounterclaimError::config(format!(
                    "OpenAI API key not found. Set the {var_name} environment variable."
                )));
            }
        }
    }

    if config.run.interval_secs == 0 {
        return Err(CounterclaimError::config(
            "run.interval_secs must be greater than zero",
        ));
    }

    Ok(())
}
