//! Configuration loading and config file resolution
//!
//! Bootstrap configuration is a single TOML file shared by the mentor and
//! the gateway. Every key is optional; missing keys take built-in defaults.
//!
//! Config file resolution priority:
//! 1. Command-line argument (highest priority)
//! 2. `VIBE_CONFIG` environment variable
//! 3. User config file (`~/.config/code-vibe/config.toml` on Linux)
//! 4. System config file (`/etc/code-vibe/config.toml`, Linux only)
//! 5. Built-in defaults (no file)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "VIBE_CONFIG";

/// Directory name used under the platform config directory
const CONFIG_DIR_NAME: &str = "code-vibe";

/// Complete bootstrap configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TomlConfig {
    pub logging: LoggingConfig,
    pub mentor: MentorConfig,
    pub feedback: FeedbackTuning,
    pub gateway: GatewayConfig,
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level used when `RUST_LOG` is not set (trace, debug, info, warn, error)
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Mentor service settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MentorConfig {
    /// HTTP port for the session control surface
    pub port: u16,
    /// Base URL of the gateway serving `/api/chat`, `/api/validate`, `/api/tts`
    pub gateway_url: String,
    /// Timeout for each gateway request
    pub request_timeout_secs: u64,
    /// Optional catalog file replacing the built-in lessons
    pub catalog_path: Option<PathBuf>,
    /// Event bus buffer size
    pub event_capacity: usize,
}

impl Default for MentorConfig {
    fn default() -> Self {
        Self {
            port: 5791,
            gateway_url: "http://127.0.0.1:5790".to_string(),
            request_timeout_secs: 30,
            catalog_path: None,
            event_capacity: 100,
        }
    }
}

impl MentorConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Live feedback and progression timing knobs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeedbackTuning {
    /// Minimum change in code length (characters) that counts as significant
    pub significance_threshold: usize,
    /// Quiet period after the last significant edit before analysis runs
    pub quiet_period_ms: u64,
    /// Code must be longer than this for a remote tip to be requested
    pub tip_min_code_len: usize,
    /// Remote tips at or above this length are dropped
    pub tip_max_len: usize,
    /// Number of prior messages sent along with a chat request
    pub history_window: usize,
    /// Delay between the success celebration and the badge announcement
    pub badge_delay_ms: u64,
}

impl Default for FeedbackTuning {
    fn default() -> Self {
        Self {
            significance_threshold: 30,
            quiet_period_ms: 4000,
            tip_min_code_len: 50,
            tip_max_len: 60,
            history_window: 4,
            badge_delay_ms: 1000,
        }
    }
}

impl FeedbackTuning {
    pub fn quiet_period(&self) -> Duration {
        Duration::from_millis(self.quiet_period_ms)
    }

    pub fn badge_delay(&self) -> Duration {
        Duration::from_millis(self.badge_delay_ms)
    }

    /// Reject settings that would disable the gate or the debounce
    pub fn validate(&self) -> Result<()> {
        if self.significance_threshold == 0 {
            return Err(Error::Config(
                "feedback.significance_threshold must be greater than 0".to_string(),
            ));
        }
        if self.quiet_period_ms == 0 {
            return Err(Error::Config(
                "feedback.quiet_period_ms must be greater than 0".to_string(),
            ));
        }
        if self.tip_max_len == 0 {
            return Err(Error::Config(
                "feedback.tip_max_len must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

/// Gateway settings
///
/// The upstream API key is never read from the file; see `GROQ_API_KEY`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    pub port: u16,
    /// OpenAI-compatible base URL (chat completions and audio speech)
    pub upstream_url: String,
    pub chat_model: String,
    pub speech_model: String,
    /// Voice used when a TTS request does not name one
    pub voice: String,
    /// Token bucket quota shared by all upstream calls
    pub requests_per_minute: u32,
    pub request_timeout_secs: u64,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            port: 5790,
            upstream_url: "https://api.groq.com/openai/v1".to_string(),
            chat_model: "llama-3.3-70b-versatile".to_string(),
            speech_model: "playai-tts".to_string(),
            voice: "Arista-PlayAI".to_string(),
            requests_per_minute: 30,
            request_timeout_secs: 30,
        }
    }
}

impl GatewayConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl TomlConfig {
    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate cross-field rules
    pub fn validate(&self) -> Result<()> {
        self.feedback.validate()?;
        if self.gateway.requests_per_minute == 0 {
            return Err(Error::Config(
                "gateway.requests_per_minute must be greater than 0".to_string(),
            ));
        }
        if self.mentor.event_capacity == 0 {
            return Err(Error::Config(
                "mentor.event_capacity must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve the config file and load it
    ///
    /// An explicitly requested file (CLI or environment) must exist. When no
    /// file is requested and none is found in the default locations, built-in
    /// defaults are returned with a warning.
    pub fn load(cli_arg: Option<&Path>) -> Result<Self> {
        match resolve_config_path(cli_arg) {
            ConfigSource::Explicit(path) => {
                if !path.exists() {
                    return Err(Error::Config(format!(
                        "Config file not found: {}",
                        path.display()
                    )));
                }
                Self::load_file(&path)
            }
            ConfigSource::Discovered(path) => Self::load_file(&path),
            ConfigSource::Defaults => {
                warn!("No config file found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    fn load_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_toml_str(&content)?;
        info!(path = %path.display(), "Loaded configuration");
        Ok(config)
    }
}

/// Where configuration comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// Named on the command line or in `VIBE_CONFIG`
    Explicit(PathBuf),
    /// Found in a default location
    Discovered(PathBuf),
    /// No file, built-in defaults
    Defaults,
}

/// Resolve the config file following the documented priority order
pub fn resolve_config_path(cli_arg: Option<&Path>) -> ConfigSource {
    // Priority 1: Command-line argument
    if let Some(path) = cli_arg {
        return ConfigSource::Explicit(path.to_path_buf());
    }

    // Priority 2: Environment variable
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return ConfigSource::Explicit(PathBuf::from(path));
        }
    }

    // Priority 3 and 4: default locations
    default_config_candidates()
        .into_iter()
        .find(|p| p.exists())
        .map(ConfigSource::Discovered)
        .unwrap_or(ConfigSource::Defaults)
}

/// Default config file locations for the platform, most specific first
fn default_config_candidates() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Some(dir) = dirs::config_dir() {
        candidates.push(dir.join(CONFIG_DIR_NAME).join("config.toml"));
    }
    if cfg!(target_os = "linux") {
        candidates.push(PathBuf::from("/etc").join(CONFIG_DIR_NAME).join("config.toml"));
    }
    candidates
}
