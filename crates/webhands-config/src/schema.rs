//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ConfigError;
use crate::loader::ConfigLoader;

/// Environment variable consulted when `llm.api_key` is not set.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

fn default_true() -> bool {
    true
}

/// Root configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub agent: AgentConfig,

    #[serde(default)]
    pub browser: BrowserConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub actions: ActionsConfig,

    #[serde(default)]
    pub retry: RetryConfig,
}

impl Config {
    /// Expand `~` in every path-valued setting.
    pub fn expand_paths(&mut self) {
        self.agent.debug_dir = expand(&self.agent.debug_dir);
        if let Some(dir) = &self.browser.profile_dir {
            self.browser.profile_dir = Some(expand(dir));
        }
        if let Some(exe) = &self.browser.executable {
            self.browser.executable = Some(expand(exe));
        }
    }
}

fn expand(path: &std::path::Path) -> PathBuf {
    PathBuf::from(ConfigLoader::expand_path(&path.to_string_lossy()))
}

/// Agent loop settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Cancel tasks after this many steps; unbounded when unset.
    #[serde(default)]
    pub max_steps: Option<usize>,

    #[serde(default = "default_token_limit")]
    pub token_limit: usize,

    #[serde(default)]
    pub debug: bool,

    #[serde(default = "default_debug_dir")]
    pub debug_dir: PathBuf,

    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    #[serde(default)]
    pub stop_on_complete: bool,

    #[serde(default = "default_true")]
    pub highlight: bool,

    #[serde(default)]
    pub viewport_only: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_steps: None,
            token_limit: default_token_limit(),
            debug: false,
            debug_dir: default_debug_dir(),
            settle_delay_ms: default_settle_delay_ms(),
            stop_on_complete: false,
            highlight: true,
            viewport_only: false,
        }
    }
}

impl AgentConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }
}

fn default_token_limit() -> usize {
    128_000
}

fn default_debug_dir() -> PathBuf {
    PathBuf::from("debug")
}

fn default_settle_delay_ms() -> u64 {
    2000
}

/// Browser connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    /// DevTools endpoint (`http://host:port` or `ws://...`). When unset, a
    /// local browser is used on `debug_port`.
    #[serde(default)]
    pub endpoint: Option<String>,

    #[serde(default = "default_debug_port")]
    pub debug_port: u16,

    #[serde(default)]
    pub headless: bool,

    /// Launch a local browser when none is listening.
    #[serde(default = "default_true")]
    pub launch: bool,

    #[serde(default)]
    pub executable: Option<PathBuf>,

    #[serde(default)]
    pub profile_dir: Option<PathBuf>,

    #[serde(default = "default_viewport_width")]
    pub viewport_width: u32,

    #[serde(default = "default_viewport_height")]
    pub viewport_height: u32,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            endpoint: None,
            debug_port: default_debug_port(),
            headless: false,
            launch: true,
            executable: None,
            profile_dir: None,
            viewport_width: default_viewport_width(),
            viewport_height: default_viewport_height(),
        }
    }
}

fn default_debug_port() -> u16 {
    9222
}

fn default_viewport_width() -> u32 {
    1280
}

fn default_viewport_height() -> u32 {
    720
}

/// Language model settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default = "default_provider")]
    pub provider: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default)]
    pub temperature: Option<f32>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: default_provider(),
            model: default_model(),
            api_key: None,
            base_url: default_base_url(),
            temperature: None,
        }
    }
}

impl LlmConfig {
    /// The configured key, else `OPENAI_API_KEY`.
    pub fn resolve_api_key(&self) -> Result<String, ConfigError> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| {
                std::env::var(OPENAI_API_KEY_ENV)
                    .ok()
                    .filter(|k| !k.trim().is_empty())
            })
            .ok_or(ConfigError::MissingApiKey)
    }
}

fn default_provider() -> String {
    "openai".to_string()
}

fn default_model() -> String {
    "gpt-4o".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

/// Optional built-in actions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActionsConfig {
    /// Enable `analyzePdf`.
    #[serde(default)]
    pub pdf_analysis: bool,
}

/// Retry policy for snapshots and model calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_attempts")]
    pub attempts: u32,

    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: default_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

impl RetryConfig {
    pub fn base_delay(&self) -> Duration {
        Duration::from_millis(self.base_delay_ms)
    }
}

fn default_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    1000
}
