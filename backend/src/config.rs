use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::models::SessionSettings;

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    pub assistant: AssistantConfig,
    pub llm: LLMConfig,
    /// Settings every new session starts with
    pub defaults: SessionSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub file: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AssistantConfig {
    /// JSON document with the `ALLOW_PATTERN` phrase table
    pub allow_pattern_path: String,
    /// Plain-text preamble prepended to every forwarded question
    pub policy_prompt_path: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LLMConfig {
    pub api_base: String,
    pub api_key: Option<String>,
    /// Request timeout in seconds (accepts "60", "60s", "2m")
    #[serde(rename = "timeout", deserialize_with = "deserialize_duration_secs")]
    pub timeout_secs: u64,
}

impl Config {
    /// Load configuration with environment variable override support
    ///
    /// Loading order:
    /// 1. Load from `explicit_path`, or the first config.toml found
    /// 2. Override with environment variables (prefixed with APP_, plus GOOGLE_API_KEY)
    /// 3. Validate the final configuration
    pub fn load(explicit_path: Option<&str>) -> Result<Self, anyhow::Error> {
        // 1. Load from config file
        let mut config = match explicit_path {
            Some(path) => Self::from_toml(path)?,
            None => match Self::find_config_file() {
                Some(path) => Self::from_toml(&path)?,
                None => {
                    tracing::warn!("Configuration file not found, using defaults");
                    Config::default()
                },
            },
        };

        // 2. Override with environment variables
        config.apply_env_overrides();

        // 3. Validate configuration
        config.validate()?;

        Ok(config)
    }

    /// Apply environment variable overrides
    ///
    /// Supported environment variables:
    /// - APP_SERVER_HOST: Server host (default: 0.0.0.0)
    /// - APP_SERVER_PORT: Server port (default: 8080)
    /// - APP_LOG_LEVEL: Logging level (e.g., "info,janasampark=debug")
    /// - APP_ALLOW_PATTERN_PATH: Allow-list document path
    /// - APP_POLICY_PROMPT_PATH: Policy preamble path
    /// - APP_LLM_API_BASE: Chat API base URL
    /// - APP_LLM_TIMEOUT: Chat API timeout (accepts "60", "60s", "2m")
    /// - APP_DEFAULT_MODEL: Model selected for new sessions
    /// - GOOGLE_API_KEY: Chat API key
    fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, var: impl Fn(&str) -> Option<String>) {
        if let Some(host) = var("APP_SERVER_HOST") {
            self.server.host = host;
            tracing::info!("Override server.host from env: {}", self.server.host);
        }

        if let Some(port) = var("APP_SERVER_PORT")
            && let Ok(port) = port.parse()
        {
            self.server.port = port;
            tracing::info!("Override server.port from env: {}", self.server.port);
        }

        if let Some(level) = var("APP_LOG_LEVEL") {
            self.logging.level = level;
            tracing::info!("Override logging.level from env: {}", self.logging.level);
        }

        if let Some(path) = var("APP_ALLOW_PATTERN_PATH") {
            self.assistant.allow_pattern_path = path;
            tracing::info!(
                "Override assistant.allow_pattern_path from env: {}",
                self.assistant.allow_pattern_path
            );
        }

        if let Some(path) = var("APP_POLICY_PROMPT_PATH") {
            self.assistant.policy_prompt_path = path;
            tracing::info!(
                "Override assistant.policy_prompt_path from env: {}",
                self.assistant.policy_prompt_path
            );
        }

        if let Some(base) = var("APP_LLM_API_BASE") {
            self.llm.api_base = base;
            tracing::info!("Override llm.api_base from env: {}", self.llm.api_base);
        }

        if let Some(timeout) = var("APP_LLM_TIMEOUT") {
            match parse_duration_to_secs(&timeout) {
                Ok(val) => {
                    self.llm.timeout_secs = val;
                    tracing::info!("Override llm.timeout from env: {}s", self.llm.timeout_secs);
                },
                Err(e) => tracing::warn!(
                    "Invalid APP_LLM_TIMEOUT '{}': {} (keep {}s)",
                    timeout,
                    e,
                    self.llm.timeout_secs
                ),
            }
        }

        if let Some(model) = var("APP_DEFAULT_MODEL") {
            self.defaults.model = model;
            tracing::info!("Override defaults.model from env: {}", self.defaults.model);
        }

        if let Some(key) = var("GOOGLE_API_KEY") {
            self.llm.api_key = Some(key);
            tracing::info!("Override llm.api_key from env");
        }
    }

    /// Validate configuration
    fn validate(&self) -> Result<(), anyhow::Error> {
        if self.server.port == 0 {
            anyhow::bail!("Server port cannot be 0");
        }

        if self.assistant.allow_pattern_path.trim().is_empty() {
            anyhow::bail!("assistant.allow_pattern_path cannot be empty");
        }
        if self.assistant.policy_prompt_path.trim().is_empty() {
            anyhow::bail!("assistant.policy_prompt_path cannot be empty");
        }

        if self.llm.api_base.trim().is_empty() {
            anyhow::bail!("llm.api_base cannot be empty");
        }
        if self.llm.timeout_secs == 0 {
            anyhow::bail!("llm.timeout must be > 0");
        }

        if let Err(e) = self.defaults.check() {
            anyhow::bail!("Invalid [defaults] session settings: {}", e);
        }

        Ok(())
    }

    fn find_config_file() -> Option<String> {
        let possible_paths =
            ["conf/config.toml", "config.toml", "./conf/config.toml", "./config.toml"];

        for path in &possible_paths {
            if Path::new(path).exists() {
                return Some(path.to_string());
            }
        }
        None
    }

    fn from_toml(path: &str) -> Result<Self, anyhow::Error> {
        let content = fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file {}: {}", path, e))?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 8080 }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info,janasampark=debug".to_string(),
            file: Some("logs/janasampark.log".to_string()),
        }
    }
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            allow_pattern_path: "ALLOW_PATTERN.json".to_string(),
            policy_prompt_path: "POLICY_PROMPT.txt".to_string(),
        }
    }
}

impl Default for LLMConfig {
    fn default() -> Self {
        Self {
            api_base: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            api_key: None,
            timeout_secs: 60,
        }
    }
}

// =========================
// Helpers for parsing values
// =========================

fn parse_duration_to_secs(input: &str) -> Result<u64, String> {
    // Accept plain numbers (treated as seconds)
    if let Ok(val) = input.parse::<u64>() {
        return Ok(val);
    }

    let s = input.trim().to_lowercase();
    let (num_str, unit) = s.split_at(s.chars().take_while(|c| c.is_ascii_digit()).count());
    if num_str.is_empty() || unit.is_empty() {
        return Err("missing number or unit".into());
    }
    let n: u64 = num_str.parse().map_err(|_| "invalid number".to_string())?;
    let multiplier: u64 = match unit {
        "s" | "sec" | "secs" | "second" | "seconds" => 1,
        "m" | "min" | "mins" | "minute" | "minutes" => 60,
        "h" | "hr" | "hour" | "hours" => 60 * 60,
        _ => return Err(format!("unsupported unit: {}", unit)),
    };
    n.checked_mul(multiplier).ok_or_else(|| "duration too large".to_string())
}

// Custom serde deserializer to support numeric or human-friendly string values
fn deserialize_duration_secs<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    struct Visitor;
    impl<'de> serde::de::Visitor<'de> for Visitor {
        type Value = u64;
        fn expecting(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
            write!(f, "a number of seconds or a string like '30s', '2m'")
        }
        fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E> {
            Ok(v)
        }
        fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            if v >= 0 { Ok(v as u64) } else { Err(E::custom("negative not allowed")) }
        }
        fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
        where
            E: serde::de::Error,
        {
            parse_duration_to_secs(v).map_err(E::custom)
        }
    }
    deserializer.deserialize_any(Visitor)
}
