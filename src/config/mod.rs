#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub vision: VisionConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisionConfig {
    /// Base endpoint of the VLM API, without the model path.
    #[serde(default = "default_invoke_url")]
    pub invoke_url: String,

    /// Model identifier appended to the invoke URL, e.g. "nvidia/neva-22b".
    #[serde(default = "default_model")]
    pub model: String,

    /// Bearer token. Empty means no Authorization header is sent and the
    /// remote service decides whether the call is allowed.
    /// Supports ${VAR} / $VAR environment expansion.
    #[serde(default)]
    pub api_key: String,

    /// Prompt prefix; the inline image tag is appended to it.
    #[serde(default = "default_content")]
    pub content: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_top_p")]
    pub top_p: f64,

    /// Request a streamed response and assemble the description chunk by chunk.
    #[serde(default)]
    pub stream: bool,

    /// Total request timeout in seconds, connection plus body.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for VisionConfig {
    fn default() -> Self {
        Self {
            invoke_url: default_invoke_url(),
            model: default_model(),
            api_key: String::new(),
            content: default_content(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            stream: false,
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default value functions
fn default_invoke_url() -> String {
    "https://ai.api.nvidia.com/v1/vlm".to_string()
}
fn default_model() -> String {
    "nvidia/neva-22b".to_string()
}
fn default_content() -> String {
    "Describe the image. ".to_string()
}
fn default_max_tokens() -> u32 {
    512
}
fn default_temperature() -> f64 {
    1.0
}
fn default_top_p() -> f64 {
    0.7
}
fn default_timeout_secs() -> u64 {
    60
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load from the default location, or an explicit path when given.
    /// Creates a commented template at the default location on first run.
    pub fn load(path_override: Option<&str>) -> Result<Self> {
        let path = match path_override {
            Some(p) => PathBuf::from(shellexpand::tilde(p).to_string()),
            None => Self::config_path()?,
        };

        if !path.exists() {
            if path_override.is_some() {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            let config = Config::default();
            config.save_template(&path)?;
            return Ok(config);
        }

        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let mut config: Config = toml::from_str(&content)?;

        config.expand_env_vars();

        config
            .validate()
            .context("Configuration validation failed")?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.vision.invoke_url.trim().is_empty() {
            anyhow::bail!("vision.invoke_url cannot be empty");
        }
        if self.vision.model.trim().is_empty() {
            anyhow::bail!("vision.model cannot be empty");
        }
        if self.vision.max_tokens == 0 {
            anyhow::bail!("vision.max_tokens must be positive");
        }
        if !(0.0..=1.0).contains(&self.vision.top_p) {
            anyhow::bail!(
                "vision.top_p must be within 0.0..=1.0 (got {})",
                self.vision.top_p
            );
        }
        if self.vision.temperature < 0.0 {
            anyhow::bail!(
                "vision.temperature cannot be negative (got {})",
                self.vision.temperature
            );
        }
        if self.vision.timeout_secs == 0 {
            anyhow::bail!("vision.timeout_secs must be positive");
        }
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let base = directories::BaseDirs::new()
            .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;

        Ok(base.home_dir().join(".agent-vision").join("config.toml"))
    }

    fn expand_env_vars(&mut self) {
        self.vision.api_key = expand_env(&self.vision.api_key);
    }

    fn save_template(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(path, DEFAULT_CONFIG_TEMPLATE)?;
        eprintln!("Created default config at {}", path.display());

        Ok(())
    }
}

fn expand_env(s: &str) -> String {
    if let Some(var_name) = s.strip_prefix("${").and_then(|s| s.strip_suffix('}')) {
        std::env::var(var_name).unwrap_or_else(|_| s.to_string())
    } else if let Some(var_name) = s.strip_prefix('$') {
        std::env::var(var_name).unwrap_or_else(|_| s.to_string())
    } else {
        s.to_string()
    }
}

/// Default config template with helpful comments (used for first-time setup)
const DEFAULT_CONFIG_TEMPLATE: &str = r#"# agent-vision configuration
# Auto-created on first run. Edit as needed.

[vision]
# Base URL of the VLM API (model path is appended per request)
invoke_url = "https://ai.api.nvidia.com/v1/vlm"

# Model identifier, e.g. "nvidia/neva-22b", "google/paligemma", "adept/fuyu-8b"
model = "nvidia/neva-22b"

# Bearer token for calls from outside the provider's own cloud.
# Leave unset to send no Authorization header.
# api_key = "${NVIDIA_API_KEY}"

# Prompt prepended to the inline image tag
content = "Describe the image. "

max_tokens = 512
temperature = 1.0
top_p = 0.7

# Assemble the description from a streamed response
stream = false

[logging]
level = "info"
"#;
