use std::fmt;

use crate::constants;
use crate::error::ConfigError;

/// Connection and sampling options shared by every subcommand that talks to
/// the chat service.
#[derive(clap::Args, Debug, Clone)]
pub struct ApiArgs {
    #[arg(long, env = "MISTRAL_API_KEY", hide_env_values = true, help = "API key for the chat-completions service.")]
    pub api_key: Option<String>,
    #[arg(long, env = "MISTRAL_API_URL", default_value = constants::DEFAULT_API_URL, help = "Base URL of the chat-completions API.")]
    pub api_url: String,
    #[arg(long, env = "CHAT_MODEL", default_value = constants::DEFAULT_CHAT_MODEL, help = "Model used for regular chat.")]
    pub model: String,
    #[arg(long, env = "CONSULTANT_MODEL", default_value = constants::DEFAULT_CONSULTANT_MODEL, help = "Model used in consultant mode.")]
    pub consultant_model: String,
    #[arg(long, default_value_t = constants::DEFAULT_TEMPERATURE, help = "Sampling temperature.")]
    pub temperature: f32,
    #[arg(long, default_value_t = constants::DEFAULT_MAX_TOKENS, help = "Maximum tokens per reply.")]
    pub max_tokens: u32,
}

impl Default for ApiArgs {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: constants::DEFAULT_API_URL.to_string(),
            model: constants::DEFAULT_CHAT_MODEL.to_string(),
            consultant_model: constants::DEFAULT_CONSULTANT_MODEL.to_string(),
            temperature: constants::DEFAULT_TEMPERATURE,
            max_tokens: constants::DEFAULT_MAX_TOKENS,
        }
    }
}

/// API credential. Never printed in full.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(raw: impl Into<String>) -> Result<Self, ConfigError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModelConfig {
    pub default_model: String,
    pub consultant_model: String,
}

impl ModelConfig {
    pub fn for_mode(&self, is_consultant_mode: bool) -> &str {
        if is_consultant_mode {
            &self.consultant_model
        } else {
            &self.default_model
        }
    }
}

/// Validated configuration for the chat service client.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub api_key: ApiKey,
    /// Base URL without a trailing slash.
    pub api_url: String,
    pub models: ModelConfig,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl ServerConfig {
    pub fn from_args(args: &ApiArgs) -> Result<Self, ConfigError> {
        let api_key = ApiKey::new(args.api_key.clone().unwrap_or_default())?;

        let url = reqwest::Url::parse(&args.api_url).map_err(|e| ConfigError::InvalidApiUrl {
            url: args.api_url.clone(),
            reason: e.to_string(),
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidApiUrl {
                url: args.api_url.clone(),
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }

        if !args.temperature.is_finite() || !(0.0..=2.0).contains(&args.temperature) {
            return Err(ConfigError::InvalidSampling(format!(
                "temperature must be between 0 and 2, got {}",
                args.temperature
            )));
        }
        if args.max_tokens == 0 {
            return Err(ConfigError::InvalidSampling("max tokens must be positive".into()));
        }

        Ok(Self {
            api_key,
            api_url: args.api_url.trim_end_matches('/').to_string(),
            models: ModelConfig {
                default_model: args.model.clone(),
                consultant_model: args.consultant_model.clone(),
            },
            temperature: args.temperature,
            max_tokens: args.max_tokens,
        })
    }
}
