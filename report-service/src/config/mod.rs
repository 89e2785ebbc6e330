use serde::Deserialize;
use service_core::config as core_config;
use service_core::error::AppError;
use std::env;

/// Default chat-completions endpoint base.
const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

/// Default completion model.
const DEFAULT_TEXT_MODEL: &str = "gpt-4";

#[derive(Debug, Clone, Deserialize)]
pub struct ReportConfig {
    #[serde(flatten)]
    pub common: core_config::Config,
    pub openai: OpenAiSettings,
    pub models: ModelConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OpenAiSettings {
    /// May be empty: a missing key is surfaced as a 500 per request, so
    /// the server still boots and serves preflight and health traffic.
    pub api_key: String,
    pub base_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelConfig {
    /// Model for report generation and enhancement (e.g., gpt-4)
    pub text_model: String,
}

impl ReportConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        let is_prod = env::var("ENVIRONMENT").unwrap_or_else(|_| "dev".to_string()) == "prod";

        Ok(ReportConfig {
            common: common_config,
            openai: OpenAiSettings {
                api_key: env::var("OPENAI_API_KEY").unwrap_or_default(),
                base_url: get_env("OPENAI_BASE_URL", Some(DEFAULT_OPENAI_BASE_URL), is_prod)?,
            },
            models: ModelConfig {
                text_model: get_env("REPORT_TEXT_MODEL", Some(DEFAULT_TEXT_MODEL), is_prod)?,
            },
        })
    }
}

fn get_env(key: &str, default: Option<&str>, is_prod: bool) -> Result<String, AppError> {
    match env::var(key) {
        Ok(val) => Ok(val),
        Err(_) => {
            if is_prod {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required in production but not set",
                    key
                )))
            } else if let Some(def) = default {
                Ok(def.to_string())
            } else {
                Err(AppError::ConfigError(anyhow::anyhow!(
                    "{} is required but not set",
                    key
                )))
            }
        }
    }
}
