//! Default LLM config loaded from environment variables.
//!
//! Report generation uses a single profile: an OpenRouter-hosted chat model
//! sampled at a low temperature so the same data tends to produce the same
//! report layout.
//!
//! # Environment variables
//!
//! - `OPENROUTER_API_KEY` = API key (mandatory)
//! - `OPENROUTER_URL`     = base URL (default `https://openrouter.ai/api`)
//! - `LLM_MODEL`          = model id (default [`DEFAULT_REPORT_MODEL`])
//! - `LLM_MAX_TOKENS`     = optional max tokens (u32)
//! - `LLM_TIMEOUT_SECS`   = HTTP timeout (u64, default 180)

use crate::{
    config::{llm_model_config::LlmModelConfig, llm_provider::LlmProvider},
    error_handler::{
        ConfigError, Result, env_opt_u32, env_opt_u64, env_or, must_env, validate_http_endpoint,
        validate_range_f32,
    },
};

/// Model used for report generation when `LLM_MODEL` is not set.
pub const DEFAULT_REPORT_MODEL: &str = "x-ai/grok-4-fast";

/// Sampling temperature for report generation.
pub const REPORT_TEMPERATURE: f32 = 0.1;

const DEFAULT_TIMEOUT_SECS: u64 = 180;

/// Constructs the report-generation config for OpenRouter.
///
/// # Env
/// - `OPENROUTER_API_KEY` (required)
/// - `OPENROUTER_URL`, `LLM_MODEL`, `LLM_MAX_TOKENS`, `LLM_TIMEOUT_SECS` (optional)
///
/// # Defaults
/// - `temperature = Some(0.1)`
/// - `timeout_secs = Some(180)`
///
/// # Errors
/// - [`ConfigError::MissingVar`] if the API key is absent
/// - [`ConfigError::InvalidNumber`] for malformed numeric variables
/// - [`ConfigError::InvalidFormat`] if the URL is not http/https
pub fn config_openrouter_report() -> Result<LlmModelConfig> {
    let api_key = must_env("OPENROUTER_API_KEY")?;
    let endpoint = env_or("OPENROUTER_URL", LlmProvider::OpenRouter.default_endpoint());
    let model = env_or("LLM_MODEL", DEFAULT_REPORT_MODEL);
    let max_tokens = env_opt_u32("LLM_MAX_TOKENS")?;
    let timeout_secs = env_opt_u64("LLM_TIMEOUT_SECS")?.unwrap_or(DEFAULT_TIMEOUT_SECS);

    let cfg = LlmModelConfig {
        provider: LlmProvider::OpenRouter,
        model,
        endpoint,
        api_key: Some(api_key),
        max_tokens,
        temperature: Some(REPORT_TEMPERATURE),
        top_p: None,
        timeout_secs: Some(timeout_secs),
    };
    validate(&cfg)?;
    Ok(cfg)
}

/// Checks the invariants every config must satisfy before a client is built.
///
/// # Errors
/// Returns the first violated [`ConfigError`].
pub fn validate(cfg: &LlmModelConfig) -> Result<()> {
    if cfg.model.trim().is_empty() {
        return Err(ConfigError::EmptyModel.into());
    }
    validate_http_endpoint("OPENROUTER_URL", cfg.endpoint.trim())?;
    if let Some(t) = cfg.temperature {
        validate_range_f32("temperature", t, 0.0, 2.0)?;
    }
    if let Some(p) = cfg.top_p {
        validate_range_f32("top_p", p, 0.0, 1.0)?;
    }
    Ok(())
}
