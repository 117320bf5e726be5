//! LLM transport used by the report pipeline.
//!
//! - [`config`]: provider/model config and the env-driven report profile.
//! - [`services`]: the OpenAI-compatible chat client.
//! - [`error_handler`]: unified error type and env/validation helpers.
//! - [`telemetry`]: tracing layers scoped to this crate.

pub mod config;
pub mod error_handler;
pub mod services;
pub mod telemetry;

pub use config::default_config::config_openrouter_report;
pub use config::llm_model_config::LlmModelConfig;
pub use config::llm_provider::LlmProvider;
pub use error_handler::{AiLlmError, ConfigError, ProviderError, ProviderErrorKind};
pub use services::open_ai_service::OpenAiService;
