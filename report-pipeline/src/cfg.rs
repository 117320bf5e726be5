//! Runtime configuration loaded from environment variables.

use std::{path::PathBuf, time::Duration};

/// Default document size ceiling: 15 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 15 * 1024 * 1024;

const DEFAULT_TEMPLATE_PATH: &str = "prompts/report_prompt.txt";
const DEFAULT_MODEL_TIMEOUT_SECS: u64 = 240;

/// Config bag for the pipeline. All fields have defaults via `from_env`.
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Prompt template resource, read on every composition.
    pub template_path: PathBuf,
    /// Documents larger than this are rejected before parsing.
    pub max_upload_bytes: usize,
    /// Upper bound for a single model call.
    pub model_timeout: Duration,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            template_path: PathBuf::from(DEFAULT_TEMPLATE_PATH),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            model_timeout: Duration::from_secs(DEFAULT_MODEL_TIMEOUT_SECS),
        }
    }
}

impl PipelineConfig {
    /// Build from `PROMPT_TEMPLATE_PATH`, `MAX_UPLOAD_BYTES` and
    /// `MODEL_TIMEOUT_SECS`; unset or unparsable values fall back to defaults.
    pub fn from_env() -> Self {
        Self {
            template_path: PathBuf::from(env("PROMPT_TEMPLATE_PATH", DEFAULT_TEMPLATE_PATH)),
            max_upload_bytes: parse("MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES),
            model_timeout: Duration::from_secs(parse(
                "MODEL_TIMEOUT_SECS",
                DEFAULT_MODEL_TIMEOUT_SECS,
            )),
        }
    }
}

fn env(k: &str, dflt: &str) -> String {
    std::env::var(k)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| dflt.to_string())
}

fn parse<T: std::str::FromStr>(k: &str, dflt: T) -> T {
    std::env::var(k)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(dflt)
}
