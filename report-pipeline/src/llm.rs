//! Port to the generative model.

use ai_llm_service::{AiLlmError, OpenAiService};
use async_trait::async_trait;

/// Sends one prompt to a generative model and returns its raw text.
///
/// Built once at startup and injected into the pipeline; implementations do
/// not retry.
#[async_trait]
pub trait ModelClient: Send + Sync {
    async fn invoke(&self, prompt: &str) -> Result<String, AiLlmError>;
}

#[async_trait]
impl ModelClient for OpenAiService {
    async fn invoke(&self, prompt: &str) -> Result<String, AiLlmError> {
        self.generate(prompt).await
    }
}
