/// Represents the provider (backend) used for large language model (LLM) inference.
///
/// Both variants speak the OpenAI chat-completions wire format and are served by
/// [`OpenAiService`](crate::services::open_ai_service::OpenAiService); the
/// distinction matters for default endpoints and error attribution.
///
/// # Examples
///
/// ```
/// use ai_llm_service::config::llm_provider::LlmProvider;
///
/// let provider = LlmProvider::OpenRouter;
/// assert_eq!(provider.default_endpoint(), "https://openrouter.ai/api");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LlmProvider {
    /// OpenAI's own API.
    OpenAI,
    /// OpenRouter gateway (OpenAI-compatible).
    OpenRouter,
}

impl LlmProvider {
    /// Base URL used when no endpoint is configured explicitly.
    pub fn default_endpoint(self) -> &'static str {
        match self {
            LlmProvider::OpenAI => "https://api.openai.com",
            LlmProvider::OpenRouter => "https://openrouter.ai/api",
        }
    }
}
