// DeepSeek provider adapter — OpenAI-compatible chat-completions wire format.

use crate::openai_compatible::OpenAiCompatibleProvider;
use async_trait::async_trait;
use brandscout_core::port::{Evaluator, Generator, ProviderError, ProviderReply, ToolSpec};

const DEFAULT_BASE_URL: &str = "https://api.deepseek.com/v1";
const DEFAULT_MODEL: &str = "deepseek-chat";

pub struct DeepSeekProvider {
    inner: OpenAiCompatibleProvider,
}

impl DeepSeekProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_model(api_key, DEFAULT_MODEL)
    }

    pub fn with_model(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            inner: OpenAiCompatibleProvider::new(api_key, model, DEFAULT_BASE_URL),
        }
    }
}

#[async_trait]
impl Generator for DeepSeekProvider {
    fn supports_tools(&self) -> bool {
        Generator::supports_tools(&self.inner)
    }

    async fn generate(
        &self,
        prompt: &str,
        system: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<ProviderReply, ProviderError> {
        Generator::generate(&self.inner, prompt, system, max_tokens, temperature).await
    }

    async fn generate_with_tools(
        &self,
        prompt: &str,
        tools: &[ToolSpec],
        system: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<ProviderReply, ProviderError> {
        Generator::generate_with_tools(&self.inner, prompt, tools, system, max_tokens, temperature)
            .await
    }
}

#[async_trait]
impl Evaluator for DeepSeekProvider {
    fn supports_tools(&self) -> bool {
        Evaluator::supports_tools(&self.inner)
    }

    async fn generate(
        &self,
        prompt: &str,
        system: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<ProviderReply, ProviderError> {
        Evaluator::generate(&self.inner, prompt, system, max_tokens, temperature).await
    }

    async fn generate_with_tools(
        &self,
        prompt: &str,
        tools: &[ToolSpec],
        system: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<ProviderReply, ProviderError> {
        Evaluator::generate_with_tools(&self.inner, prompt, tools, system, max_tokens, temperature)
            .await
    }
}
