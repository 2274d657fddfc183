// Generator Provider Port (§4.3, §4.6, §6 "Provider contract")
// Abstraction over the four language-model backends used to produce candidate domain strings.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A declared tool the model may be forced to call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    pub parameters_schema: serde_json::Value,
}

/// A single tool invocation returned by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolCall {
    pub name: String,
    pub arguments: serde_json::Value,
}

/// Token usage reported by a provider call.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Usage {
    pub input_tokens: i64,
    pub output_tokens: i64,
}

/// Raw reply from a provider call, before any domain-specific parsing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderReply {
    pub content: String,
    pub tool_calls: Vec<ToolCall>,
    pub usage: Usage,
}

#[derive(Error, Debug, Clone)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    RequestFailed(String),

    #[error("provider returned a malformed reply: {0}")]
    MalformedReply(String),

    #[error("provider call timed out after {0}ms")]
    Timeout(i64),
}

/// Uniform capability set implemented by each of the four concrete language-model backends
/// (claude, deepseek, kimi, cloudflare). `supports_tools` lets callers skip straight to the
/// JSON-fallback prompt for providers that never advertise tool/function calling.
#[async_trait]
pub trait Generator: Send + Sync {
    fn supports_tools(&self) -> bool;

    async fn generate(
        &self,
        prompt: &str,
        system: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<ProviderReply, ProviderError>;

    async fn generate_with_tools(
        &self,
        prompt: &str,
        tools: &[ToolSpec],
        system: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<ProviderReply, ProviderError>;
}

pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Canned behavior for a mock generator.
    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        ToolReply(Vec<String>),
        JsonReply(Vec<String>),
        Fail(String),
    }

    pub struct MockGenerator {
        behavior: Arc<Mutex<MockBehavior>>,
        call_count: Arc<Mutex<usize>>,
        supports_tools: bool,
    }

    impl MockGenerator {
        pub fn new(behavior: MockBehavior, supports_tools: bool) -> Self {
            Self {
                behavior: Arc::new(Mutex::new(behavior)),
                call_count: Arc::new(Mutex::new(0)),
                supports_tools,
            }
        }

        pub fn call_count(&self) -> usize {
            *self.call_count.lock().unwrap()
        }
    }

    #[async_trait]
    impl Generator for MockGenerator {
        fn supports_tools(&self) -> bool {
            self.supports_tools
        }

        async fn generate(
            &self,
            _prompt: &str,
            _system: &str,
            _max_tokens: u32,
            _temperature: f32,
        ) -> Result<ProviderReply, ProviderError> {
            *self.call_count.lock().unwrap() += 1;
            match self.behavior.lock().unwrap().clone() {
                MockBehavior::JsonReply(domains) => Ok(ProviderReply {
                    content: serde_json::json!({ "domains": domains }).to_string(),
                    tool_calls: vec![],
                    usage: Usage {
                        input_tokens: 100,
                        output_tokens: 50,
                    },
                }),
                MockBehavior::ToolReply(domains) => Ok(ProviderReply {
                    content: String::new(),
                    tool_calls: vec![ToolCall {
                        name: "propose_domains".to_string(),
                        arguments: serde_json::json!({ "domains": domains }),
                    }],
                    usage: Usage {
                        input_tokens: 100,
                        output_tokens: 50,
                    },
                }),
                MockBehavior::Fail(msg) => Err(ProviderError::RequestFailed(msg)),
            }
        }

        async fn generate_with_tools(
            &self,
            prompt: &str,
            _tools: &[ToolSpec],
            system: &str,
            max_tokens: u32,
            temperature: f32,
        ) -> Result<ProviderReply, ProviderError> {
            self.generate(prompt, system, max_tokens, temperature).await
        }
    }
}
