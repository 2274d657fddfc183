// Claude provider adapter — speaks the native Anthropic Messages API wire format directly
// (bearer-style `x-api-key` header, `tool_use` content blocks), per the provider contract.

use crate::constants::{CLAUDE_API_VERSION, PROVIDER_TIMEOUT_MS};
use async_trait::async_trait;
use brandscout_core::port::{
    Evaluator, Generator, ProviderError, ProviderReply, ToolCall, ToolSpec, Usage,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com";

pub struct ClaudeProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl ClaudeProvider {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self::with_base_url(api_key, model, DEFAULT_BASE_URL)
    }

    pub fn with_base_url(
        api_key: impl Into<String>,
        model: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_millis(PROVIDER_TIMEOUT_MS))
                .build()
                .expect("reqwest client builds"),
            api_key: api_key.into(),
            model: model.into(),
            base_url: base_url.into(),
        }
    }

    async fn send(
        &self,
        prompt: &str,
        tools: &[ToolSpec],
        system: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<ProviderReply, ProviderError> {
        let request = MessagesRequest {
            model: self.model.clone(),
            max_tokens,
            temperature,
            system: system.to_string(),
            messages: vec![MessageIn {
                role: "user".to_string(),
                content: prompt.to_string(),
            }],
            tools: if tools.is_empty() {
                None
            } else {
                Some(tools.iter().map(ClaudeTool::from).collect())
            },
            tool_choice: tools.first().map(|t| ClaudeToolChoice {
                kind: "tool".to_string(),
                name: t.name.clone(),
            }),
        };

        let response = self
            .client
            .post(format!("{}/v1/messages", self.base_url))
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", CLAUDE_API_VERSION)
            .json(&request)
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::MalformedReply(e.to_string()))?;

        if !status.is_success() {
            return Err(ProviderError::RequestFailed(format!(
                "claude returned {status}: {body}"
            )));
        }

        let parsed: MessagesResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::MalformedReply(format!("{e}: {body}")))?;

        let mut content = String::new();
        let mut tool_calls = Vec::new();
        for block in parsed.content {
            match block {
                ContentBlock::Text { text } => content.push_str(&text),
                ContentBlock::ToolUse { name, input, .. } => {
                    tool_calls.push(ToolCall {
                        name,
                        arguments: input,
                    });
                }
            }
        }

        Ok(ProviderReply {
            content,
            tool_calls,
            usage: Usage {
                input_tokens: parsed.usage.input_tokens,
                output_tokens: parsed.usage.output_tokens,
            },
        })
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout(PROVIDER_TIMEOUT_MS as i64)
    } else {
        ProviderError::RequestFailed(err.to_string())
    }
}

#[async_trait]
impl Generator for ClaudeProvider {
    fn supports_tools(&self) -> bool {
        true
    }

    async fn generate(
        &self,
        prompt: &str,
        system: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<ProviderReply, ProviderError> {
        self.send(prompt, &[], system, max_tokens, temperature).await
    }

    async fn generate_with_tools(
        &self,
        prompt: &str,
        tools: &[ToolSpec],
        system: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<ProviderReply, ProviderError> {
        self.send(prompt, tools, system, max_tokens, temperature).await
    }
}

#[async_trait]
impl Evaluator for ClaudeProvider {
    fn supports_tools(&self) -> bool {
        true
    }

    async fn generate(
        &self,
        prompt: &str,
        system: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<ProviderReply, ProviderError> {
        self.send(prompt, &[], system, max_tokens, temperature).await
    }

    async fn generate_with_tools(
        &self,
        prompt: &str,
        tools: &[ToolSpec],
        system: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<ProviderReply, ProviderError> {
        self.send(prompt, tools, system, max_tokens, temperature).await
    }
}

#[derive(Debug, Serialize)]
struct MessagesRequest {
    model: String,
    max_tokens: u32,
    temperature: f32,
    system: String,
    messages: Vec<MessageIn>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<ClaudeTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ClaudeToolChoice>,
}

#[derive(Debug, Serialize)]
struct MessageIn {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct ClaudeTool {
    name: String,
    description: String,
    input_schema: serde_json::Value,
}

impl From<&ToolSpec> for ClaudeTool {
    fn from(spec: &ToolSpec) -> Self {
        Self {
            name: spec.name.clone(),
            description: spec.description.clone(),
            input_schema: spec.parameters_schema.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ClaudeToolChoice {
    #[serde(rename = "type")]
    kind: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    content: Vec<ContentBlock>,
    usage: UsageResponse,
}

#[derive(Debug, Deserialize)]
struct UsageResponse {
    input_tokens: i64,
    output_tokens: i64,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentBlock {
    Text {
        text: String,
    },
    ToolUse {
        #[allow(dead_code)]
        id: String,
        name: String,
        input: serde_json::Value,
    },
}
