// Shared OpenAI-compatible chat-completions adapter — deepseek and kimi both speak this wire
// format (bearer token, `tools`/`tool_calls`), differing only in base URL and model name.

use crate::constants::PROVIDER_TIMEOUT_MS;
use async_trait::async_trait;
use brandscout_core::port::{
    Evaluator, Generator, ProviderError, ProviderReply, ToolCall, ToolSpec, Usage,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub struct OpenAiCompatibleProvider {
    client: reqwest::Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl OpenAiCompatibleProvider {
    pub fn new(
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
        let request = ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            max_tokens,
            temperature,
            tools: if tools.is_empty() {
                None
            } else {
                Some(tools.iter().map(OpenAiTool::from).collect())
            },
            tool_choice: tools.first().map(|t| ToolChoice {
                kind: "function".to_string(),
                function: ToolChoiceFunction {
                    name: t.name.clone(),
                },
            }),
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
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
                "provider returned {status}: {body}"
            )));
        }

        let parsed: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::MalformedReply(format!("{e}: {body}")))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::MalformedReply("no choices in reply".to_string()))?;

        let mut tool_calls = Vec::new();
        for call in choice.message.tool_calls.unwrap_or_default() {
            let arguments: serde_json::Value = serde_json::from_str(&call.function.arguments)
                .map_err(|e| {
                    ProviderError::MalformedReply(format!(
                        "malformed tool_call arguments: {e}"
                    ))
                })?;
            tool_calls.push(ToolCall {
                name: call.function.name,
                arguments,
            });
        }

        Ok(ProviderReply {
            content: choice.message.content.unwrap_or_default(),
            tool_calls,
            usage: Usage {
                input_tokens: parsed.usage.prompt_tokens,
                output_tokens: parsed.usage.completion_tokens,
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
impl Generator for OpenAiCompatibleProvider {
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
impl Evaluator for OpenAiCompatibleProvider {
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
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<OpenAiTool>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice>,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Serialize)]
struct OpenAiTool {
    #[serde(rename = "type")]
    kind: String,
    function: OpenAiFunction,
}

#[derive(Debug, Serialize)]
struct OpenAiFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

impl From<&ToolSpec> for OpenAiTool {
    fn from(spec: &ToolSpec) -> Self {
        Self {
            kind: "function".to_string(),
            function: OpenAiFunction {
                name: spec.name.clone(),
                description: spec.description.clone(),
                parameters: spec.parameters_schema.clone(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct ToolChoice {
    #[serde(rename = "type")]
    kind: String,
    function: ToolChoiceFunction,
}

#[derive(Debug, Serialize)]
struct ToolChoiceFunction {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: UsageResponse,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ResponseToolCall>>,
}

#[derive(Debug, Deserialize)]
struct ResponseToolCall {
    function: ResponseToolCallFunction,
}

#[derive(Debug, Deserialize)]
struct ResponseToolCallFunction {
    name: String,
    arguments: String,
}

#[derive(Debug, Deserialize)]
struct UsageResponse {
    prompt_tokens: i64,
    completion_tokens: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_call_arguments_parse_from_json_string() {
        let raw = serde_json::json!({
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "function": {"name": "propose_domains", "arguments": "{\"domains\":[\"a.com\"]}"}
                    }]
                }
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5}
        });
        let parsed: ChatResponse = serde_json::from_value(raw).unwrap();
        let call = &parsed.choices[0].message.tool_calls.as_ref().unwrap()[0];
        assert_eq!(call.function.name, "propose_domains");
        let args: serde_json::Value = serde_json::from_str(&call.function.arguments).unwrap();
        assert_eq!(args["domains"][0], "a.com");
    }
}
