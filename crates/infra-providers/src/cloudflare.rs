// Cloudflare Workers AI provider adapter — account-scoped REST binding, bearer API token.
// Workers AI text models don't expose a uniform forced-function-call mechanism, so this
// provider never advertises tool support; `generate_with_tools` falls back to a plain
// generation and lets the evaluator/generator adapter's JSON-fallback tier do the parsing.

use crate::constants::PROVIDER_TIMEOUT_MS;
use async_trait::async_trait;
use brandscout_core::port::{
    Evaluator, Generator, ProviderError, ProviderReply, ToolSpec, Usage,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.cloudflare.com/client/v4";
const DEFAULT_MODEL: &str = "@cf/meta/llama-3-8b-instruct";

pub struct CloudflareProvider {
    client: reqwest::Client,
    api_token: String,
    account_id: String,
    model: String,
    base_url: String,
}

impl CloudflareProvider {
    pub fn new(api_token: impl Into<String>, account_id: impl Into<String>) -> Self {
        Self::with_model(api_token, account_id, DEFAULT_MODEL)
    }

    pub fn with_model(
        api_token: impl Into<String>,
        account_id: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_millis(PROVIDER_TIMEOUT_MS))
                .build()
                .expect("reqwest client builds"),
            api_token: api_token.into(),
            account_id: account_id.into(),
            model: model.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    async fn send(
        &self,
        prompt: &str,
        system: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<ProviderReply, ProviderError> {
        let request = RunRequest {
            messages: vec![
                RunMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                RunMessage {
                    role: "user".to_string(),
                    content: prompt.to_string(),
                },
            ],
            max_tokens,
            temperature,
        };

        let url = format!(
            "{}/accounts/{}/ai/run/{}",
            self.base_url, self.account_id, self.model
        );

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.api_token)
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
                "cloudflare returned {status}: {body}"
            )));
        }

        let parsed: RunResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::MalformedReply(format!("{e}: {body}")))?;

        if !parsed.success {
            return Err(ProviderError::RequestFailed(format!(
                "cloudflare reported failure: {:?}",
                parsed.errors
            )));
        }

        Ok(ProviderReply {
            content: parsed.result.response,
            tool_calls: vec![],
            usage: Usage {
                input_tokens: parsed.result.usage.as_ref().map(|u| u.prompt_tokens).unwrap_or(0),
                output_tokens: parsed
                    .result
                    .usage
                    .as_ref()
                    .map(|u| u.completion_tokens)
                    .unwrap_or(0),
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
impl Generator for CloudflareProvider {
    fn supports_tools(&self) -> bool {
        false
    }

    async fn generate(
        &self,
        prompt: &str,
        system: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<ProviderReply, ProviderError> {
        self.send(prompt, system, max_tokens, temperature).await
    }

    async fn generate_with_tools(
        &self,
        prompt: &str,
        _tools: &[ToolSpec],
        system: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<ProviderReply, ProviderError> {
        self.send(prompt, system, max_tokens, temperature).await
    }
}

#[async_trait]
impl Evaluator for CloudflareProvider {
    fn supports_tools(&self) -> bool {
        false
    }

    async fn generate(
        &self,
        prompt: &str,
        system: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<ProviderReply, ProviderError> {
        self.send(prompt, system, max_tokens, temperature).await
    }

    async fn generate_with_tools(
        &self,
        prompt: &str,
        _tools: &[ToolSpec],
        system: &str,
        max_tokens: u32,
        temperature: f32,
    ) -> Result<ProviderReply, ProviderError> {
        self.send(prompt, system, max_tokens, temperature).await
    }
}

#[derive(Debug, Serialize)]
struct RunRequest {
    messages: Vec<RunMessage>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct RunMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct RunResponse {
    result: RunResult,
    success: bool,
    #[serde(default)]
    errors: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RunResult {
    response: String,
    #[serde(default)]
    usage: Option<RunUsage>,
}

#[derive(Debug, Deserialize)]
struct RunUsage {
    prompt_tokens: i64,
    completion_tokens: i64,
}
