// Evaluator Provider Port (§4.4) — shares the Generator wire contract but a distinct port so
// C4 can be swapped/mocked independently of C3.

use crate::port::generator::{ProviderError, ProviderReply, ToolSpec, Usage};
use async_trait::async_trait;

#[async_trait]
pub trait Evaluator: Send + Sync {
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

    #[derive(Debug, Clone)]
    pub enum MockBehavior {
        JsonReply(serde_json::Value),
        Fail(String),
    }

    pub struct MockEvaluator {
        behavior: Arc<Mutex<MockBehavior>>,
        call_count: Arc<Mutex<usize>>,
    }

    impl MockEvaluator {
        pub fn new(behavior: MockBehavior) -> Self {
            Self {
                behavior: Arc::new(Mutex::new(behavior)),
                call_count: Arc::new(Mutex::new(0)),
            }
        }

        pub fn call_count(&self) -> usize {
            *self.call_count.lock().unwrap()
        }
    }

    #[async_trait]
    impl Evaluator for MockEvaluator {
        fn supports_tools(&self) -> bool {
            false
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
                MockBehavior::JsonReply(value) => Ok(ProviderReply {
                    content: value.to_string(),
                    tool_calls: vec![],
                    usage: Usage {
                        input_tokens: 80,
                        output_tokens: 40,
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
