//! LLM client implementations.

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{LlmError, LlmResult};

/// A chat model the synthesizer can consult.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Run one completion and return the raw assistant text.
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> LlmResult<String>;
}

/// OpenAI-compatible chat-completions client.
pub struct ChatCompletionClient {
    http: reqwest::Client,
    base_url: String,
    model: String,
    api_key: Option<String>,
}

impl ChatCompletionClient {
    /// Build a client. `timeout` bounds the HTTP request; the synthesizer
    /// applies its own hard deadline on top.
    pub fn new(
        base_url: impl Into<String>,
        model: impl Into<String>,
        api_key: Option<String>,
        timeout: Duration,
    ) -> LlmResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Transport(e.to_string()))?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            model: model.into(),
            api_key,
        })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[async_trait]
impl LlmClient for ChatCompletionClient {
    async fn complete(&self, system_prompt: &str, user_prompt: &str) -> LlmResult<String> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt,
                },
            ],
            // Decisions are matrix-bound; keep sampling nearly greedy.
            temperature: 0.1,
        };

        let mut builder = self
            .http
            .post(format!("{}/chat/completions", self.base_url))
            .json(&request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::Gateway {
                status: status.as_u16(),
                body: truncate(&body, 500),
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Parse(e.to_string()))?;
        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(LlmError::EmptyResponse)?;

        debug!(model = %self.model, chars = content.len(), "LLM completion received");
        Ok(content)
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.len() <= max {
        text.to_string()
    } else {
        let mut end = max;
        while !text.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &text[..end])
    }
}

/// Scripted client for tests: replays queued responses in order and
/// reports a transport error once the queue runs dry.
pub struct ScriptedClient {
    responses: Mutex<VecDeque<LlmResult<String>>>,
}

impl ScriptedClient {
    /// Queue up replies, front first.
    pub fn with_responses(responses: Vec<LlmResult<String>>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().collect()),
        }
    }

    /// A client that always fails as if the gateway were unreachable.
    pub fn unreachable() -> Self {
        Self::with_responses(Vec::new())
    }
}

#[async_trait]
impl LlmClient for ScriptedClient {
    async fn complete(&self, _system_prompt: &str, _user_prompt: &str) -> LlmResult<String> {
        self.responses
            .lock()
            .expect("scripted client lock")
            .pop_front()
            .unwrap_or_else(|| Err(LlmError::Transport("no scripted response left".to_string())))
    }
}
