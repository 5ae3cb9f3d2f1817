//! Blocking client for OpenAI-compatible chat completion servers (vLLM,
//! llama.cpp server, hosted APIs).

use loreweave_core::{
    application::{
        ApplicationError,
        ports::{ContentGenerator, GenerationRequest},
    },
    error::LoreResult,
};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use super::GeneratorConfig;

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

/// Generator backed by a chat completion HTTP endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiGenerator {
    config: GeneratorConfig,
    client: Client,
}

impl OpenAiGenerator {
    /// Build a client; one request per call, no retries.
    pub fn new(config: GeneratorConfig) -> LoreResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| failed(format!("cannot build HTTP client: {e}")))?;
        Ok(Self { config, client })
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    fn body<'a>(&'a self, request: &'a GenerationRequest) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &request.system,
                },
                ChatMessage {
                    role: "user",
                    content: &request.prompt,
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        }
    }
}

impl ContentGenerator for OpenAiGenerator {
    #[instrument(
        skip_all,
        fields(model = %self.config.model, url = %self.config.completions_url())
    )]
    fn generate(&self, request: &GenerationRequest) -> LoreResult<String> {
        let mut call = self
            .client
            .post(self.config.completions_url())
            .json(&self.body(request));
        if let Some(key) = &self.config.api_key {
            call = call.bearer_auth(key);
        }

        let response = call.send().map_err(|e| {
            if e.is_timeout() {
                failed(format!(
                    "no response within {}s",
                    self.config.timeout.as_secs()
                ))
            } else {
                failed(format!("request failed: {e}"))
            }
        })?;

        let status = response.status();
        let text = response
            .text()
            .map_err(|e| failed(format!("cannot read response: {e}")))?;
        if !status.is_success() {
            return Err(failed(format!("server answered {status}: {}", text.trim())));
        }

        debug!(bytes = text.len(), "Received completion");
        completion_content(&text)
    }
}

/// Pull the first choice's message text out of a completion response body.
fn completion_content(body: &str) -> LoreResult<String> {
    let parsed: ChatResponse =
        serde_json::from_str(body).map_err(|e| failed(format!("malformed response: {e}")))?;

    parsed
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .filter(|content| !content.trim().is_empty())
        .ok_or_else(|| failed("response contained no completion".to_string()))
}

fn failed(reason: String) -> loreweave_core::error::LoreError {
    ApplicationError::GenerationFailed { reason }.into()
}
