//! Content generation adapters.

mod canned;
mod openai;

use std::time::Duration;

pub use canned::CannedGenerator;
pub use openai::OpenAiGenerator;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:8000/v1";
pub const DEFAULT_MODEL: &str = "NousResearch/Meta-Llama-3-8B-Instruct";

/// Settings for an OpenAI-compatible chat completion endpoint.
#[derive(Debug, Clone, PartialEq)]
pub struct GeneratorConfig {
    /// Base URL; `/chat/completions` is appended.
    pub endpoint: String,
    pub api_key: Option<String>,
    pub model: String,
    pub timeout: Duration,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(120),
            temperature: 0.7,
            max_tokens: 4000,
        }
    }
}

impl GeneratorConfig {
    pub fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.endpoint.trim_end_matches('/'))
    }
}
