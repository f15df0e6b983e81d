//! Wrapper around a Gemini-style text completion API.

pub mod chat;

use crate::settings::AiSettings;
use anyhow::Result;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use chat::{ChatCommand, ChatMessage, ChatSession, MessageBody, Sender};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Part {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Content {
    #[serde(default)]
    pub parts: Vec<Part>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationConfig {
    pub temperature: f32,
    pub top_k: u32,
    pub top_p: f32,
    pub max_output_tokens: u32,
}

impl From<&AiSettings> for GenerationConfig {
    fn from(settings: &AiSettings) -> Self {
        Self {
            temperature: settings.temperature,
            top_k: settings.top_k,
            top_p: settings.top_p,
            max_output_tokens: settings.max_output_tokens,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateRequest {
    pub contents: Vec<Content>,
    pub generation_config: GenerationConfig,
}

impl GenerateRequest {
    pub fn new(prompt: &str, generation_config: GenerationConfig) -> Self {
        Self {
            contents: vec![Content {
                parts: vec![Part {
                    text: prompt.to_string(),
                }],
            }],
            generation_config,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Candidate {
    #[serde(default)]
    pub content: Option<Content>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GenerateResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

impl GenerateResponse {
    /// Text of the first part of the first candidate.
    pub fn text(&self) -> Option<&str> {
        self.candidates
            .first()?
            .content
            .as_ref()?
            .parts
            .first()
            .map(|p| p.text.as_str())
    }
}

/// The only three failure messages a user ever sees from the assistant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorBucket {
    QuotaOrAuth,
    MalformedRequest,
    Connectivity,
}

impl ErrorBucket {
    pub fn message(self) -> &'static str {
        match self {
            ErrorBucket::QuotaOrAuth => {
                "API key might be invalid or quota exceeded. Please check your internet connection and try again."
            }
            ErrorBucket::MalformedRequest => {
                "There was an issue with the request format. Please try rephrasing your question."
            }
            ErrorBucket::Connectivity => {
                "Sorry, I'm having trouble connecting to the AI service. Please check your internet connection and try again."
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AiError {
    MissingApiKey,
    Status(u16),
    Transport(String),
    InvalidResponse,
}

impl AiError {
    pub fn bucket(&self) -> ErrorBucket {
        match self {
            AiError::MissingApiKey | AiError::Status(401 | 403 | 429) => ErrorBucket::QuotaOrAuth,
            AiError::Status(400) => ErrorBucket::MalformedRequest,
            AiError::Status(_) | AiError::Transport(_) | AiError::InvalidResponse => {
                ErrorBucket::Connectivity
            }
        }
    }
}

impl std::fmt::Display for AiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AiError::MissingApiKey => write!(f, "no API key configured"),
            AiError::Status(code) => write!(f, "API request failed with status {code}"),
            AiError::Transport(e) => write!(f, "transport error: {e}"),
            AiError::InvalidResponse => write!(f, "invalid response format from API"),
        }
    }
}

impl std::error::Error for AiError {}

/// Anything that turns a prompt into a completion.
pub trait CompletionService: Send + Sync {
    fn complete(&self, prompt: &str) -> Result<String, AiError>;
}

pub struct GeminiClient {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    generation: GenerationConfig,
}

impl GeminiClient {
    pub fn new(settings: &AiSettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs.max(1)))
            .user_agent("padboard ai assistant")
            .build()?;
        Ok(Self {
            client,
            endpoint: settings.endpoint.clone(),
            api_key: settings.resolved_api_key(),
            generation: GenerationConfig::from(settings),
        })
    }
}

impl CompletionService for GeminiClient {
    fn complete(&self, prompt: &str) -> Result<String, AiError> {
        let key = self.api_key.as_deref().ok_or(AiError::MissingApiKey)?;
        let body = serde_json::to_vec(&GenerateRequest::new(prompt, self.generation))
            .map_err(|e| AiError::Transport(e.to_string()))?;
        let resp = self
            .client
            .post(&self.endpoint)
            .query(&[("key", key)])
            .header(CONTENT_TYPE, "application/json")
            .body(body)
            .send()
            .map_err(|e| AiError::Transport(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(AiError::Status(status.as_u16()));
        }
        let bytes = resp
            .bytes()
            .map_err(|e| AiError::Transport(e.to_string()))?;
        let parsed: GenerateResponse =
            serde_json::from_slice(&bytes).map_err(|_| AiError::InvalidResponse)?;
        parsed
            .text()
            .map(str::to_string)
            .ok_or(AiError::InvalidResponse)
    }
}
