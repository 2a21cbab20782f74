//! React/TSX generation from rendered HTML and CSS.
//!
//! The language model is reached through [`TextCompletion`]; the generator only
//! assembles the prompt and cleans up the answer.

use log::debug;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use std::time::Duration;

use crate::config::CompletionSettings;
use crate::error::{F2cError, Result};
use crate::figma::sanitize_filename;

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
const DEFAULT_MODEL: &str = "gpt-4o";
const DEFAULT_MAX_TOKENS: u32 = 8192;
const MOCK_ENV: &str = "F2C_MOCK_COMPLETION";

const SYSTEM_PROMPT: &str = "You convert static HTML and CSS exported from Figma into a single \
React function component written in TypeScript (TSX). Keep the visual result identical: keep \
every class name, import the stylesheet as './{stylesheet}', use className instead of class, \
self-close void elements and keep inline SVG markup valid JSX. Answer with the component \
source only.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Opaque text-completion backend.
#[allow(async_fn_in_trait)]
pub trait TextCompletion {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String>;
}

/// Configuration for an OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_endpoint: String,
    pub api_key: String,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: Option<f32>,
}

impl OpenAiConfig {
    /// Config values first, then `F2C_COMPLETION_*` / `OPENAI_API_KEY`.
    /// Returns None when no API key is available.
    pub fn from_settings(settings: &CompletionSettings) -> Option<Self> {
        let api_key = settings
            .api_key
            .clone()
            .or_else(|| std::env::var("F2C_COMPLETION_API_KEY").ok())
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .filter(|key| !key.trim().is_empty())?;

        let api_endpoint = settings
            .api_endpoint
            .clone()
            .or_else(|| std::env::var("F2C_COMPLETION_ENDPOINT").ok())
            .unwrap_or_else(|| DEFAULT_ENDPOINT.to_string());

        let model = settings
            .model
            .clone()
            .or_else(|| std::env::var("F2C_COMPLETION_MODEL").ok())
            .unwrap_or_else(|| DEFAULT_MODEL.to_string());

        Some(Self {
            api_endpoint,
            api_key,
            model,
            max_tokens: settings.max_tokens.unwrap_or(DEFAULT_MAX_TOKENS),
            temperature: settings.temperature,
        })
    }
}

pub struct OpenAiCompletion {
    config: OpenAiConfig,
    client: reqwest::Client,
}

impl OpenAiCompletion {
    pub fn new(config: OpenAiConfig, timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { config, client })
    }
}

impl TextCompletion for OpenAiCompletion {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let mut payload = serde_json::json!({
            "model": self.config.model,
            "messages": messages,
            "max_tokens": self.config.max_tokens,
        });
        if let Some(temperature) = self.config.temperature {
            payload["temperature"] = serde_json::json!(temperature);
        }

        let response = self
            .client
            .post(&self.config.api_endpoint)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(&payload)
            .send()
            .await
            .map_err(|e| F2cError::completion(format!("completion request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(F2cError::completion(format!(
                "completion API returned {status}: {body}"
            )));
        }

        let resp: CompletionResponse = response
            .json()
            .await
            .map_err(|e| F2cError::completion(format!("failed to parse completion response: {e}")))?;

        resp.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| F2cError::completion("empty completion response"))
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    choices: Vec<CompletionChoice>,
}

#[derive(Debug, Deserialize)]
struct CompletionChoice {
    message: CompletionMessage,
}

#[derive(Debug, Deserialize)]
struct CompletionMessage {
    content: Option<String>,
}

/// Fixed completion used when `F2C_MOCK_COMPLETION` is set.
pub struct MockCompletion {
    response: String,
}

impl MockCompletion {
    pub fn new(response: impl Into<String>) -> Self {
        Self {
            response: response.into(),
        }
    }

    pub fn from_env() -> Option<Self> {
        std::env::var(MOCK_ENV)
            .ok()
            .filter(|mock| !mock.trim().is_empty())
            .map(Self::new)
    }
}

impl TextCompletion for MockCompletion {
    async fn complete(&self, _messages: &[ChatMessage]) -> Result<String> {
        Ok(self.response.clone())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReactComponent {
    pub name: String,
    pub source: String,
}

impl ReactComponent {
    pub fn file_name(&self) -> String {
        format!("{}.tsx", self.name)
    }

    pub fn write_to(&self, dir: &Path) -> Result<PathBuf> {
        let path = dir.join(self.file_name());
        std::fs::write(&path, &self.source)?;
        Ok(path)
    }
}

pub struct ReactGenerator<C> {
    completion: C,
}

impl<C: TextCompletion> ReactGenerator<C> {
    pub fn new(completion: C) -> Self {
        Self { completion }
    }

    pub async fn generate(&self, name: &str, html: &str, css: &str) -> Result<ReactComponent> {
        let component = pascal_case(name);
        let stylesheet = format!("{}.css", sanitize_filename(name));
        let messages = [
            ChatMessage::system(SYSTEM_PROMPT.replace("{stylesheet}", &stylesheet)),
            ChatMessage::user(format!(
                "Component name: {component}\n\nHTML:\n```html\n{html}\n```\n\nCSS:\n```css\n{css}\n```"
            )),
        ];
        debug!("requesting React component {component} ({} bytes of html)", html.len());

        let answer = self.completion.complete(&messages).await?;
        let source = strip_code_fence(&answer);
        if source.is_empty() {
            return Err(F2cError::completion("completion returned no component source"));
        }
        Ok(ReactComponent {
            name: component,
            source: format!("{source}\n"),
        })
    }
}

fn code_fence_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?s)^\s*```[A-Za-z0-9_+-]*[ \t]*\r?\n(.*?)\r?\n?```\s*$")
            .expect("code fence regex should compile")
    })
}

/// Body of a surrounding Markdown code fence, or the trimmed text.
pub fn strip_code_fence(text: &str) -> String {
    match code_fence_re().captures(text) {
        Some(caps) => caps[1].trim().to_string(),
        None => text.trim().to_string(),
    }
}

/// `PascalCase` identifier from a free-form name; `Component` when nothing usable remains.
pub fn pascal_case(name: &str) -> String {
    let mut out = String::new();
    for word in name.split(|c: char| !c.is_ascii_alphanumeric()) {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            out.push(first.to_ascii_uppercase());
            out.push_str(chars.as_str());
        }
    }
    if out.is_empty() {
        return "Component".to_string();
    }
    if out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert_str(0, "Component");
    }
    out
}
