//! OpenAI chat-completions backend.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::{Classification, EmotionAnalysis, EmotionClassifier};
use crate::error::LabelUnavailable;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const API_KEY_ENV: &str = "OPENAI_API_KEY";

const SYSTEM_PROMPT: &str = "You are an expert emotion analyst. Respond only with valid JSON.";

#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub endpoint: String,
    pub model: String,
    pub timeout: Duration,
    pub max_tokens: u32,
    pub temperature: f32,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(30),
            max_tokens: 300,
            temperature: 0.3,
        }
    }

    /// Config from `OPENAI_API_KEY`, `None` when unset or blank
    pub fn from_env() -> Option<Self> {
        std::env::var(API_KEY_ENV)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .map(Self::new)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    max_tokens: u32,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    content: Option<String>,
}

/// Emotion classifier backed by an OpenAI-compatible chat endpoint
pub struct OpenAiClassifier {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiClassifier {
    pub fn new(config: OpenAiConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }

    /// Ask the model for a full analysis of `text`
    pub async fn analyze(&self, text: &str) -> Result<EmotionAnalysis, LabelUnavailable> {
        let reply = self.complete(text).await?;
        parse_analysis(&reply).ok_or_else(|| {
            LabelUnavailable::MalformedResponse("reply is not an emotion analysis object".to_string())
        })
    }

    async fn complete(&self, text: &str) -> Result<String, LabelUnavailable> {
        let prompt = build_prompt(text);
        let request = ChatRequest {
            model: &self.config.model,
            messages: [
                ChatMessage { role: "system", content: SYSTEM_PROMPT },
                ChatMessage { role: "user", content: &prompt },
            ],
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
        };

        tracing::debug!(model = %self.config.model, "Requesting emotion analysis");

        let response = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LabelUnavailable::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LabelUnavailable::Status(status.as_u16()));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| LabelUnavailable::MalformedResponse(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .map(|content| content.trim().to_string())
            .filter(|content| !content.is_empty())
            .ok_or_else(|| LabelUnavailable::MalformedResponse("empty completion".to_string()))
    }
}

#[async_trait::async_trait]
impl EmotionClassifier for OpenAiClassifier {
    async fn classify(&self, text: &str) -> Result<String, LabelUnavailable> {
        self.classify_detailed(text).await.map(|classification| classification.label)
    }

    async fn classify_detailed(&self, text: &str) -> Result<Classification, LabelUnavailable> {
        let reply = self.complete(text).await?;
        parse_reply(&reply)
    }

    fn name(&self) -> String {
        format!("OpenAI {}", self.config.model)
    }
}

fn build_prompt(text: &str) -> String {
    // Debug formatting quotes and escapes the text
    format!(
        "Analyze the emotional content of the following text and provide:\n\
         1. Primary emotion (joy, sadness, anger, fear, surprise, disgust, neutral)\n\
         2. Secondary emotions (if any)\n\
         3. Emotion intensity (1-10 scale)\n\
         4. Emotional keywords found in the text\n\
         5. Sentiment (positive, negative, neutral)\n\n\
         Text to analyze: {text:?}\n\n\
         Please respond in JSON format with keys: primary_emotion, secondary_emotions, \
         intensity, keywords, sentiment, explanation"
    )
}

/// Models sometimes wrap JSON in a markdown code fence
fn strip_code_fence(reply: &str) -> &str {
    let trimmed = reply.trim();
    let Some(inner) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let inner = inner.strip_prefix("json").unwrap_or(inner);
    inner.strip_suffix("```").unwrap_or(inner).trim()
}

fn parse_analysis(reply: &str) -> Option<EmotionAnalysis> {
    let value: Value = serde_json::from_str(strip_code_fence(reply)).ok()?;
    EmotionAnalysis::from_value(&value)
}

/// Turn a model reply into a label.
///
/// A JSON analysis yields `"Primary + Secondary"` and is kept alongside;
/// anything else is taken as a plain one-line label.
fn parse_reply(reply: &str) -> Result<Classification, LabelUnavailable> {
    if let Some(analysis) = parse_analysis(reply) {
        return Ok(Classification::from(analysis));
    }

    let stripped = strip_code_fence(reply);
    if stripped.starts_with('{') || stripped.starts_with('[') {
        return Err(LabelUnavailable::MalformedResponse(
            "JSON reply without a primary emotion".to_string(),
        ));
    }

    stripped
        .lines()
        .map(|line| line.trim().trim_matches('"').trim())
        .find(|line| !line.is_empty())
        .map(|label| Classification { label: label.to_string(), analysis: None })
        .ok_or_else(|| LabelUnavailable::MalformedResponse("empty reply".to_string()))
}
