// completion service - sends a health question to an openrouter-style api

use crate::Error;
use crate::core::session::UserContext;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
pub const DEFAULT_MODEL: &str = "qwen/qwen-2.5-72b-instruct";

/// Anything that can answer a single health question.
#[async_trait]
pub trait Completion: Send + Sync {
    async fn complete(&self, message: &str, context: &UserContext) -> Result<String, Error>;
}

#[derive(Debug, Clone)]
pub struct OpenRouterConfig {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
    /// sent as HTTP-Referer, openrouter uses it for attribution
    pub referer: String,
    pub title: String,
}

impl OpenRouterConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 500,
            timeout: Duration::from_secs(30),
            referer: "http://localhost".to_string(),
            title: "Arogya Sahayak".to_string(),
        }
    }

    /// Reads the key from `OPENROUTER_API_KEY` when none is given.
    pub fn from_env(api_key: Option<String>) -> Result<Self, Error> {
        let api_key = api_key
            .filter(|k| !k.is_empty())
            .or_else(|| std::env::var("OPENROUTER_API_KEY").ok())
            .filter(|k| !k.is_empty())
            .ok_or(Error::MissingApiKey)?;

        Ok(Self::new(api_key))
    }
}

pub struct OpenRouter {
    client: reqwest::Client,
    config: OpenRouterConfig,
}

// what we send
#[derive(Serialize)]
struct Request<'a> {
    model: &'a str,
    messages: Vec<Message>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Serialize)]
struct Message {
    role: &'static str,
    content: String,
}

// what comes back
#[derive(Deserialize)]
struct Response {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ReplyMessage,
}

#[derive(Deserialize)]
struct ReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

impl OpenRouter {
    pub fn new(config: OpenRouterConfig) -> Result<Self, Error> {
        let client = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    pub fn model(&self) -> &str {
        &self.config.model
    }
}

pub fn system_prompt(context: &UserContext) -> Result<String, Error> {
    let context = serde_json::to_string(context)?;

    Ok(format!(
        r#"You are Arogya Sahayak AI, a helpful medical assistant. Provide accurate, empathetic medical information while always recommending consulting healthcare professionals for serious concerns.

IMPORTANT: If the user mentions any serious symptoms like chest pain, difficulty breathing, severe headache, sudden weakness, seizures, high fever, suicidal thoughts, or other emergency symptoms, flag this as a red flag and recommend immediate medical attention.

User context: {context}

Please respond helpfully and identify any red flag symptoms."#
    ))
}

#[async_trait]
impl Completion for OpenRouter {
    async fn complete(&self, message: &str, context: &UserContext) -> Result<String, Error> {
        let request = Request {
            model: &self.config.model,
            messages: vec![
                Message {
                    role: "system",
                    content: system_prompt(context)?,
                },
                Message {
                    role: "user",
                    content: message.to_string(),
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let url = format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        );

        let response = self
            .client
            .post(url)
            .bearer_auth(&self.config.api_key)
            .header("HTTP-Referer", &self.config.referer)
            .header("X-Title", &self.config.title)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Completion(format!("{status}: {body}")));
        }

        let response: Response = response.json().await?;
        response
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .ok_or_else(|| Error::Completion("reply had no content".to_string()))
    }
}
