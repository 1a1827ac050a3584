use super::LanguageModel;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde_json::{json, Value};
use std::env;

pub const DEFAULT_OPENAI_URL: &str = "https://api.openai.com/v1";

/// OpenAI chat completion model
pub struct OpenAIModel {
    client: Client,
    base_url: String,
    model: String,
    api_key: SecretString,
}

impl OpenAIModel {
    pub fn new(model: &str, base_url: Option<&str>, api_key: SecretString) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.unwrap_or(DEFAULT_OPENAI_URL).trim_end_matches('/').to_string(),
            model: model.to_string(),
            api_key,
        }
    }

    /// Build a model using `OPENAI_API_KEY`
    pub fn from_env(model: &str, base_url: Option<&str>) -> Result<Self> {
        let api_key = env::var("OPENAI_API_KEY")
            .map_err(|_| anyhow!("OPENAI_API_KEY environment variable not set"))?;
        Ok(Self::new(model, base_url, SecretString::from(api_key)))
    }

    fn request_body(&self, prompt: &str) -> Value {
        json!({
            "model": self.model,
            "messages": [
                {
                    "role": "system",
                    "content": "You extract time-sensitive action items from notes and answer only with JSON."
                },
                {
                    "role": "user",
                    "content": prompt
                }
            ],
            "temperature": 0.2
        })
    }
}

#[async_trait]
impl LanguageModel for OpenAIModel {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        debug!("Making API call to OpenAI model {}", self.model);
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .header("Authorization", format!("Bearer {}", self.api_key.expose_secret()))
            .json(&self.request_body(prompt))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("OpenAI API error: {}", response.status()));
        }

        let response_json: Value = response.json().await?;
        extract_completion(&response_json)
    }
}

fn extract_completion(response_json: &Value) -> Result<String> {
    response_json["choices"][0]["message"]["content"]
        .as_str()
        .map(|content| content.trim().to_string())
        .ok_or_else(|| anyhow!("Invalid response format"))
}
