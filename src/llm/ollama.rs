use super::LanguageModel;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};

pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// A model served by a local Ollama instance
pub struct OllamaModel {
    client: Client,
    base_url: String,
    model: String,
}

impl OllamaModel {
    pub fn new(model: &str, base_url: Option<&str>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.unwrap_or(DEFAULT_OLLAMA_URL).trim_end_matches('/').to_string(),
            model: model.to_string(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/api/generate", self.base_url)
    }

    fn request_body(&self, prompt: &str) -> Value {
        json!({
            "model": self.model,
            "prompt": prompt,
            "stream": false
        })
    }
}

#[async_trait]
impl LanguageModel for OllamaModel {
    fn name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, prompt: &str) -> Result<String> {
        debug!("Making API call to Ollama model {}", self.model);
        let response = self.client.post(self.endpoint()).json(&self.request_body(prompt)).send().await?;

        if !response.status().is_success() {
            return Err(anyhow!("Ollama API error: {}", response.status()));
        }

        let response_json: Value = response.json().await?;
        extract_completion(&response_json)
    }
}

fn extract_completion(response_json: &Value) -> Result<String> {
    response_json["response"]
        .as_str()
        .map(str::to_string)
        .ok_or_else(|| anyhow!("Invalid response format from Ollama"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let model = OllamaModel::new("llama3", Some("http://gpu-box:11434/"));
        assert_eq!(model.endpoint(), "http://gpu-box:11434/api/generate");
    }

    #[test]
    fn test_request_body_disables_streaming() {
        let model = OllamaModel::new("llama3", None);
        let body = model.request_body("hello");
        assert_eq!(body["model"], "llama3");
        assert_eq!(body["prompt"], "hello");
        assert_eq!(body["stream"], false);
    }

    #[test]
    fn test_extract_completion() {
        let ok = json!({"model": "llama3", "response": "{\"action_items\": []}", "done": true});
        assert_eq!(extract_completion(&ok).unwrap(), "{\"action_items\": []}");
        assert!(extract_completion(&json!({"error": "model not found"})).is_err());
    }
}
