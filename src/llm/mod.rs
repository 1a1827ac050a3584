//! Language model backends
//!
//! Each backend turns a prompt into a raw text completion. Interpreting the
//! completion is the job of [`crate::extract`].

pub mod ollama;
pub mod openai;

use crate::config::{LLMProvider, LanguageModelConfig};
use anyhow::Result;
use async_trait::async_trait;
use log::info;

pub use ollama::OllamaModel;
pub use openai::OpenAIModel;

/// A text completion backend.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Human readable backend name, used in logs
    fn name(&self) -> &str;

    /// Complete `prompt` and return the raw response text.
    async fn complete(&self, prompt: &str) -> Result<String>;
}

/// Factory for creating the configured language model
pub struct ModelFactory;

impl ModelFactory {
    pub fn create_model(config: &LanguageModelConfig) -> Result<Box<dyn LanguageModel>> {
        let model = config.model_name();
        match config.provider {
            LLMProvider::Ollama => {
                info!("Creating Ollama model '{}'", model);
                Ok(Box::new(OllamaModel::new(model, config.base_url.as_deref())))
            }
            LLMProvider::OpenAI => {
                info!("Creating OpenAI model '{}'", model);
                Ok(Box::new(OpenAIModel::from_env(model, config.base_url.as_deref())?))
            }
        }
    }
}
