//! Action item extraction
//!
//! Sends a daily note to a language model, parses whatever comes back and
//! normalizes the result into items that can be scheduled.

pub mod normalize;
pub mod response;
pub mod time;

use crate::llm::LanguageModel;
use anyhow::Result;
use log::debug;
use serde::{Deserialize, Serialize};

pub use normalize::{normalize, normalize_with_duration, DEFAULT_DURATION_MINUTES, MAX_DURATION_MINUTES};
pub use response::parse_response;
pub use time::format_time;

/// An action item as the model wrote it. Times are free-form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawActionItem {
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub start_time: Option<String>,
    #[serde(default)]
    pub end_time: Option<String>,
}

/// An action item whose times are canonical `HH:MM` strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionItem {
    pub summary: String,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

const PROMPT_TEMPLATE: &str = r#"You are an intelligent assistant. Your task is to extract time-sensitive action items from the following markdown content.

{content}

For each action item, provide a summary, start time, and end time if available. If the end time is not available, use the beginning of the next event as its end time, or if it is more sensible allocate a more relevant end time (include the `by` keyword in your response). If a time is not specified, omit the start and end time.

Respond in valid JSON format with a key 'action_items', each having 'summary', 'start_time', and 'end_time' (if applicable). Use times like "3:30 PM". Do not include any additional text or comments before or after the JSON."#;

/// Build the extraction prompt for a note.
pub fn build_prompt(content: &str) -> String {
    PROMPT_TEMPLATE.replace("{content}", content)
}

/// Turns note content into scheduled-ready action items.
pub struct ActionItemExtractor<'a> {
    model: &'a dyn LanguageModel,
    default_duration_minutes: i64,
}

impl<'a> ActionItemExtractor<'a> {
    pub fn new(model: &'a dyn LanguageModel) -> Self {
        Self { model, default_duration_minutes: DEFAULT_DURATION_MINUTES }
    }

    pub fn with_default_duration(mut self, minutes: i64) -> Self {
        self.default_duration_minutes = minutes;
        self
    }

    /// Ask the model for action items in `content`.
    ///
    /// Transport failures from the model are returned as errors. A response
    /// that contains no usable JSON yields an empty list.
    pub async fn extract_action_items(&self, content: &str) -> Result<Vec<ActionItem>> {
        let prompt = build_prompt(content);
        debug!("Sending extraction prompt to {}", self.model.name());

        let response = self.model.complete(&prompt).await?;
        debug!("Raw response: {}", response);

        Ok(self.process_response(&response))
    }

    /// Parse and normalize a completion that was already obtained.
    pub fn process_response(&self, response: &str) -> Vec<ActionItem> {
        let raw = parse_response(response);
        debug!("Parsed {} raw action items", raw.len());
        normalize_with_duration(raw, self.default_duration_minutes)
    }
}
