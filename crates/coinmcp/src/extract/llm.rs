use indoc::indoc;
use serde::Deserialize;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::warn;

use super::dedup_preserving_order;
use crate::prompt_template::load_prompt;
use crate::providers::base::Provider;

const SYSTEM_PROMPT: &str = include_str!("../prompts/extract_action_items.md");

const USER_TEMPLATE: &str = indoc! {"
    Please extract all action items from the following notes:

    {{ text }}"};

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("LLM provider failed: {0}")]
    Provider(anyhow::Error),

    #[error("Malformed LLM response: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("Failed to render prompt: {0}")]
    Prompt(#[from] tera::Error),
}

/// Structured output the model is constrained to
#[derive(Debug, Deserialize)]
struct ActionItems {
    items: Vec<String>,
}

fn action_items_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "items": {
                "type": "array",
                "items": { "type": "string" }
            }
        },
        "required": ["items"],
        "additionalProperties": false
    })
}

/// Extracts action items by asking a language model for schema-constrained JSON
pub struct LlmExtractor {
    provider: Arc<dyn Provider>,
}

impl LlmExtractor {
    pub fn new(provider: Arc<dyn Provider>) -> Self {
        Self { provider }
    }

    /// Extract action items, recovering from any failure with an empty list.
    ///
    /// Blank input never reaches the provider. There is no fallback to the
    /// heuristic strategy.
    pub async fn extract(&self, text: Option<&str>) -> Vec<String> {
        let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
            return Vec::new();
        };

        match self.try_extract(text).await {
            Ok(items) => items,
            Err(err) => {
                warn!("Error in LLM extraction: {}", err);
                Vec::new()
            }
        }
    }

    pub async fn try_extract(&self, text: &str) -> Result<Vec<String>, ExtractionError> {
        let context = HashMap::from([("text", text)]);
        let user_prompt = load_prompt(USER_TEMPLATE, &context)?;

        let reply = self
            .provider
            .complete(SYSTEM_PROMPT, &user_prompt, &action_items_schema())
            .await
            .map_err(ExtractionError::Provider)?;

        let parsed: ActionItems = serde_json::from_str(&reply)?;
        let cleaned = parsed
            .items
            .into_iter()
            .map(|item| item.trim().to_string())
            .filter(|item| !item.is_empty());

        Ok(dedup_preserving_order(cleaned))
    }
}
