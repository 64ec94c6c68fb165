//! Action-item extraction from free-form notes
//!
//! Two interchangeable strategies produce the same shape of result, an ordered
//! list of action items with case-insensitive duplicates removed:
//! - [`heuristic`] recognizes bullets, checkboxes and keyword prefixes line by line
//! - [`llm`] delegates to a language model constrained to a JSON schema
pub mod heuristic;
pub mod llm;

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use self::llm::LlmExtractor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionMethod {
    Heuristic,
    Llm,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Extraction {
    pub items: Vec<String>,
    pub extraction_method: ExtractionMethod,
}

/// Selects an extraction strategy per call
pub struct Extractor {
    llm: LlmExtractor,
}

impl Extractor {
    pub fn new(llm: LlmExtractor) -> Self {
        Self { llm }
    }

    pub async fn extract(&self, text: &str, use_llm: bool) -> Extraction {
        if use_llm {
            Extraction {
                items: self.llm.extract(Some(text)).await,
                extraction_method: ExtractionMethod::Llm,
            }
        } else {
            Extraction {
                items: heuristic::extract_action_items(text),
                extraction_method: ExtractionMethod::Heuristic,
            }
        }
    }
}

/// Drop case-insensitive duplicates, keeping the first occurrence of each item
pub fn dedup_preserving_order<I>(items: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.to_lowercase()))
        .collect()
}
