use anyhow::Result;
use async_trait::async_trait;
use serde_json::Value;

/// Base trait for LLM providers (Ollama, OpenAI, etc)
#[async_trait]
pub trait Provider: Send + Sync {
    /// Ask the model for a reply constrained to the given JSON schema.
    ///
    /// Returns the raw text of the assistant message; decoding it against the
    /// schema is the caller's job.
    async fn complete(&self, system: &str, user: &str, schema: &Value) -> Result<String>;
}
