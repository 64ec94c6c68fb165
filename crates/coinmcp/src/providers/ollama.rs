use super::base::Provider;
use super::configs::OllamaProviderConfig;
use super::utils::response_text;
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::StatusCode;
use serde_json::{json, Value};

pub const OLLAMA_HOST: &str = "http://localhost:11434";
pub const OLLAMA_MODEL: &str = "llama3.1:8b";

pub struct OllamaProvider {
    client: Client,
    config: OllamaProviderConfig,
}

impl OllamaProvider {
    pub fn new(config: OllamaProviderConfig) -> Result<Self> {
        let client = Client::builder().timeout(config.timeout).build()?;

        Ok(Self { client, config })
    }

    async fn post(&self, payload: Value) -> Result<Value> {
        let url = format!("{}/api/chat", self.config.host.trim_end_matches('/'));

        let response = self.client.post(&url).json(&payload).send().await?;

        match response.status() {
            StatusCode::OK => Ok(response.json().await?),
            status if status == StatusCode::TOO_MANY_REQUESTS || status.as_u16() >= 500 => {
                Err(anyhow!("Server error: {}", status))
            }
            status => Err(anyhow!(
                "Request failed: {}\nModel: {}",
                status,
                self.config.model
            )),
        }
    }
}

#[async_trait]
impl Provider for OllamaProvider {
    async fn complete(&self, system: &str, user: &str, schema: &Value) -> Result<String> {
        let mut payload = json!({
            "model": self.config.model,
            "messages": [
                {"role": "system", "content": system},
                {"role": "user", "content": user}
            ],
            "stream": false,
            "format": schema
        });

        if let Some(temp) = self.config.temperature {
            payload["options"] = json!({ "temperature": temp });
        }

        let response = self.post(payload).await?;
        response_text(&response, "/message/content")
    }
}
