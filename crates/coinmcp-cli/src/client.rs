use anyhow::{anyhow, bail, Result};
use coinmcp::coingecko::CoinError;
use coinmcp::models::tool::{Tool, ToolCall, ToolCallResponse};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, warn};

/// Attempts made for a tool call before giving up on rate limiting
pub const MAX_ATTEMPTS: u32 = 3;
const BACKOFF_BASE: Duration = Duration::from_secs(2);

#[derive(Debug, Deserialize)]
struct ToolList {
    tools: Vec<Tool>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    detail: String,
}

/// Wait before retry number `attempt + 1`: `2^attempt * base`
pub fn backoff_delay(attempt: u32, base: Duration) -> Duration {
    base * 2u32.pow(attempt)
}

/// Client for the tool endpoints of a running server
pub struct McpClient {
    client: Client,
    server: String,
    api_key: String,
    backoff_base: Duration,
}

impl McpClient {
    pub fn new(server: &str, api_key: &str) -> Result<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            server: server.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            backoff_base: BACKOFF_BASE,
        })
    }

    pub fn with_backoff_base(mut self, base: Duration) -> Self {
        self.backoff_base = base;
        self
    }

    pub async fn list_tools(&self) -> Result<Vec<Tool>> {
        let response = self
            .client
            .post(format!("{}/mcp/list-tools", self.server))
            .bearer_auth(&self.api_key)
            .send()
            .await?;

        match response.status() {
            StatusCode::OK => Ok(response.json::<ToolList>().await?.tools),
            status => Err(request_error(status, response).await),
        }
    }

    /// Call a tool, backing off and retrying while it is rate limited.
    ///
    /// The server reports an upstream rate limit as an error envelope, so both
    /// that envelope and a plain HTTP 429 trigger a retry. Once the attempts
    /// run out the last rate-limited envelope is returned as is.
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<ToolCallResponse> {
        let call = ToolCall::new(name, arguments);

        for attempt in 0..MAX_ATTEMPTS {
            let response = self
                .client
                .post(format!("{}/mcp/call-tool", self.server))
                .bearer_auth(&self.api_key)
                .json(&call)
                .send()
                .await?;
            let retries_left = attempt + 1 < MAX_ATTEMPTS;

            match response.status() {
                // unknown tools come back as 404 with an error envelope
                StatusCode::OK | StatusCode::NOT_FOUND => {
                    let envelope = response.json::<ToolCallResponse>().await?;
                    if !(retries_left && is_rate_limited(&envelope)) {
                        return Ok(envelope);
                    }
                }
                StatusCode::TOO_MANY_REQUESTS if retries_left => {}
                status => return Err(request_error(status, response).await),
            }

            let delay = backoff_delay(attempt, self.backoff_base);
            warn!("Rate limited, retrying in {:?}", delay);
            tokio::time::sleep(delay).await;
        }

        Err(anyhow!("Rate limit exceeded after {} attempts", MAX_ATTEMPTS))
    }
}

/// Whether an envelope carries the upstream rate-limit failure
pub fn is_rate_limited(envelope: &ToolCallResponse) -> bool {
    envelope.is_error && envelope.text() == CoinError::RateLimited.to_string()
}

async fn request_error(status: StatusCode, response: reqwest::Response) -> anyhow::Error {
    let body = response.text().await.unwrap_or_default();
    debug!("Request failed with {}: {}", status, body);

    let detail = serde_json::from_str::<ErrorBody>(&body)
        .map(|e| e.detail)
        .unwrap_or(body);

    match status {
        StatusCode::UNAUTHORIZED => anyhow!("Unauthorized: {}", detail),
        StatusCode::TOO_MANY_REQUESTS => {
            anyhow!("Rate limit exceeded after {} attempts", MAX_ATTEMPTS)
        }
        _ => anyhow!("Request failed ({}): {}", status, detail),
    }
}

/// Reject anything but a JSON object as tool arguments
pub fn parse_arguments(raw: Option<&str>) -> Result<Value> {
    let Some(raw) = raw else {
        return Ok(Value::Object(Default::default()));
    };
    let value: Value = serde_json::from_str(raw)?;
    if !value.is_object() {
        bail!("Tool arguments must be a JSON object, got: {}", raw);
    }
    Ok(value)
}
