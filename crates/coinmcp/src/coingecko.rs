use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;
use tracing::{error, info};

#[cfg(test)]
use mockall::automock;

pub const COINGECKO_BASE_URL: &str = "https://api.coingecko.com/api/v3";
pub const REQUEST_TIMEOUT_SECS: u64 = 10;
pub const TRENDING_LIMIT: usize = 7;
pub const MAX_MARKET_LIMIT: u32 = 100;

const ERROR_BODY_LIMIT: usize = 200;

#[derive(Error, Debug)]
pub enum CoinError {
    #[error("CoinGecko API timeout")]
    Timeout,

    #[error("Rate limit exceeded. Please try again later.")]
    RateLimited,

    #[error("CoinGecko API error ({status}): {body}")]
    Upstream { status: StatusCode, body: String },

    #[error("Coin '{0}' not found. Please check the coin ID.")]
    NotFound(String),

    #[error("Unexpected API response: {0}")]
    UnexpectedResponse(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoinError {
    /// The HTTP status this failure corresponds to
    pub fn http_status(&self) -> StatusCode {
        match self {
            CoinError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            CoinError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            CoinError::Upstream { status, .. } => *status,
            CoinError::NotFound(_) => StatusCode::NOT_FOUND,
            CoinError::UnexpectedResponse(_) | CoinError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<reqwest::Error> for CoinError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CoinError::Timeout
        } else if err.is_decode() {
            CoinError::UnexpectedResponse(err.to_string())
        } else {
            CoinError::Internal(err.to_string())
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub coin: String,
    pub currency: String,
    pub price: Option<f64>,
    pub market_cap: Option<f64>,
    pub volume_24h: Option<f64>,
    pub change_24h: Option<f64>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingCoin {
    pub id: Option<String>,
    pub name: Option<String>,
    pub symbol: Option<String>,
    pub market_cap_rank: Option<u32>,
    pub price_btc: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendingCoins {
    pub trending_coins: Vec<TrendingCoin>,
    pub count: usize,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketEntry {
    pub id: Option<String>,
    pub symbol: Option<String>,
    pub name: Option<String>,
    pub current_price: Option<f64>,
    pub market_cap: Option<f64>,
    pub market_cap_rank: Option<u32>,
    pub total_volume: Option<f64>,
    pub price_change_24h: Option<f64>,
    pub ath: Option<f64>,
    pub atl: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub markets: Vec<MarketEntry>,
    pub currency: String,
    pub count: usize,
    pub timestamp: DateTime<Utc>,
}

// `coins/markets` reports both an absolute and a percentage 24h change; only the
// percentage is surfaced, under the `price_change_24h` name.
#[derive(Debug, Deserialize)]
struct RawMarketEntry {
    id: Option<String>,
    symbol: Option<String>,
    name: Option<String>,
    current_price: Option<f64>,
    market_cap: Option<f64>,
    market_cap_rank: Option<u32>,
    total_volume: Option<f64>,
    price_change_percentage_24h: Option<f64>,
    ath: Option<f64>,
    atl: Option<f64>,
}

impl From<RawMarketEntry> for MarketEntry {
    fn from(raw: RawMarketEntry) -> Self {
        Self {
            id: raw.id,
            symbol: raw.symbol,
            name: raw.name,
            current_price: raw.current_price,
            market_cap: raw.market_cap,
            market_cap_rank: raw.market_cap_rank,
            total_volume: raw.total_volume,
            price_change_24h: raw.price_change_percentage_24h,
            ath: raw.ath,
            atl: raw.atl,
        }
    }
}

#[derive(Debug, Deserialize)]
struct TrendingResponse {
    coins: Option<Vec<TrendingItem>>,
}

#[derive(Debug, Deserialize)]
struct TrendingItem {
    #[serde(default)]
    item: Option<TrendingCoin>,
}

/// Read-only market data operations backing the crypto tools
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MarketData: Send + Sync {
    /// Current price, market cap, 24h volume and 24h change of a coin
    async fn price(&self, coin_id: &str, vs_currency: &str) -> Result<PriceQuote, CoinError>;

    /// The currently trending coins, at most [`TRENDING_LIMIT`] of them
    async fn trending(&self) -> Result<TrendingCoins, CoinError>;

    /// Top coins ranked by market cap, `limit` is clamped into 1..=100
    async fn market(&self, vs_currency: &str, limit: u32) -> Result<MarketSnapshot, CoinError>;
}

#[derive(Debug, Clone)]
pub struct CoinGeckoConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for CoinGeckoConfig {
    fn default() -> Self {
        Self {
            base_url: COINGECKO_BASE_URL.to_string(),
            timeout: Duration::from_secs(REQUEST_TIMEOUT_SECS),
        }
    }
}

pub struct CoinGeckoClient {
    client: Client,
    config: CoinGeckoConfig,
}

impl CoinGeckoClient {
    pub fn new(config: CoinGeckoConfig) -> Result<Self, CoinError> {
        let client = Client::builder().timeout(config.timeout).build()?;
        Ok(Self { client, config })
    }

    async fn get<T: DeserializeOwned>(
        &self,
        endpoint: &str,
        params: &[(&str, String)],
    ) -> Result<T, CoinError> {
        let url = format!(
            "{}/{}",
            self.config.base_url.trim_end_matches('/'),
            endpoint
        );

        info!("Making request to CoinGecko: {}", endpoint);
        let response = self
            .client
            .get(&url)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                error!("Request to {} failed: {}", endpoint, e);
                CoinError::from(e)
            })?;

        match response.status() {
            status if status.is_success() => Ok(response.json().await?),
            StatusCode::TOO_MANY_REQUESTS => {
                error!("HTTP error 429 for {}", endpoint);
                Err(CoinError::RateLimited)
            }
            status => {
                error!("HTTP error {} for {}", status.as_u16(), endpoint);
                let body = response.text().await.unwrap_or_default();
                Err(CoinError::Upstream {
                    status,
                    body: body.chars().take(ERROR_BODY_LIMIT).collect(),
                })
            }
        }
    }
}

#[async_trait]
impl MarketData for CoinGeckoClient {
    async fn price(&self, coin_id: &str, vs_currency: &str) -> Result<PriceQuote, CoinError> {
        info!("Getting price for {} in {}", coin_id, vs_currency);
        let params = [
            ("ids", coin_id.to_string()),
            ("vs_currencies", vs_currency.to_string()),
            ("include_market_cap", "true".to_string()),
            ("include_24hr_vol", "true".to_string()),
            ("include_24hr_change", "true".to_string()),
        ];
        let data: HashMap<String, HashMap<String, Value>> =
            self.get("simple/price", &params).await?;

        let coin = data
            .get(coin_id)
            .ok_or_else(|| CoinError::NotFound(coin_id.to_string()))?;
        let field = |key: String| coin.get(&key).and_then(Value::as_f64);

        Ok(PriceQuote {
            coin: coin_id.to_string(),
            currency: vs_currency.to_string(),
            price: field(vs_currency.to_string()),
            market_cap: field(format!("{}_market_cap", vs_currency)),
            volume_24h: field(format!("{}_24h_vol", vs_currency)),
            change_24h: field(format!("{}_24h_change", vs_currency)),
            timestamp: Utc::now(),
        })
    }

    async fn trending(&self) -> Result<TrendingCoins, CoinError> {
        info!("Getting trending coins");
        let data: TrendingResponse = self.get("search/trending", &[]).await?;
        let coins = data
            .coins
            .ok_or_else(|| CoinError::UnexpectedResponse("missing 'coins' field".to_string()))?;

        let trending_coins: Vec<TrendingCoin> = coins
            .into_iter()
            .take(TRENDING_LIMIT)
            .map(|entry| {
                entry.item.unwrap_or(TrendingCoin {
                    id: None,
                    name: None,
                    symbol: None,
                    market_cap_rank: None,
                    price_btc: None,
                })
            })
            .collect();

        Ok(TrendingCoins {
            count: trending_coins.len(),
            trending_coins,
            timestamp: Utc::now(),
        })
    }

    async fn market(&self, vs_currency: &str, limit: u32) -> Result<MarketSnapshot, CoinError> {
        let limit = limit.clamp(1, MAX_MARKET_LIMIT);
        info!("Getting market data for top {} coins in {}", limit, vs_currency);
        let params = [
            ("vs_currency", vs_currency.to_string()),
            ("order", "market_cap_desc".to_string()),
            ("per_page", limit.to_string()),
            ("page", "1".to_string()),
            ("sparkline", "false".to_string()),
        ];
        let raw: Vec<RawMarketEntry> = self.get("coins/markets", &params).await?;
        let markets: Vec<MarketEntry> = raw.into_iter().map(MarketEntry::from).collect();
        if markets.is_empty() {
            return Err(CoinError::UnexpectedResponse(
                "No market data available".to_string(),
            ));
        }

        Ok(MarketSnapshot {
            count: markets.len(),
            markets,
            currency: vs_currency.to_string(),
            timestamp: Utc::now(),
        })
    }
}
