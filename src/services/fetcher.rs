use std::future::Future;

use reqwest::header::{CACHE_CONTROL, PRAGMA};
use reqwest::StatusCode;
use serde_json::Value;
use thiserror::Error as ThisError;
use tracing::debug;

use crate::constants::PRICE_API_BASE;

/// The single error kind a refresh cycle has to handle. Covers transport
/// failures, non-2xx responses, and a response body without a usable
/// price. There is no retry here; the scheduler's next tick is the retry
/// mechanism.
#[derive(ThisError, Debug)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected status {0} from price API")]
    Status(StatusCode),

    #[error("missing or non-numeric ltp field in price response")]
    MissingPrice,
}

/// Anything that can produce a last-traded price for a symbol.
///
/// The HTTP client below is the production source; tests substitute
/// canned or failing sources to drive the refresh cycle offline.
pub trait PriceSource: Send + Sync + 'static {
    fn fetch_price(
        &self,
        symbol: &str,
    ) -> impl Future<Output = Result<f64, FetchError>> + Send;
}

/// HTTP price source for the NEPSE quote API.
pub struct PriceFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl PriceFetcher {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: PRICE_API_BASE.to_string(),
        }
    }
}

impl Default for PriceFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl PriceSource for PriceFetcher {
    /// One GET per call, cache-busted with a millisecond timestamp and
    /// no-cache headers so intermediate caches never serve a stale quote.
    async fn fetch_price(&self, symbol: &str) -> Result<f64, FetchError> {
        let cache_buster = chrono::Utc::now().timestamp_millis().to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("symbol", symbol), ("t", cache_buster.as_str())])
            .header(CACHE_CONTROL, "no-cache")
            .header(PRAGMA, "no-cache")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status));
        }

        let body: Value = response.json().await?;
        let ltp = parse_ltp(&body)?;
        debug!(symbol, ltp, "Fetched quote");
        Ok(ltp)
    }
}

/// Extract the numeric last-traded price from a quote response body.
pub fn parse_ltp(body: &Value) -> Result<f64, FetchError> {
    body.get("ltp")
        .and_then(Value::as_f64)
        .ok_or(FetchError::MissingPrice)
}
