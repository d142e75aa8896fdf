use crate::core::fetch::{FetchError, QuoteSource};
use anyhow::Result;
use async_trait::async_trait;
use serde::Deserialize;
use std::collections::HashMap;
use tracing::{debug, instrument};

pub const DEFAULT_BASE_URL: &str = "https://api.exchangerate-api.com";
pub const DEFAULT_VERSION: &str = "v4";

/// Quote source for the `/{version}/latest/{from}` rates API.
pub struct ExchangeRateApi {
    base_url: String,
    version: String,
    client: reqwest::Client,
}

impl ExchangeRateApi {
    pub fn new(base_url: &str, version: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent("ratewatch/1.0")
            .build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            version: version.trim_matches('/').to_string(),
            client,
        })
    }

    fn latest_url(&self, from: &str) -> String {
        format!("{}/{}/latest/{}", self.base_url, self.version, from)
    }
}

#[derive(Debug, Deserialize)]
struct LatestResponse {
    rates: HashMap<String, serde_json::Value>,
}

#[async_trait]
impl QuoteSource for ExchangeRateApi {
    #[instrument(name = "ExchangeRateQuote", skip(self))]
    async fn quote(&self, from: &str, to: &str) -> Result<f64, FetchError> {
        let url = self.latest_url(from);
        debug!("Requesting exchange rates from {}", url);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(FetchError::Status {
                status: response.status(),
                from: from.to_string(),
            });
        }

        let text = response.text().await?;
        let data: LatestResponse = serde_json::from_str(&text).map_err(|e| FetchError::Body {
            from: from.to_string(),
            reason: e.to_string(),
        })?;

        let value = data.rates.get(to).ok_or_else(|| FetchError::MissingRate {
            from: from.to_string(),
            to: to.to_string(),
        })?;

        match value.as_f64() {
            Some(rate) if rate.is_finite() && rate > 0.0 => Ok(rate),
            Some(rate) => Err(FetchError::InvalidRate {
                from: from.to_string(),
                to: to.to_string(),
                rate,
            }),
            None => Err(FetchError::Body {
                from: from.to_string(),
                reason: format!("rate for {to} is not a number: {value}"),
            }),
        }
    }
}
