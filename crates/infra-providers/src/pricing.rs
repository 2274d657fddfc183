// Bulk registrar pricing adapter (§4.5) — one configured endpoint, one request per batch.

use crate::constants::PROVIDER_TIMEOUT_MS;
use async_trait::async_trait;
use brandscout_core::domain::PricingCategory;
use brandscout_core::port::{PriceQuote, PricingLookup, ProviderError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

pub struct RegistrarPricingLookup {
    client: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
}

impl RegistrarPricingLookup {
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_millis(PROVIDER_TIMEOUT_MS))
                .build()
                .expect("reqwest client builds"),
            base_url: base_url.into(),
            api_key,
        }
    }
}

#[async_trait]
impl PricingLookup for RegistrarPricingLookup {
    async fn bulk(
        &self,
        domains: &[String],
    ) -> Result<HashMap<String, PriceQuote>, ProviderError> {
        if domains.is_empty() {
            return Ok(HashMap::new());
        }

        let mut request = self.client.post(format!("{}/pricing/bulk", self.base_url));
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request
            .json(&BulkRequest {
                domains: domains.to_vec(),
            })
            .send()
            .await
            .map_err(map_reqwest_error)?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ProviderError::MalformedReply(e.to_string()))?;

        if !status.is_success() {
            return Err(ProviderError::RequestFailed(format!(
                "pricing lookup returned {status}: {body}"
            )));
        }

        let parsed: BulkResponse = serde_json::from_str(&body)
            .map_err(|e| ProviderError::MalformedReply(format!("{e}: {body}")))?;

        Ok(parsed
            .prices
            .into_iter()
            .map(|(domain, entry)| {
                let quote = PriceQuote {
                    price_cents: entry.price_cents,
                    renewal_cents: entry.renewal_cents,
                    category: PricingCategory::from_price_cents(Some(entry.price_cents)),
                };
                (domain, quote)
            })
            .collect())
    }
}

fn map_reqwest_error(err: reqwest::Error) -> ProviderError {
    if err.is_timeout() {
        ProviderError::Timeout(PROVIDER_TIMEOUT_MS as i64)
    } else {
        ProviderError::RequestFailed(err.to_string())
    }
}

#[derive(Debug, Serialize)]
struct BulkRequest {
    domains: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct BulkResponse {
    prices: HashMap<String, PriceEntry>,
}

#[derive(Debug, Deserialize)]
struct PriceEntry {
    price_cents: i64,
    #[serde(default)]
    renewal_cents: Option<i64>,
}
