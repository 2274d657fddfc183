// Pricing Lookup Port (§4.5)

use crate::domain::PricingCategory;
use crate::port::generator::ProviderError;
use async_trait::async_trait;
use std::collections::HashMap;

#[derive(Debug, Clone)]
pub struct PriceQuote {
    pub price_cents: i64,
    pub renewal_cents: Option<i64>,
    pub category: PricingCategory,
}

/// Bulk registrar pricing lookup. Missing entries are permitted; availability is never
/// invalidated by a pricing failure (§4.5, §7 ProviderDegraded/LookupUnknown).
#[async_trait]
pub trait PricingLookup: Send + Sync {
    async fn bulk(&self, domains: &[String]) -> Result<HashMap<String, PriceQuote>, ProviderError>;
}

pub mod mocks {
    use super::*;
    use std::sync::Mutex;

    pub struct MockPricingLookup {
        prices: Mutex<HashMap<String, PriceQuote>>,
    }

    impl MockPricingLookup {
        pub fn new() -> Self {
            Self {
                prices: Mutex::new(HashMap::new()),
            }
        }

        pub fn set(&self, domain: &str, price_cents: i64) {
            self.prices.lock().unwrap().insert(
                domain.to_string(),
                PriceQuote {
                    price_cents,
                    renewal_cents: None,
                    category: PricingCategory::from_price_cents(Some(price_cents)),
                },
            );
        }
    }

    impl Default for MockPricingLookup {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl PricingLookup for MockPricingLookup {
        async fn bulk(
            &self,
            domains: &[String],
        ) -> Result<HashMap<String, PriceQuote>, ProviderError> {
            let prices = self.prices.lock().unwrap();
            Ok(domains
                .iter()
                .filter_map(|d| prices.get(d).map(|q| (d.clone(), q.clone())))
                .collect())
        }
    }
}
