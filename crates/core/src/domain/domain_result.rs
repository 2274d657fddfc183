// DomainResult Domain Model — one row per checked domain string within a job.

use serde::{Deserialize, Serialize};

/// Registry-lookup status for a candidate domain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum AvailabilityStatus {
    Available,
    Registered,
    #[default]
    Unknown,
}

impl std::fmt::Display for AvailabilityStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AvailabilityStatus::Available => write!(f, "available"),
            AvailabilityStatus::Registered => write!(f, "registered"),
            AvailabilityStatus::Unknown => write!(f, "unknown"),
        }
    }
}

impl std::str::FromStr for AvailabilityStatus {
    type Err = crate::domain::error::DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "available" => Ok(AvailabilityStatus::Available),
            "registered" => Ok(AvailabilityStatus::Registered),
            "unknown" => Ok(AvailabilityStatus::Unknown),
            other => Err(crate::domain::error::DomainError::ValidationError(format!(
                "unknown availability status: {other}"
            ))),
        }
    }
}

/// Display pricing category, derived from `price_cents` (§4.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PricingCategory {
    Bundled,
    Recommended,
    Premium,
    Unknown,
}

impl PricingCategory {
    pub fn from_price_cents(price_cents: Option<i64>) -> Self {
        match price_cents {
            None => PricingCategory::Unknown,
            Some(cents) if cents <= 3000 => PricingCategory::Bundled,
            Some(cents) if cents <= 5000 => PricingCategory::Recommended,
            Some(_) => PricingCategory::Premium,
        }
    }
}

/// One evaluated, checked, (possibly priced) domain candidate within a job.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DomainResult {
    pub batch_num: i64,
    pub domain: String,
    pub tld: String,
    pub status: AvailabilityStatus,
    pub price_cents: Option<i64>,
    pub score: f64,
    pub flags: Vec<String>,
    pub evaluation_data: serde_json::Value,
}

impl DomainResult {
    /// `status = available && score >= 0.8` (§4.2, §8 P4). Independent of the 0.4 admission
    /// threshold used earlier in the pipeline — the two must never be conflated.
    pub fn is_good(&self) -> bool {
        self.status == AvailabilityStatus::Available && self.score >= 0.8
    }

    pub fn pricing_category(&self) -> PricingCategory {
        PricingCategory::from_price_cents(self.price_cents)
    }

    pub fn tld_from_domain(domain: &str) -> String {
        domain
            .rsplit('.')
            .next()
            .unwrap_or_default()
            .to_ascii_lowercase()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(status: AvailabilityStatus, score: f64) -> DomainResult {
        DomainResult {
            batch_num: 1,
            domain: "sunrisebakery.com".to_string(),
            tld: "com".to_string(),
            status,
            price_cents: Some(1200),
            score,
            flags: vec![],
            evaluation_data: serde_json::json!({}),
        }
    }

    #[test]
    fn good_requires_available_and_high_score() {
        assert!(result(AvailabilityStatus::Available, 0.8).is_good());
        assert!(!result(AvailabilityStatus::Available, 0.79).is_good());
        assert!(!result(AvailabilityStatus::Registered, 0.95).is_good());
    }

    #[test]
    fn pricing_category_cutoffs_are_in_cents() {
        assert_eq!(
            PricingCategory::from_price_cents(Some(3000)),
            PricingCategory::Bundled
        );
        assert_eq!(
            PricingCategory::from_price_cents(Some(3001)),
            PricingCategory::Recommended
        );
        assert_eq!(
            PricingCategory::from_price_cents(Some(5001)),
            PricingCategory::Premium
        );
        assert_eq!(
            PricingCategory::from_price_cents(None),
            PricingCategory::Unknown
        );
    }

    #[test]
    fn tld_extraction_lowercases() {
        assert_eq!(DomainResult::tld_from_domain("Foo.BAKERY.CO"), "co");
    }
}
