// RDAP (Registration Data Access Protocol) availability adapter (§4.5).
//
// 404 -> available, 200 -> registered (registrar/expiration parsed from the `entities`/`events`
// arrays), anything else (non-2xx, timeout, malformed body) -> unknown. Never available, per
// invariant: a degraded lookup must not be mistaken for an open domain.

use crate::constants::PROVIDER_TIMEOUT_MS;
use async_trait::async_trait;
use brandscout_core::domain::AvailabilityStatus;
use brandscout_core::port::{AvailabilityLookup, AvailabilityRecord, ProviderError};
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

const UNIVERSAL_BASE_URL: &str = "https://rdap.org/domain";

/// Known per-TLD RDAP service bases. Anything not listed falls back to the universal
/// rdap.org redirector, which resolves the authoritative server via the IANA bootstrap.
static TLD_BASE_URLS: Lazy<HashMap<&'static str, &'static str>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("com", "https://rdap.verisign.com/com/v1/domain");
    m.insert("net", "https://rdap.verisign.com/net/v1/domain");
    m.insert("org", "https://rdap.publicinterestregistry.org/rdap/domain");
    m
});

pub struct RdapAvailabilityLookup {
    client: reqwest::Client,
}

impl RdapAvailabilityLookup {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_millis(PROVIDER_TIMEOUT_MS))
                .build()
                .expect("reqwest client builds"),
        }
    }

    fn base_url_for(domain: &str) -> String {
        let tld = domain.rsplit('.').next().unwrap_or(domain);
        match TLD_BASE_URLS.get(tld) {
            Some(base) => base.to_string(),
            None => UNIVERSAL_BASE_URL.to_string(),
        }
    }
}

impl Default for RdapAvailabilityLookup {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AvailabilityLookup for RdapAvailabilityLookup {
    async fn check(&self, domain: &str) -> Result<AvailabilityRecord, ProviderError> {
        let url = format!("{}/{domain}", Self::base_url_for(domain));

        let response = match self.client.get(&url).send().await {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!(domain, error = %e, "rdap lookup failed, returning unknown");
                return Ok(AvailabilityRecord {
                    status: AvailabilityStatus::Unknown,
                    registrar: None,
                    expiration: None,
                });
            }
        };

        if response.status() == reqwest::StatusCode::NOT_FOUND {
            return Ok(AvailabilityRecord {
                status: AvailabilityStatus::Available,
                registrar: None,
                expiration: None,
            });
        }

        if !response.status().is_success() {
            tracing::warn!(domain, status = %response.status(), "rdap lookup returned non-2xx, unknown");
            return Ok(AvailabilityRecord {
                status: AvailabilityStatus::Unknown,
                registrar: None,
                expiration: None,
            });
        }

        let body = match response.text().await {
            Ok(b) => b,
            Err(_) => {
                return Ok(AvailabilityRecord {
                    status: AvailabilityStatus::Unknown,
                    registrar: None,
                    expiration: None,
                })
            }
        };

        match serde_json::from_str::<RdapDomainResponse>(&body) {
            Ok(parsed) => Ok(AvailabilityRecord {
                status: AvailabilityStatus::Registered,
                registrar: parsed.registrar_name(),
                expiration: parsed.expiration_date(),
            }),
            Err(e) => {
                tracing::warn!(domain, error = %e, "rdap reply did not parse, unknown");
                Ok(AvailabilityRecord {
                    status: AvailabilityStatus::Unknown,
                    registrar: None,
                    expiration: None,
                })
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct RdapDomainResponse {
    #[serde(default)]
    entities: Vec<RdapEntity>,
    #[serde(default)]
    events: Vec<RdapEvent>,
}

#[derive(Debug, Deserialize)]
struct RdapEntity {
    #[serde(default)]
    roles: Vec<String>,
    #[serde(rename = "vcardArray", default)]
    vcard_array: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RdapEvent {
    #[serde(rename = "eventAction")]
    event_action: String,
    #[serde(rename = "eventDate")]
    event_date: String,
}

impl RdapDomainResponse {
    fn registrar_name(&self) -> Option<String> {
        let entity = self
            .entities
            .iter()
            .find(|e| e.roles.iter().any(|r| r == "registrar"))?;
        vcard_fn(entity.vcard_array.as_ref()?)
    }

    fn expiration_date(&self) -> Option<String> {
        self.events
            .iter()
            .find(|e| e.event_action == "expiration")
            .map(|e| e.event_date.clone())
    }
}

/// Pulls the `fn` (formatted name) property out of an RDAP jCard `vcardArray`
/// (`["vcard", [["version", {}, "text", "4.0"], ["fn", {}, "text", "Example Registrar"], ...]]`).
fn vcard_fn(vcard_array: &serde_json::Value) -> Option<String> {
    let properties = vcard_array.as_array()?.get(1)?.as_array()?;
    for property in properties {
        let fields = property.as_array()?;
        if fields.first()?.as_str()? == "fn" {
            return fields.get(3)?.as_str().map(|s| s.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tld_base_url_uses_known_table() {
        assert_eq!(
            RdapAvailabilityLookup::base_url_for("example.com"),
            "https://rdap.verisign.com/com/v1/domain"
        );
    }

    #[test]
    fn tld_base_url_falls_back_to_universal() {
        assert_eq!(
            RdapAvailabilityLookup::base_url_for("example.zzz"),
            UNIVERSAL_BASE_URL
        );
    }

    #[test]
    fn registrar_name_extracted_from_vcard() {
        let raw = serde_json::json!({
            "entities": [{
                "roles": ["registrar"],
                "vcardArray": ["vcard", [
                    ["version", {}, "text", "4.0"],
                    ["fn", {}, "text", "Example Registrar Inc."]
                ]]
            }],
            "events": [{"eventAction": "expiration", "eventDate": "2027-01-01T00:00:00Z"}]
        });
        let parsed: RdapDomainResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(
            parsed.registrar_name(),
            Some("Example Registrar Inc.".to_string())
        );
        assert_eq!(
            parsed.expiration_date(),
            Some("2027-01-01T00:00:00Z".to_string())
        );
    }

    #[test]
    fn missing_registrar_entity_yields_none() {
        let raw = serde_json::json!({"entities": [], "events": []});
        let parsed: RdapDomainResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.registrar_name(), None);
        assert_eq!(parsed.expiration_date(), None);
    }
}
