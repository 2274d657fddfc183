// Availability Lookup Port (§4.5) — the well-known domain-registry lookup protocol.

use crate::domain::AvailabilityStatus;
use crate::port::generator::ProviderError;
use async_trait::async_trait;

#[derive(Debug, Clone, Default)]
pub struct AvailabilityRecord {
    pub status: AvailabilityStatus,
    pub registrar: Option<String>,
    pub expiration: Option<String>,
}

/// Checks a single domain's registration status. Errors and timeouts must map to `Unknown`,
/// never to `Available` (§4.5).
#[async_trait]
pub trait AvailabilityLookup: Send + Sync {
    async fn check(&self, domain: &str) -> Result<AvailabilityRecord, ProviderError>;
}

pub mod mocks {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    pub struct MockAvailabilityLookup {
        responses: Mutex<HashMap<String, AvailabilityRecord>>,
        default_status: AvailabilityStatus,
    }

    impl MockAvailabilityLookup {
        pub fn new(default_status: AvailabilityStatus) -> Self {
            Self {
                responses: Mutex::new(HashMap::new()),
                default_status,
            }
        }

        pub fn set(&self, domain: &str, record: AvailabilityRecord) {
            self.responses
                .lock()
                .unwrap()
                .insert(domain.to_string(), record);
        }
    }

    #[async_trait]
    impl AvailabilityLookup for MockAvailabilityLookup {
        async fn check(&self, domain: &str) -> Result<AvailabilityRecord, ProviderError> {
            Ok(self
                .responses
                .lock()
                .unwrap()
                .get(domain)
                .cloned()
                .unwrap_or(AvailabilityRecord {
                    status: self.default_status,
                    registrar: None,
                    expiration: None,
                }))
        }
    }
}
