// Brandscout Infrastructure - HTTP Provider Adapters
// Implements: Generator/Evaluator (claude, deepseek, kimi, cloudflare), AvailabilityLookup (RDAP),
// PricingLookup (bulk registrar pricing)

mod claude;
mod cloudflare;
mod constants;
mod deepseek;
mod kimi;
mod openai_compatible;
mod pricing;
mod rdap;

pub use claude::ClaudeProvider;
pub use cloudflare::CloudflareProvider;
pub use deepseek::DeepSeekProvider;
pub use kimi::KimiProvider;
pub use openai_compatible::OpenAiCompatibleProvider;
pub use pricing::RegistrarPricingLookup;
pub use rdap::RdapAvailabilityLookup;
