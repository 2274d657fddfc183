// Generator Adapter (C3, §4.3) — turns a raw provider reply into validated candidate domains.

use crate::application::json_scan::first_balanced_json_object;
use crate::port::generator::{Generator, ProviderReply, ToolSpec, Usage};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

const TOOL_NAME: &str = "propose_domains";

fn tool_spec() -> ToolSpec {
    ToolSpec {
        name: TOOL_NAME.to_string(),
        description: "Propose candidate domain names for the business".to_string(),
        parameters_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "domains": {
                    "type": "array",
                    "items": { "type": "string" }
                }
            },
            "required": ["domains"]
        }),
    }
}

static LEADING_LABEL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9]([a-z0-9-]*[a-z0-9])?$").unwrap());

/// Last-resort domain extraction when even the balanced-brace JSON scan finds nothing.
static DOMAIN_SHAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[a-z0-9][a-z0-9-]{0,62}\.[a-z]{2,}").unwrap());

/// Context carried into batch >= 2 so the generator learns from prior misses (§4.2 step 2, §9).
#[derive(Debug, Clone, Default)]
pub struct GenerationContext {
    pub checked_domains: Vec<String>,
    pub available_domains: Vec<String>,
    pub taken_tld_summary: Vec<(String, usize)>,
}

pub struct GeneratorAdapter<'a> {
    generator: &'a dyn Generator,
}

impl<'a> GeneratorAdapter<'a> {
    pub fn new(generator: &'a dyn Generator) -> Self {
        Self { generator }
    }

    /// Request up to `target_count` new candidate domain strings.
    pub async fn propose(
        &self,
        business_name: &str,
        tld_preferences: &[String],
        vibe: &str,
        batch_num: i64,
        max_batches: i64,
        context: Option<&GenerationContext>,
        target_count: usize,
    ) -> (Vec<String>, Usage) {
        let system = system_prompt();
        let prompt = build_prompt(
            business_name,
            tld_preferences,
            vibe,
            batch_num,
            max_batches,
            context,
            target_count,
        );

        let reply = if self.generator.supports_tools() {
            self.generator
                .generate_with_tools(
                    &prompt,
                    &[tool_spec()],
                    &system,
                    crate::application::constants::GENERATOR_MAX_TOKENS,
                    crate::application::constants::GENERATOR_TEMPERATURE,
                )
                .await
        } else {
            self.generator
                .generate(
                    &prompt,
                    &system,
                    crate::application::constants::GENERATOR_MAX_TOKENS,
                    crate::application::constants::GENERATOR_TEMPERATURE,
                )
                .await
        };

        match reply {
            Ok(reply) => {
                let usage = reply.usage;
                let raw = extract_raw_domains(&reply);
                (validate_and_dedupe(&raw), usage)
            }
            // §7 ProviderDegraded: generator returns zero candidates, never propagates.
            Err(_) => (Vec::new(), Usage::default()),
        }
    }
}

fn system_prompt() -> String {
    "You invent short, brandable domain names. Reply only with the requested tool call or JSON."
        .to_string()
}

fn build_prompt(
    business_name: &str,
    tld_preferences: &[String],
    vibe: &str,
    batch_num: i64,
    max_batches: i64,
    context: Option<&GenerationContext>,
    target_count: usize,
) -> String {
    let mut prompt = format!(
        "Business name: {business_name}\nVibe: {vibe}\nPreferred TLDs: {}\nBatch {batch_num} of {max_batches}.\nPropose {target_count} new domain name candidates.",
        tld_preferences.join(", "),
    );

    if let Some(ctx) = context {
        if !ctx.checked_domains.is_empty() {
            prompt.push_str(&format!(
                "\nAlready checked ({} total, showing recent): {}",
                ctx.checked_domains.len(),
                ctx.checked_domains.join(", ")
            ));
        }
        if !ctx.available_domains.is_empty() {
            prompt.push_str(&format!(
                "\nAvailable so far: {}",
                ctx.available_domains.join(", ")
            ));
        }
        if !ctx.taken_tld_summary.is_empty() {
            let summary: Vec<String> = ctx
                .taken_tld_summary
                .iter()
                .map(|(tld, count)| format!("{tld} ({count} taken)"))
                .collect();
            prompt.push_str(&format!("\nMost-taken TLDs so far: {}", summary.join(", ")));
        }
    }

    prompt
}

fn extract_raw_domains(reply: &ProviderReply) -> Vec<String> {
    if let Some(tool_call) = reply.tool_calls.iter().find(|c| c.name == TOOL_NAME) {
        if let Some(domains) = tool_call.arguments.get("domains").and_then(|v| v.as_array()) {
            return domains
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect();
        }
    }

    if let Some(domains) = parse_json_fallback(&reply.content) {
        return domains;
    }

    DOMAIN_SHAPE_RE
        .find_iter(&reply.content)
        .map(|m| m.as_str().to_string())
        .collect()
}

fn parse_json_fallback(content: &str) -> Option<Vec<String>> {
    let slice = first_balanced_json_object(content)?;
    let value: serde_json::Value = serde_json::from_str(slice).ok()?;
    let domains = value.get("domains")?.as_array()?;
    Some(
        domains
            .iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
    )
}

/// Accept iff length >= 4, contains a period, trailing label >= 2 alpha chars, leading label
/// matches the hostname-label grammar with length <= 63 (§4.3).
pub fn is_valid_candidate(domain: &str) -> bool {
    if domain.len() < 4 {
        return false;
    }
    let Some(dot_idx) = domain.rfind('.') else {
        return false;
    };
    let (leading, trailing) = (&domain[..dot_idx], &domain[dot_idx + 1..]);

    if trailing.len() < 2 || !trailing.chars().all(|c| c.is_ascii_alphabetic()) {
        return false;
    }
    if leading.is_empty() || leading.len() > 63 {
        return false;
    }
    LEADING_LABEL_RE.is_match(leading)
}

fn validate_and_dedupe(raw: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for candidate in raw {
        let lower = candidate.trim().to_ascii_lowercase();
        if is_valid_candidate(&lower) && seen.insert(lower.clone()) {
            out.push(lower);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_length_and_tld() {
        assert!(is_valid_candidate("sunrise.com"));
        assert!(!is_valid_candidate("a.co"));
        assert!(!is_valid_candidate("sunrise.c1"));
        assert!(!is_valid_candidate("-sunrise.com"));
        assert!(!is_valid_candidate("sunrise-.com"));
    }

    #[test]
    fn rejects_overlong_label() {
        let long_label = "a".repeat(64);
        assert!(!is_valid_candidate(&format!("{long_label}.com")));
    }

    #[test]
    fn dedupes_case_insensitively() {
        let raw = vec!["Sunrise.com".to_string(), "sunrise.COM".to_string()];
        assert_eq!(validate_and_dedupe(&raw), vec!["sunrise.com".to_string()]);
    }

    #[test]
    fn json_fallback_extracts_first_balanced_object() {
        let content = "Sure, here you go: {\"domains\": [\"sunrise.com\", \"sunrise.io\"]} enjoy!";
        let domains = parse_json_fallback(content).unwrap();
        assert_eq!(domains, vec!["sunrise.com", "sunrise.io"]);
    }

    #[test]
    fn json_fallback_ignores_braces_in_trailing_prose() {
        let content = "{\"domains\": [\"sunrise.com\"]}. Want more like {this}?";
        let domains = parse_json_fallback(content).unwrap();
        assert_eq!(domains, vec!["sunrise.com"]);
    }

    #[test]
    fn regex_extraction_is_last_resort() {
        let reply = ProviderReply {
            content: "How about sunrisebakery.com or sunny.co?".to_string(),
            tool_calls: vec![],
            usage: Usage::default(),
        };
        let raw = extract_raw_domains(&reply);
        assert_eq!(raw, vec!["sunrisebakery.com", "sunny.co"]);
    }
}
