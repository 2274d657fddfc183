// Evaluator Adapter (C4, §4.4) — scores candidates, with a deterministic heuristic fallback
// so the pipeline stays total even when the provider is unavailable.

use crate::application::constants::{
    EVALUATOR_CHUNK_SIZE, EVALUATOR_CONCURRENCY, EVALUATOR_MAX_TOKENS, EVALUATOR_TEMPERATURE,
};
use crate::application::json_scan::first_balanced_json_object;
use crate::port::evaluator::Evaluator;
use crate::port::generator::Usage;
use futures::stream::{self, StreamExt};
use once_cell::sync::Lazy;
use std::collections::HashMap;

/// One evaluator verdict for a single candidate domain.
#[derive(Debug, Clone)]
pub struct EvaluationRecord {
    pub score: f64,
    pub pronounceable: bool,
    pub memorable: bool,
    pub brand_fit: bool,
    pub email_friendly: bool,
    pub worth_checking: bool,
    pub flags: Vec<String>,
    pub note: String,
}

static TLD_WEIGHTS: Lazy<HashMap<&'static str, f64>> = Lazy::new(|| {
    HashMap::from([
        ("com", 1.0),
        ("co", 0.9),
        ("io", 0.85),
        ("dev", 0.8),
        ("app", 0.8),
        ("me", 0.75),
        ("net", 0.7),
        ("org", 0.7),
    ])
});

const DEFAULT_TLD_WEIGHT: f64 = 0.5;

/// Heuristic evaluation formula (§4.4). Used both as the fallback for a malformed/failed
/// provider chunk and to fill any domain a chunk reply silently dropped.
pub fn heuristic_evaluate(domain: &str, business_name: &str) -> EvaluationRecord {
    let (leading, tld) = split_domain(domain);

    let length_score = if leading.len() <= 8 {
        1.0
    } else {
        let decay = (leading.len() - 8) as f64 / 10.0;
        (1.0 - 0.7 * decay.min(1.0)).max(0.3)
    };

    let tld_weight = TLD_WEIGHTS.get(tld.as_str()).copied().unwrap_or(DEFAULT_TLD_WEIGHT);

    let pronounceable = !has_long_consonant_run(&leading);
    let has_digits = leading.chars().any(|c| c.is_ascii_digit());
    let has_hyphens = leading.contains('-');

    let mut score = (length_score + tld_weight) / 2.0;
    if !pronounceable {
        score *= 0.7;
    }
    if has_digits {
        score *= 0.8;
    }
    if has_hyphens {
        score *= 0.85;
    }
    let score = (score * 100.0).round() / 100.0;

    let mut flags = Vec::new();
    if !pronounceable {
        flags.push("hard_to_pronounce".to_string());
    }
    if has_digits {
        flags.push("contains_digits".to_string());
    }
    if has_hyphens {
        flags.push("contains_hyphens".to_string());
    }

    let business_slug: String = business_name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    let brand_fit = !business_slug.is_empty()
        && (leading.to_ascii_lowercase().contains(&business_slug)
            || business_slug.contains(&leading.to_ascii_lowercase()));

    EvaluationRecord {
        score,
        pronounceable,
        memorable: leading.len() <= 12,
        brand_fit,
        email_friendly: !has_digits && !has_hyphens,
        worth_checking: score > 0.4,
        flags,
        note: "heuristic fallback evaluation".to_string(),
    }
}

fn split_domain(domain: &str) -> (String, String) {
    match domain.rfind('.') {
        Some(idx) => (domain[..idx].to_string(), domain[idx + 1..].to_string()),
        None => (domain.to_string(), String::new()),
    }
}

fn has_long_consonant_run(label: &str) -> bool {
    let is_vowel = |c: char| matches!(c.to_ascii_lowercase(), 'a' | 'e' | 'i' | 'o' | 'u');
    let mut run = 0;
    for c in label.chars() {
        if c.is_ascii_alphabetic() && !is_vowel(c) {
            run += 1;
            if run >= 4 {
                return true;
            }
        } else {
            run = 0;
        }
    }
    false
}

const TOOL_NAME: &str = "evaluate_domains";

fn tool_spec() -> crate::port::generator::ToolSpec {
    crate::port::generator::ToolSpec {
        name: TOOL_NAME.to_string(),
        description: "Score candidate domain names".to_string(),
        parameters_schema: serde_json::json!({
            "type": "object",
            "properties": {
                "evaluations": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "domain": {"type": "string"},
                            "score": {"type": "number"},
                            "pronounceable": {"type": "boolean"},
                            "memorable": {"type": "boolean"},
                            "brand_fit": {"type": "boolean"},
                            "email_friendly": {"type": "boolean"},
                            "worth_checking": {"type": "boolean"},
                            "flags": {"type": "array", "items": {"type": "string"}},
                            "note": {"type": "string"}
                        },
                        "required": ["domain", "score", "worth_checking"]
                    }
                }
            },
            "required": ["evaluations"]
        }),
    }
}

pub struct EvaluatorAdapter<'a> {
    evaluator: &'a dyn Evaluator,
}

impl<'a> EvaluatorAdapter<'a> {
    pub fn new(evaluator: &'a dyn Evaluator) -> Self {
        Self { evaluator }
    }

    /// Evaluate all candidates, chunked and dispatched with a concurrency ceiling (§4.2 step 5,
    /// §5). Returns one record per input candidate — never fewer, thanks to the heuristic fill.
    pub async fn evaluate_all(
        &self,
        candidates: &[String],
        business_name: &str,
        vibe: &str,
    ) -> (HashMap<String, EvaluationRecord>, Usage) {
        let chunks: Vec<&[String]> = candidates.chunks(EVALUATOR_CHUNK_SIZE).collect();

        let results: Vec<(HashMap<String, EvaluationRecord>, Usage)> = stream::iter(chunks)
            .map(|chunk| self.evaluate_chunk(chunk, business_name, vibe))
            .buffer_unordered(EVALUATOR_CONCURRENCY)
            .collect()
            .await;

        let mut merged = HashMap::new();
        let mut total_usage = Usage::default();
        for (records, usage) in results {
            merged.extend(records);
            total_usage.input_tokens += usage.input_tokens;
            total_usage.output_tokens += usage.output_tokens;
        }
        (merged, total_usage)
    }

    async fn evaluate_chunk(
        &self,
        chunk: &[String],
        business_name: &str,
        vibe: &str,
    ) -> (HashMap<String, EvaluationRecord>, Usage) {
        let system = "You score candidate domain names for brand fit. Reply only with the requested tool call or JSON.".to_string();
        let prompt = format!(
            "Business: {business_name}\nVibe: {vibe}\nDomains to evaluate: {}",
            chunk.join(", ")
        );

        let reply = if self.evaluator.supports_tools() {
            self.evaluator
                .generate_with_tools(&prompt, &[tool_spec()], &system, EVALUATOR_MAX_TOKENS, EVALUATOR_TEMPERATURE)
                .await
        } else {
            self.evaluator
                .generate(&prompt, &system, EVALUATOR_MAX_TOKENS, EVALUATOR_TEMPERATURE)
                .await
        };

        let mut records = HashMap::new();
        let mut usage = Usage::default();

        if let Ok(reply) = reply {
            usage = reply.usage;
            if let Some(parsed) = parse_chunk_reply(&reply) {
                records = parsed;
            }
        }

        // Fill any domain missing from the reply (including a totally failed call) with the
        // heuristic evaluation (§4.4 "Missing records ... are filled with the heuristic
        // evaluation rather than dropped").
        for domain in chunk {
            records
                .entry(domain.clone())
                .or_insert_with(|| heuristic_evaluate(domain, business_name));
        }

        (records, usage)
    }
}

fn parse_chunk_reply(
    reply: &crate::port::generator::ProviderReply,
) -> Option<HashMap<String, EvaluationRecord>> {
    let value = if let Some(call) = reply.tool_calls.iter().find(|c| c.name == TOOL_NAME) {
        call.arguments.clone()
    } else {
        let slice = first_balanced_json_object(&reply.content)?;
        serde_json::from_str(slice).ok()?
    };

    let evaluations = value.get("evaluations")?.as_array()?;
    let mut out = HashMap::new();
    for entry in evaluations {
        let domain = entry.get("domain")?.as_str()?.to_ascii_lowercase();
        let score = entry.get("score").and_then(|v| v.as_f64()).unwrap_or(0.0);
        let worth_checking = entry
            .get("worth_checking")
            .and_then(|v| v.as_bool())
            .unwrap_or(score > 0.4);
        out.insert(
            domain,
            EvaluationRecord {
                score,
                pronounceable: entry.get("pronounceable").and_then(|v| v.as_bool()).unwrap_or(true),
                memorable: entry.get("memorable").and_then(|v| v.as_bool()).unwrap_or(true),
                brand_fit: entry.get("brand_fit").and_then(|v| v.as_bool()).unwrap_or(true),
                email_friendly: entry.get("email_friendly").and_then(|v| v.as_bool()).unwrap_or(true),
                worth_checking,
                flags: entry
                    .get("flags")
                    .and_then(|v| v.as_array())
                    .map(|arr| arr.iter().filter_map(|f| f.as_str().map(str::to_string)).collect())
                    .unwrap_or_default(),
                note: entry.get("note").and_then(|v| v.as_str()).unwrap_or("").to_string(),
            },
        );
    }
    Some(out)
}
