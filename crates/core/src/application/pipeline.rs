// Batch Pipeline (C2, §4.2) — one iteration: generate -> evaluate -> check -> price -> persist.

use crate::application::constants::{
    AVAILABILITY_ADMISSION_SCORE_THRESHOLD, AVAILABILITY_CONCURRENCY,
    AVAILABILITY_SLOT_INTERVAL_MS, CONTEXT_AVAILABLE_LIMIT, CONTEXT_CHECKED_LIMIT,
    CONTEXT_TAKEN_TLD_LIMIT, GENERATION_TARGET_COUNT,
};
use crate::application::evaluator_adapter::EvaluatorAdapter;
use crate::application::generator_adapter::{GenerationContext, GeneratorAdapter};
use crate::domain::{ArtifactType, AvailabilityStatus, DomainResult, Job, SearchArtifact};
use crate::error::Result;
use crate::port::{AvailabilityLookup, Evaluator, Generator, JobStore, PricingLookup, TimeProvider};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Summary of one batch run, used by the controller to decide what happens next (§4.2 step 11).
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    pub candidates_generated: usize,
    pub new_candidates: usize,
    pub checked: usize,
    pub available: usize,
    pub duration_ms: i64,
}

pub struct BatchPipeline {
    job_store: Arc<dyn JobStore>,
    generator: Arc<dyn Generator>,
    evaluator: Arc<dyn Evaluator>,
    availability: Arc<dyn AvailabilityLookup>,
    pricing: Arc<dyn PricingLookup>,
    time_provider: Arc<dyn TimeProvider>,
}

impl BatchPipeline {
    pub fn new(
        job_store: Arc<dyn JobStore>,
        generator: Arc<dyn Generator>,
        evaluator: Arc<dyn Evaluator>,
        availability: Arc<dyn AvailabilityLookup>,
        pricing: Arc<dyn PricingLookup>,
        time_provider: Arc<dyn TimeProvider>,
    ) -> Self {
        Self {
            job_store,
            generator,
            evaluator,
            availability,
            pricing,
            time_provider,
        }
    }

    /// Run one full batch against `job`, mutating its counters and persisting results.
    /// `job.batch_num` is advanced here (§4.2 step 1); the caller (controller) still owns the
    /// status transition once this returns.
    pub async fn run_batch(&self, job: &mut Job, max_batches: i64) -> Result<BatchOutcome> {
        let start_ms = self.time_provider.now_millis();

        // Step 1: advance counter.
        job.batch_num += 1;

        // Step 2: build context.
        let all_results = self.job_store.all_results(&job.id).await?;
        let checked_domains = self.job_store.checked_domains(&job.id).await?;
        let context = self.build_context(&all_results, &checked_domains);

        // Step 3: generate.
        let generator_adapter = GeneratorAdapter::new(self.generator.as_ref());
        let (candidates, gen_usage) = generator_adapter
            .propose(
                &job.quiz_responses.business_name,
                &job.quiz_responses.tld_preferences,
                &job.quiz_responses.vibe,
                job.batch_num,
                max_batches,
                Some(&context),
                GENERATION_TARGET_COUNT,
            )
            .await;
        job.add_tokens(gen_usage.input_tokens, gen_usage.output_tokens);

        // Step 4: deduplicate against prior checked domains.
        let checked_set: std::collections::HashSet<&str> =
            checked_domains.iter().map(String::as_str).collect();
        let new_candidates: Vec<String> = candidates
            .iter()
            .filter(|c| !checked_set.contains(c.as_str()))
            .cloned()
            .collect();

        let mut outcome = BatchOutcome {
            candidates_generated: candidates.len(),
            new_candidates: new_candidates.len(),
            ..Default::default()
        };

        if new_candidates.is_empty() {
            self.write_batch_report(job, &outcome, start_ms).await?;
            return Ok(outcome);
        }

        // Step 5: evaluate.
        let evaluator_adapter = EvaluatorAdapter::new(self.evaluator.as_ref());
        let (evaluations, eval_usage) = evaluator_adapter
            .evaluate_all(
                &new_candidates,
                &job.quiz_responses.business_name,
                &job.quiz_responses.vibe,
            )
            .await;
        job.add_tokens(eval_usage.input_tokens, eval_usage.output_tokens);

        // Step 6: filter by admission threshold; persist discards immediately.
        let mut to_check = Vec::new();
        for candidate in &new_candidates {
            let Some(evaluation) = evaluations.get(candidate) else {
                continue;
            };
            if evaluation.worth_checking && evaluation.score >= AVAILABILITY_ADMISSION_SCORE_THRESHOLD {
                to_check.push(candidate.clone());
            } else {
                let discard = DomainResult {
                    batch_num: job.batch_num,
                    domain: candidate.clone(),
                    tld: DomainResult::tld_from_domain(candidate),
                    status: AvailabilityStatus::Unknown,
                    price_cents: None,
                    score: evaluation.score,
                    flags: {
                        let mut flags = evaluation.flags.clone();
                        flags.push("discarded_before_check".to_string());
                        flags
                    },
                    evaluation_data: evaluation_data_json(evaluation),
                };
                self.job_store.upsert_domain_result(&job.id, &discard).await?;
            }
        }

        // Step 7: check availability, parallelism 5 with a 500ms slot interval (§5).
        let availability_results = self.check_availability_paced(&to_check).await;

        // Step 8: price the available subset.
        let available_domains: Vec<String> = availability_results
            .iter()
            .filter(|(_, record)| record.status == AvailabilityStatus::Available)
            .map(|(domain, _)| domain.clone())
            .collect();
        let prices = if available_domains.is_empty() {
            HashMap::new()
        } else {
            match self.pricing.bulk(&available_domains).await {
                Ok(prices) => prices,
                Err(e) => {
                    warn!(job_id = %job.id, error = %e, "pricing lookup failed, proceeding without prices");
                    HashMap::new()
                }
            }
        };

        // Step 9: persist one DomainResult per checked domain.
        for (domain, record) in &availability_results {
            let evaluation = evaluations.get(domain);
            let price = prices.get(domain);
            let result = DomainResult {
                batch_num: job.batch_num,
                domain: domain.clone(),
                tld: DomainResult::tld_from_domain(domain),
                status: record.status,
                price_cents: price.map(|p| p.price_cents),
                score: evaluation.map(|e| e.score).unwrap_or(0.0),
                flags: evaluation.map(|e| e.flags.clone()).unwrap_or_default(),
                evaluation_data: serde_json::json!({
                    "evaluation": evaluation.map(evaluation_data_json),
                    "registrar": record.registrar,
                    "expiration": record.expiration,
                    "pricing_category": price.map(|p| p.category),
                    "renewal_cents": price.and_then(|p| p.renewal_cents),
                }),
            };
            self.job_store.upsert_domain_result(&job.id, &result).await?;
        }

        outcome.checked = availability_results.len();
        outcome.available = availability_results
            .iter()
            .filter(|(_, r)| r.status == AvailabilityStatus::Available)
            .count();

        // Step 10: report.
        self.write_batch_report(job, &outcome, start_ms).await?;

        info!(
            job_id = %job.id,
            batch_num = job.batch_num,
            generated = outcome.candidates_generated,
            new = outcome.new_candidates,
            checked = outcome.checked,
            available = outcome.available,
            "batch complete"
        );

        Ok(outcome)
    }

    fn build_context(&self, all_results: &[DomainResult], checked: &[String]) -> GenerationContext {
        let available_domains: Vec<String> = all_results
            .iter()
            .filter(|r| r.status == AvailabilityStatus::Available)
            .map(|r| r.domain.clone())
            .take(CONTEXT_AVAILABLE_LIMIT)
            .collect();

        let mut taken_tld_counts: HashMap<String, usize> = HashMap::new();
        for result in all_results.iter().filter(|r| r.status == AvailabilityStatus::Registered) {
            *taken_tld_counts.entry(result.tld.clone()).or_insert(0) += 1;
        }
        let mut taken_tld_summary: Vec<(String, usize)> = taken_tld_counts.into_iter().collect();
        taken_tld_summary.sort_by(|a, b| b.1.cmp(&a.1));
        taken_tld_summary.truncate(CONTEXT_TAKEN_TLD_LIMIT);

        GenerationContext {
            checked_domains: checked.iter().take(CONTEXT_CHECKED_LIMIT).cloned().collect(),
            available_domains,
            taken_tld_summary,
        }
    }

    async fn check_availability_paced(
        &self,
        domains: &[String],
    ) -> Vec<(String, crate::port::AvailabilityRecord)> {
        let mut results = Vec::with_capacity(domains.len());
        for group in domains.chunks(AVAILABILITY_CONCURRENCY) {
            let checks = group.iter().map(|domain| async move {
                let record = self
                    .availability
                    .check(domain)
                    .await
                    .unwrap_or(crate::port::AvailabilityRecord {
                        status: AvailabilityStatus::Unknown,
                        registrar: None,
                        expiration: None,
                    });
                (domain.clone(), record)
            });
            results.extend(futures::future::join_all(checks).await);

            if group.len() == AVAILABILITY_CONCURRENCY {
                tokio::time::sleep(std::time::Duration::from_millis(AVAILABILITY_SLOT_INTERVAL_MS))
                    .await;
            }
        }
        results
    }

    async fn write_batch_report(
        &self,
        job: &Job,
        outcome: &BatchOutcome,
        start_ms: i64,
    ) -> Result<()> {
        let duration_ms = self.time_provider.now_millis() - start_ms;
        let content = serde_json::json!({
            "batch_num": job.batch_num,
            "candidates_generated": outcome.candidates_generated,
            "new_candidates": outcome.new_candidates,
            "checked": outcome.checked,
            "available": outcome.available,
            "duration_ms": duration_ms,
        })
        .to_string();

        self.job_store
            .insert_artifact(
                &job.id,
                &SearchArtifact {
                    batch_num: job.batch_num,
                    artifact_type: ArtifactType::BatchReport,
                    content,
                    created_at: self.time_provider.now_millis(),
                },
            )
            .await
    }
}

fn evaluation_data_json(
    evaluation: &crate::application::evaluator_adapter::EvaluationRecord,
) -> serde_json::Value {
    serde_json::json!({
        "pronounceable": evaluation.pronounceable,
        "memorable": evaluation.memorable,
        "brand_fit": evaluation.brand_fit,
        "email_friendly": evaluation.email_friendly,
        "worth_checking": evaluation.worth_checking,
        "note": evaluation.note,
    })
}
