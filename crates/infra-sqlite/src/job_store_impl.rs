// SQLite JobStore Implementation — the per-job private store.

use async_trait::async_trait;
use brandscout_core::domain::{
    ArtifactType, AvailabilityStatus, DomainResult, FollowupResponses, Job, JobId, JobStatus,
    ProviderKind, QuizResponses, SearchArtifact,
};
use brandscout_core::error::{AppError, Result};
use brandscout_core::port::JobStore;
use sqlx::SqlitePool;
use std::str::FromStr;

fn map_sqlx_error(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db_err) => {
            if let Some(code) = db_err.code() {
                match code.as_ref() {
                    "2067" | "1555" => AppError::Conflict(format!(
                        "unique constraint violation: {}",
                        db_err.message()
                    )),
                    "5" => AppError::Database(format!(
                        "database locked (SQLITE_BUSY): {}",
                        db_err.message()
                    )),
                    other => AppError::Database(format!(
                        "database error [{}]: {}",
                        other,
                        db_err.message()
                    )),
                }
            } else {
                AppError::Database(format!("database error: {}", db_err.message()))
            }
        }
        sqlx::Error::RowNotFound => AppError::NotFound("row not found".to_string()),
        _ => AppError::Database(err.to_string()),
    }
}

pub struct SqliteJobStore {
    pool: SqlitePool,
}

impl SqliteJobStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobStore for SqliteJobStore {
    async fn insert_job(&self, job: &Job) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO search_job (
                id, client_id, status, batch_num,
                business_name, tld_preferences, vibe, domain_idea, keywords, client_email,
                followup_direction, followup_length, followup_keywords,
                driver_provider, swarm_provider,
                total_input_tokens, total_output_tokens,
                created_at, updated_at, error, wake_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&job.id)
        .bind(&job.client_id)
        .bind(job.status.to_string())
        .bind(job.batch_num)
        .bind(&job.quiz_responses.business_name)
        .bind(serde_json::to_string(&job.quiz_responses.tld_preferences).unwrap_or_default())
        .bind(&job.quiz_responses.vibe)
        .bind(&job.quiz_responses.domain_idea)
        .bind(&job.quiz_responses.keywords)
        .bind(&job.quiz_responses.client_email)
        .bind(job.followup_responses.as_ref().map(|f| f.direction.clone()))
        .bind(job.followup_responses.as_ref().map(|f| f.length.clone()))
        .bind(job.followup_responses.as_ref().map(|f| f.keywords.clone()))
        .bind(job.driver_provider.map(|p| p.to_string()))
        .bind(job.swarm_provider.map(|p| p.to_string()))
        .bind(job.total_input_tokens)
        .bind(job.total_output_tokens)
        .bind(job.created_at)
        .bind(job.updated_at)
        .bind(&job.error)
        .bind(job.wake_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find_job(&self, id: &JobId) -> Result<Option<Job>> {
        let row = sqlx::query_as::<_, JobRow>("SELECT * FROM search_job WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(JobRow::into_job).transpose()
    }

    async fn update_job(&self, job: &Job) -> Result<()> {
        sqlx::query(
            r#"
            UPDATE search_job
            SET status = ?, batch_num = ?,
                followup_direction = ?, followup_length = ?, followup_keywords = ?,
                driver_provider = ?, swarm_provider = ?,
                total_input_tokens = ?, total_output_tokens = ?,
                updated_at = ?, error = ?, wake_at = ?
            WHERE id = ?
            "#,
        )
        .bind(job.status.to_string())
        .bind(job.batch_num)
        .bind(job.followup_responses.as_ref().map(|f| f.direction.clone()))
        .bind(job.followup_responses.as_ref().map(|f| f.length.clone()))
        .bind(job.followup_responses.as_ref().map(|f| f.keywords.clone()))
        .bind(job.driver_provider.map(|p| p.to_string()))
        .bind(job.swarm_provider.map(|p| p.to_string()))
        .bind(job.total_input_tokens)
        .bind(job.total_output_tokens)
        .bind(job.updated_at)
        .bind(&job.error)
        .bind(job.wake_at)
        .bind(&job.id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn upsert_domain_result(&self, _job_id: &JobId, result: &DomainResult) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO domain_result (domain, batch_num, tld, status, price_cents, score, flags, evaluation_data)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(domain) DO UPDATE SET
                batch_num = excluded.batch_num,
                tld = excluded.tld,
                status = excluded.status,
                price_cents = excluded.price_cents,
                score = excluded.score,
                flags = excluded.flags,
                evaluation_data = excluded.evaluation_data
            "#,
        )
        .bind(&result.domain)
        .bind(result.batch_num)
        .bind(&result.tld)
        .bind(result.status.to_string())
        .bind(result.price_cents)
        .bind(result.score)
        .bind(serde_json::to_string(&result.flags).unwrap_or_default())
        .bind(result.evaluation_data.to_string())
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn checked_domains(&self, _job_id: &JobId) -> Result<Vec<String>> {
        let domains: Vec<String> = sqlx::query_scalar("SELECT domain FROM domain_result")
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(domains)
    }

    async fn available_results(&self, _job_id: &JobId, limit: i64) -> Result<Vec<DomainResult>> {
        let rows: Vec<DomainResultRow> = sqlx::query_as(
            r#"
            SELECT * FROM domain_result
            WHERE status = ?
            ORDER BY score DESC, price_cents ASC NULLS LAST
            LIMIT ?
            "#,
        )
        .bind(AvailabilityStatus::Available.to_string())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(DomainResultRow::into_result).collect()
    }

    async fn all_results(&self, _job_id: &JobId) -> Result<Vec<DomainResult>> {
        let rows: Vec<DomainResultRow> =
            sqlx::query_as("SELECT * FROM domain_result ORDER BY batch_num ASC")
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx_error)?;

        rows.into_iter().map(DomainResultRow::into_result).collect()
    }

    async fn insert_artifact(&self, _job_id: &JobId, artifact: &SearchArtifact) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO search_artifact (batch_num, artifact_type, content, created_at)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(artifact.batch_num)
        .bind(artifact.artifact_type.to_string())
        .bind(&artifact.content)
        .bind(artifact.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn latest_artifact(
        &self,
        _job_id: &JobId,
        artifact_type: ArtifactType,
    ) -> Result<Option<SearchArtifact>> {
        let row = sqlx::query_as::<_, ArtifactRow>(
            r#"
            SELECT * FROM search_artifact
            WHERE artifact_type = ?
            ORDER BY created_at DESC, artifact_id DESC
            LIMIT 1
            "#,
        )
        .bind(artifact_type.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        row.map(ArtifactRow::into_artifact).transpose()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct JobRow {
    id: String,
    client_id: String,
    status: String,
    batch_num: i64,
    business_name: String,
    tld_preferences: String,
    vibe: String,
    domain_idea: Option<String>,
    keywords: Option<String>,
    client_email: Option<String>,
    followup_direction: Option<String>,
    followup_length: Option<String>,
    followup_keywords: Option<String>,
    driver_provider: Option<String>,
    swarm_provider: Option<String>,
    total_input_tokens: i64,
    total_output_tokens: i64,
    created_at: i64,
    updated_at: i64,
    error: Option<String>,
    wake_at: Option<i64>,
}

impl JobRow {
    fn into_job(self) -> Result<Job> {
        let status = match self.status.as_str() {
            "PENDING" => JobStatus::Pending,
            "RUNNING" => JobStatus::Running,
            "COMPLETE" => JobStatus::Complete,
            "NEEDS_FOLLOWUP" => JobStatus::NeedsFollowup,
            "FAILED" => JobStatus::Failed,
            "CANCELLED" => JobStatus::Cancelled,
            other => {
                return Err(AppError::Internal(format!("unknown job status in store: {other}")))
            }
        };

        let tld_preferences: Vec<String> =
            serde_json::from_str(&self.tld_preferences).unwrap_or_default();

        let followup_responses = match (
            self.followup_direction,
            self.followup_length,
            self.followup_keywords,
        ) {
            (Some(direction), Some(length), Some(keywords)) => Some(FollowupResponses {
                direction,
                length,
                keywords,
            }),
            _ => None,
        };

        let driver_provider = self
            .driver_provider
            .as_deref()
            .map(ProviderKind::from_str)
            .transpose()
            .map_err(|e| AppError::Internal(e.to_string()))?;
        let swarm_provider = self
            .swarm_provider
            .as_deref()
            .map(ProviderKind::from_str)
            .transpose()
            .map_err(|e| AppError::Internal(e.to_string()))?;

        Ok(Job {
            id: self.id,
            client_id: self.client_id,
            status,
            batch_num: self.batch_num,
            quiz_responses: QuizResponses {
                business_name: self.business_name,
                tld_preferences,
                vibe: self.vibe,
                domain_idea: self.domain_idea,
                keywords: self.keywords,
                client_email: self.client_email,
            },
            followup_responses,
            driver_provider,
            swarm_provider,
            total_input_tokens: self.total_input_tokens,
            total_output_tokens: self.total_output_tokens,
            created_at: self.created_at,
            updated_at: self.updated_at,
            error: self.error,
            wake_at: self.wake_at,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct DomainResultRow {
    domain: String,
    batch_num: i64,
    tld: String,
    status: String,
    price_cents: Option<i64>,
    score: f64,
    flags: String,
    evaluation_data: String,
}

impl DomainResultRow {
    fn into_result(self) -> Result<DomainResult> {
        let status = AvailabilityStatus::from_str(&self.status)
            .map_err(|e| AppError::Internal(e.to_string()))?;
        let flags: Vec<String> = serde_json::from_str(&self.flags).unwrap_or_default();
        let evaluation_data: serde_json::Value =
            serde_json::from_str(&self.evaluation_data).unwrap_or(serde_json::json!({}));

        Ok(DomainResult {
            batch_num: self.batch_num,
            domain: self.domain,
            tld: self.tld,
            status,
            price_cents: self.price_cents,
            score: self.score,
            flags,
            evaluation_data,
        })
    }
}

#[derive(Debug, sqlx::FromRow)]
struct ArtifactRow {
    batch_num: i64,
    artifact_type: String,
    content: String,
    created_at: i64,
}

impl ArtifactRow {
    fn into_artifact(self) -> Result<SearchArtifact> {
        let artifact_type = ArtifactType::from_str(&self.artifact_type)
            .map_err(|e| AppError::Internal(e.to_string()))?;
        Ok(SearchArtifact {
            batch_num: self.batch_num,
            artifact_type,
            content: self.content,
            created_at: self.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_pool, run_job_store_migrations};

    fn quiz() -> QuizResponses {
        QuizResponses {
            business_name: "Sunrise Bakery".to_string(),
            tld_preferences: vec!["com".to_string(), "co".to_string()],
            vibe: "creative".to_string(),
            domain_idea: None,
            keywords: None,
            client_email: None,
        }
    }

    async fn setup() -> SqliteJobStore {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_job_store_migrations(&pool).await.unwrap();
        SqliteJobStore::new(pool)
    }

    #[tokio::test]
    async fn insert_then_find_round_trips() {
        let store = setup().await;
        let job = Job::new("job-1", "client-1", 1000, quiz(), None, None);
        store.insert_job(&job).await.unwrap();

        let found = store.find_job(&job.id).await.unwrap().unwrap();
        assert_eq!(found.id, job.id);
        assert_eq!(found.status, JobStatus::Pending);
        assert_eq!(found.quiz_responses.business_name, "Sunrise Bakery");
        assert_eq!(found.quiz_responses.tld_preferences, vec!["com", "co"]);
    }

    #[tokio::test]
    async fn duplicate_insert_conflicts() {
        let store = setup().await;
        let job = Job::new("job-1", "client-1", 1000, quiz(), None, None);
        store.insert_job(&job).await.unwrap();

        let err = store.insert_job(&job).await.unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn upsert_domain_result_is_keyed_by_domain() {
        let store = setup().await;
        let job = Job::new("job-1", "client-1", 1000, quiz(), None, None);
        store.insert_job(&job).await.unwrap();

        let first = DomainResult {
            batch_num: 1,
            domain: "sunrisebakery.com".to_string(),
            tld: "com".to_string(),
            status: AvailabilityStatus::Unknown,
            price_cents: None,
            score: 0.5,
            flags: vec![],
            evaluation_data: serde_json::json!({}),
        };
        store.upsert_domain_result(&job.id, &first).await.unwrap();

        let second = DomainResult {
            status: AvailabilityStatus::Available,
            price_cents: Some(1200),
            score: 0.9,
            batch_num: 2,
            ..first
        };
        store.upsert_domain_result(&job.id, &second).await.unwrap();

        let all = store.all_results(&job.id).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].status, AvailabilityStatus::Available);
        assert_eq!(all[0].score, 0.9);
    }

    #[tokio::test]
    async fn artifacts_round_trip_latest_first() {
        let store = setup().await;
        let job = Job::new("job-1", "client-1", 1000, quiz(), None, None);
        store.insert_job(&job).await.unwrap();

        store
            .insert_artifact(
                &job.id,
                &SearchArtifact {
                    batch_num: 1,
                    artifact_type: ArtifactType::BatchReport,
                    content: "{\"batch\":1}".to_string(),
                    created_at: 1000,
                },
            )
            .await
            .unwrap();
        store
            .insert_artifact(
                &job.id,
                &SearchArtifact {
                    batch_num: 2,
                    artifact_type: ArtifactType::BatchReport,
                    content: "{\"batch\":2}".to_string(),
                    created_at: 2000,
                },
            )
            .await
            .unwrap();

        let latest = store
            .latest_artifact(&job.id, ArtifactType::BatchReport)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(latest.batch_num, 2);
    }
}
