// SQLite JobIndex Implementation — the process-wide registry.

use async_trait::async_trait;
use brandscout_core::domain::JobStatus;
use brandscout_core::error::{AppError, Result};
use brandscout_core::port::{JobIndex, JobIndexRow};
use sqlx::SqlitePool;

fn map_sqlx_error(err: sqlx::Error) -> AppError {
    AppError::Database(err.to_string())
}

pub struct SqliteJobIndex {
    pool: SqlitePool,
}

impl SqliteJobIndex {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl JobIndex for SqliteJobIndex {
    async fn upsert(&self, row: &JobIndexRow) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO job_index (
                job_id, client_id, status, business_name, batch_num,
                domains_checked, good_results, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(job_id) DO UPDATE SET
                status = excluded.status,
                batch_num = excluded.batch_num,
                domains_checked = excluded.domains_checked,
                good_results = excluded.good_results,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&row.job_id)
        .bind(&row.client_id)
        .bind(row.status.to_string())
        .bind(&row.business_name)
        .bind(row.batch_num)
        .bind(row.domains_checked)
        .bind(row.good_results)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(())
    }

    async fn find(&self, job_id: &String) -> Result<Option<JobIndexRow>> {
        let row = sqlx::query_as::<_, JobIndexSqlRow>("SELECT * FROM job_index WHERE job_id = ?")
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        row.map(JobIndexSqlRow::into_row).transpose()
    }

    async fn list(
        &self,
        limit: i64,
        offset: i64,
        status: Option<JobStatus>,
    ) -> Result<Vec<JobIndexRow>> {
        let rows: Vec<JobIndexSqlRow> = match status {
            Some(status) => sqlx::query_as(
                r#"
                SELECT * FROM job_index
                WHERE status = ?
                ORDER BY created_at DESC
                LIMIT ? OFFSET ?
                "#,
            )
            .bind(status.to_string())
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?,
            None => sqlx::query_as(
                r#"
                SELECT * FROM job_index
                ORDER BY created_at DESC
                LIMIT ? OFFSET ?
                "#,
            )
            .bind(limit)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?,
        };

        rows.into_iter().map(JobIndexSqlRow::into_row).collect()
    }

    async fn recent(&self, limit: i64) -> Result<Vec<JobIndexRow>> {
        let rows: Vec<JobIndexSqlRow> = sqlx::query_as(
            "SELECT * FROM job_index ORDER BY created_at DESC LIMIT ?",
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter().map(JobIndexSqlRow::into_row).collect()
    }
}

#[derive(Debug, sqlx::FromRow)]
struct JobIndexSqlRow {
    job_id: String,
    client_id: String,
    status: String,
    business_name: String,
    batch_num: i64,
    domains_checked: i64,
    good_results: i64,
    created_at: i64,
    updated_at: i64,
}

impl JobIndexSqlRow {
    fn into_row(self) -> Result<JobIndexRow> {
        let status = match self.status.as_str() {
            "PENDING" => JobStatus::Pending,
            "RUNNING" => JobStatus::Running,
            "COMPLETE" => JobStatus::Complete,
            "NEEDS_FOLLOWUP" => JobStatus::NeedsFollowup,
            "FAILED" => JobStatus::Failed,
            "CANCELLED" => JobStatus::Cancelled,
            other => {
                return Err(AppError::Internal(format!(
                    "unknown job status in index: {other}"
                )))
            }
        };
        Ok(JobIndexRow {
            job_id: self.job_id,
            client_id: self.client_id,
            status,
            business_name: self.business_name,
            batch_num: self.batch_num,
            domains_checked: self.domains_checked,
            good_results: self.good_results,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{create_pool, run_job_index_migrations};

    fn row(job_id: &str, status: JobStatus, created_at: i64) -> JobIndexRow {
        JobIndexRow {
            job_id: job_id.to_string(),
            client_id: "client-1".to_string(),
            status,
            business_name: "Sunrise Bakery".to_string(),
            batch_num: 0,
            domains_checked: 0,
            good_results: 0,
            created_at,
            updated_at: created_at,
        }
    }

    async fn setup() -> SqliteJobIndex {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_job_index_migrations(&pool).await.unwrap();
        SqliteJobIndex::new(pool)
    }

    #[tokio::test]
    async fn upsert_then_find_round_trips() {
        let index = setup().await;
        let row = row("job-1", JobStatus::Running, 1000);
        index.upsert(&row).await.unwrap();

        let found = index.find("job-1").await.unwrap().unwrap();
        assert_eq!(found.status, JobStatus::Running);
    }

    #[tokio::test]
    async fn upsert_replaces_existing_row() {
        let index = setup().await;
        index.upsert(&row("job-1", JobStatus::Running, 1000)).await.unwrap();
        index
            .upsert(&JobIndexRow {
                status: JobStatus::Complete,
                good_results: 12,
                ..row("job-1", JobStatus::Running, 1000)
            })
            .await
            .unwrap();

        let found = index.find("job-1").await.unwrap().unwrap();
        assert_eq!(found.status, JobStatus::Complete);
        assert_eq!(found.good_results, 12);
    }

    #[tokio::test]
    async fn recent_orders_newest_first() {
        let index = setup().await;
        index.upsert(&row("job-1", JobStatus::Running, 1000)).await.unwrap();
        index.upsert(&row("job-2", JobStatus::Running, 2000)).await.unwrap();

        let recent = index.recent(10).await.unwrap();
        assert_eq!(recent[0].job_id, "job-2");
        assert_eq!(recent[1].job_id, "job-1");
    }

    #[tokio::test]
    async fn list_filters_by_status() {
        let index = setup().await;
        index.upsert(&row("job-1", JobStatus::Running, 1000)).await.unwrap();
        index.upsert(&row("job-2", JobStatus::Complete, 2000)).await.unwrap();

        let completed = index.list(10, 0, Some(JobStatus::Complete)).await.unwrap();
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].job_id, "job-2");
    }
}
