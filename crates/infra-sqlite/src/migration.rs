// Migration Runner — one schema for the per-job store, one for the process-wide index.

use sqlx::SqlitePool;
use tracing::info;

/// Apply the per-job store schema (`search_job`, `domain_result`, `search_artifact`).
pub async fn run_job_store_migrations(pool: &SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
    run_migrations_with(
        pool,
        "job_store",
        &[include_str!("../migrations/job_store/001_initial_schema.sql")],
    )
    .await
}

/// Apply the process-wide index schema (`job_index`).
pub async fn run_job_index_migrations(pool: &SqlitePool) -> Result<(), Box<dyn std::error::Error>> {
    run_migrations_with(
        pool,
        "job_index",
        &[include_str!("../migrations/job_index/001_initial_schema.sql")],
    )
    .await
}

async fn run_migrations_with(
    pool: &SqlitePool,
    name: &str,
    statements: &[&str],
) -> Result<(), Box<dyn std::error::Error>> {
    info!(schema = name, "running database migrations");

    let table_exists: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='schema_version'",
    )
    .fetch_one(pool)
    .await?;

    if table_exists == 0 {
        sqlx::query("CREATE TABLE schema_version (version INTEGER NOT NULL)")
            .execute(pool)
            .await?;
        sqlx::query("INSERT INTO schema_version (version) VALUES (0)")
            .execute(pool)
            .await?;
    }

    let current_version: i64 =
        sqlx::query_scalar("SELECT version FROM schema_version ORDER BY version DESC LIMIT 1")
            .fetch_optional(pool)
            .await?
            .unwrap_or(0);

    for (idx, sql) in statements.iter().enumerate() {
        let version = (idx + 1) as i64;
        if version <= current_version {
            continue;
        }
        info!(schema = name, version, "applying migration");
        apply_migration(pool, sql).await?;
        sqlx::query("UPDATE schema_version SET version = ?")
            .bind(version)
            .execute(pool)
            .await?;
    }

    info!(schema = name, "migrations up to date");
    Ok(())
}

async fn apply_migration(pool: &SqlitePool, sql: &str) -> Result<(), Box<dyn std::error::Error>> {
    let mut tx = pool.begin().await?;

    for statement in sql.split(';') {
        let clean_statement: String = statement
            .lines()
            .filter(|line| !line.trim().starts_with("--"))
            .collect::<Vec<_>>()
            .join("\n")
            .trim()
            .to_string();

        if !clean_statement.is_empty() {
            sqlx::query(&clean_statement).execute(&mut *tx).await?;
        }
    }

    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::create_pool;

    #[tokio::test]
    async fn test_run_job_store_migrations() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_job_store_migrations(&pool).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM search_job")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_run_job_index_migrations() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_job_index_migrations(&pool).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM job_index")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_migrations_are_idempotent() {
        let pool = create_pool("sqlite::memory:").await.unwrap();
        run_job_store_migrations(&pool).await.unwrap();
        run_job_store_migrations(&pool).await.unwrap();
    }
}
