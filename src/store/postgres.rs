//! # PostgreSQL Store Adapter
//!
//! Durable [`TaskStore`] backed by sqlx/PostgreSQL. Records live in a single
//! `task_records` table with the opaque domain payload stored as JSONB; the
//! adapter creates its schema on connect.
//!
//! Predicates are evaluated in two steps: the scan is narrowed in SQL by the
//! predicate's state filter when one exists, then the full predicate is
//! applied to the fetched rows. Paging is honored in SQL only for predicates
//! that are fully expressible as a state filter; anything else falls back to
//! the non-paging contract (`None` token, complete result set).

use crate::error::{RepositoryError, Result};
use crate::models::{QueryPredicate, TaskRecord, TaskState};
use crate::store::TaskStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::str::FromStr;
use tracing::{debug, info};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS task_records (
    record_id  TEXT PRIMARY KEY,
    state      TEXT NOT NULL,
    created_at TIMESTAMPTZ NOT NULL,
    payload    JSONB NOT NULL
);
CREATE INDEX IF NOT EXISTS idx_task_records_state ON task_records (state);
"#;

const SELECT_COLUMNS: &str = "SELECT record_id, state, created_at, payload FROM task_records";

#[derive(Debug, sqlx::FromRow)]
struct TaskRecordRow {
    record_id: String,
    state: String,
    created_at: DateTime<Utc>,
    payload: serde_json::Value,
}

impl TryFrom<TaskRecordRow> for TaskRecord {
    type Error = RepositoryError;

    fn try_from(row: TaskRecordRow) -> Result<Self> {
        let state = TaskState::from_str(&row.state).map_err(RepositoryError::Storage)?;
        Ok(TaskRecord {
            id: row.record_id,
            state,
            created_at: row.created_at,
            payload: row.payload,
        })
    }
}

/// PostgreSQL-backed task store.
#[derive(Debug, Clone)]
pub struct PostgresTaskStore {
    pool: PgPool,
}

impl PostgresTaskStore {
    /// Connect to the database and ensure the schema exists.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;

        sqlx::raw_sql(SCHEMA).execute(&pool).await?;
        info!(max_connections, "Connected task record store");

        Ok(Self { pool })
    }

    /// Wrap an existing pool; the schema is assumed to exist.
    pub fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Whether the predicate is fully captured by its state filter, making
    /// SQL-level paging sound.
    fn sql_exact(predicate: &QueryPredicate) -> bool {
        matches!(
            predicate,
            QueryPredicate::All | QueryPredicate::StateIn(_)
        )
    }

    fn state_names(predicate: &QueryPredicate) -> Option<Vec<String>> {
        predicate
            .state_filter()
            .map(|states| states.iter().map(ToString::to_string).collect())
    }

    async fn fetch_matching(&self, predicate: &QueryPredicate) -> Result<Vec<TaskRecord>> {
        let rows = match Self::state_names(predicate) {
            Some(states) => {
                let sql = format!(
                    "{SELECT_COLUMNS} WHERE state = ANY($1) ORDER BY created_at ASC, record_id ASC"
                );
                sqlx::query_as::<_, TaskRecordRow>(&sql)
                    .bind(states)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!("{SELECT_COLUMNS} ORDER BY created_at ASC, record_id ASC");
                sqlx::query_as::<_, TaskRecordRow>(&sql)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let record = TaskRecord::try_from(row)?;
            if predicate.matches(&record) {
                records.push(record);
            }
        }
        Ok(records)
    }
}

#[async_trait]
impl TaskStore for PostgresTaskStore {
    async fn create(&self, record: TaskRecord) -> Result<TaskRecord> {
        sqlx::query(
            "INSERT INTO task_records (record_id, state, created_at, payload) VALUES ($1, $2, $3, $4)",
        )
        .bind(&record.id)
        .bind(record.state.to_string())
        .bind(record.created_at)
        .bind(&record.payload)
        .execute(&self.pool)
        .await?;

        debug!(record_id = %record.id, state = %record.state, "Created task record");
        Ok(record)
    }

    async fn create_batch(&self, records: Vec<TaskRecord>) -> Result<Vec<TaskRecord>> {
        let mut tx = self.pool.begin().await?;
        for record in &records {
            sqlx::query(
                "INSERT INTO task_records (record_id, state, created_at, payload) VALUES ($1, $2, $3, $4)",
            )
            .bind(&record.id)
            .bind(record.state.to_string())
            .bind(record.created_at)
            .bind(&record.payload)
            .execute(&mut *tx)
            .await?;
        }
        tx.commit().await?;

        debug!(count = records.len(), "Created task record batch");
        Ok(records)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<TaskRecord>> {
        let sql = format!("{SELECT_COLUMNS} WHERE record_id = $1");
        let row = sqlx::query_as::<_, TaskRecordRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(TaskRecord::try_from).transpose()
    }

    async fn query(&self, predicate: &QueryPredicate) -> Result<Vec<TaskRecord>> {
        self.fetch_matching(predicate).await
    }

    async fn query_page(
        &self,
        predicate: &QueryPredicate,
        page_size: u32,
        continuation_token: Option<&str>,
    ) -> Result<(Option<String>, Vec<TaskRecord>)> {
        if !Self::sql_exact(predicate) {
            // Paging unsupported for this predicate shape.
            let records = self.fetch_matching(predicate).await?;
            return Ok((None, records));
        }

        let offset: i64 = match continuation_token {
            Some(token) => token.parse().map_err(|_| {
                RepositoryError::Validation(format!("Invalid continuation token: {token}"))
            })?,
            None => 0,
        };

        // Fetch one extra row to learn whether another page exists.
        let limit = i64::from(page_size) + 1;
        let rows = match Self::state_names(predicate) {
            Some(states) => {
                let sql = format!(
                    "{SELECT_COLUMNS} WHERE state = ANY($1) ORDER BY created_at ASC, record_id ASC LIMIT $2 OFFSET $3"
                );
                sqlx::query_as::<_, TaskRecordRow>(&sql)
                    .bind(states)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(&self.pool)
                    .await?
            }
            None => {
                let sql = format!(
                    "{SELECT_COLUMNS} ORDER BY created_at ASC, record_id ASC LIMIT $1 OFFSET $2"
                );
                sqlx::query_as::<_, TaskRecordRow>(&sql)
                    .bind(limit)
                    .bind(offset)
                    .fetch_all(&self.pool)
                    .await?
            }
        };

        let has_more = rows.len() as i64 > i64::from(page_size);
        let mut records = Vec::with_capacity(rows.len());
        for row in rows.into_iter().take(page_size as usize) {
            records.push(TaskRecord::try_from(row)?);
        }

        let next_token = has_more.then(|| (offset + i64::from(page_size)).to_string());
        Ok((next_token, records))
    }

    async fn update(&self, record: TaskRecord) -> Result<TaskRecord> {
        let result = sqlx::query(
            "UPDATE task_records SET state = $2, payload = $3 WHERE record_id = $1",
        )
        .bind(&record.id)
        .bind(record.state.to_string())
        .bind(&record.payload)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found(&record.id));
        }

        debug!(record_id = %record.id, state = %record.state, "Updated task record");
        Ok(record)
    }

    async fn delete(&self, id: &str) -> Result<()> {
        let result = sqlx::query("DELETE FROM task_records WHERE record_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::not_found(id));
        }

        debug!(record_id = %id, "Deleted task record");
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_exact_only_for_state_shaped_predicates() {
        assert!(PostgresTaskStore::sql_exact(&QueryPredicate::All));
        assert!(PostgresTaskStore::sql_exact(&QueryPredicate::StateIn(
            vec![TaskState::Running]
        )));
        assert!(!PostgresTaskStore::sql_exact(&QueryPredicate::And(vec![
            QueryPredicate::StateIn(vec![TaskState::Running]),
            QueryPredicate::CreatedAfter(Utc::now()),
        ])));
    }

    #[test]
    fn test_row_conversion_rejects_unknown_state() {
        let row = TaskRecordRow {
            record_id: "task-1".into(),
            state: "no_such_state".into(),
            created_at: Utc::now(),
            payload: serde_json::json!({}),
        };
        assert!(matches!(
            TaskRecord::try_from(row),
            Err(RepositoryError::Storage(_))
        ));
    }
}
