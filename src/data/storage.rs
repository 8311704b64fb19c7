use {
    crate::domain::{LogEntry, ObservationKind, RoundRecord, RoundSample},
    async_trait::async_trait,
    sqlx::{
        ConnectOptions, Pool, Row, Sqlite,
        sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous},
    },
    std::{str::FromStr, sync::Mutex, time::Duration},
    thiserror::Error,
};

/// Persistence failures. Non-fatal by contract: the engine logs and keeps
/// its in-memory series authoritative for the tick.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database unreachable: {0}")]
    Unreachable(#[from] sqlx::Error),
    #[error("corrupt row: {0}")]
    Corrupt(String),
}

/// Append-only ledger of observed rounds plus its ordered read paths.
///
/// Append is the only mutation. No updates, no deletes, no compaction.
/// External readers (the dashboard) may poll at any time; WAL mode gives us
/// single-writer/multi-reader without coordination.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    async fn initialize(&self) -> Result<(), StorageError>;

    /// Insert one row, returning its id.
    async fn append(&self, entry: &LogEntry) -> Result<i64, StorageError>;

    /// Multipliers of `result` rows, oldest first. With a limit, the most
    /// recent `limit` rounds (still oldest first). Empty store reads return
    /// an empty vec, never an error.
    async fn load_result_history(&self, limit: Option<u32>) -> Result<Vec<f64>, StorageError>;

    /// Timestamped variant of `load_result_history`, for the hour-of-day
    /// analysis.
    async fn load_result_samples(
        &self,
        limit: Option<u32>,
    ) -> Result<Vec<RoundSample>, StorageError>;

    /// Newest-first rows for display.
    async fn recent_records(&self, limit: u32) -> Result<Vec<RoundRecord>, StorageError>;
}

pub struct SqliteStore {
    pool: Pool<Sqlite>,
}

impl SqliteStore {
    pub async fn new(db_path: &str) -> Result<Self, StorageError> {
        let connection_options = SqliteConnectOptions::from_str(&format!("sqlite://{}", db_path))?
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(10))
            .synchronous(SqliteSynchronous::Normal)
            .log_slow_statements(log::LevelFilter::Warn, Duration::from_secs(10));

        let pool = SqlitePoolOptions::new()
            .max_connections(2) // Low connection count, this is low throughput
            .connect_with(connection_options)
            .await?;

        let store = Self { pool };
        store.initialize().await?;

        Ok(store)
    }
}

fn parse_kind(raw: &str) -> Result<ObservationKind, StorageError> {
    ObservationKind::from_str(raw)
        .map_err(|_| StorageError::Corrupt(format!("unknown row type '{}'", raw)))
}

#[async_trait]
impl HistoryStore for SqliteStore {
    async fn initialize(&self) -> Result<(), StorageError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS jetx_logs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                timestamp INTEGER NOT NULL,
                multiplier REAL NOT NULL,
                type TEXT NOT NULL,
                prediction REAL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn append(&self, entry: &LogEntry) -> Result<i64, StorageError> {
        let result = sqlx::query(
            r#"
            INSERT INTO jetx_logs (timestamp, multiplier, type, prediction)
            VALUES (?, ?, ?, ?)
            "#,
        )
        .bind(entry.timestamp_ms)
        .bind(entry.multiplier)
        .bind(entry.kind.to_string())
        .bind(entry.prediction)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    async fn load_result_history(&self, limit: Option<u32>) -> Result<Vec<f64>, StorageError> {
        let samples = self.load_result_samples(limit).await?;
        Ok(samples.into_iter().map(|s| s.multiplier).collect())
    }

    async fn load_result_samples(
        &self,
        limit: Option<u32>,
    ) -> Result<Vec<RoundSample>, StorageError> {
        // With a limit we want the most recent N, so scan descending and
        // flip the order afterwards.
        let query_str = if limit.is_some() {
            r#"
            SELECT timestamp, multiplier FROM jetx_logs
            WHERE type = 'result'
            ORDER BY timestamp DESC, id DESC
            LIMIT ?
            "#
        } else {
            r#"
            SELECT timestamp, multiplier FROM jetx_logs
            WHERE type = 'result'
            ORDER BY timestamp ASC, id ASC
            "#
        };

        let mut query = sqlx::query(query_str);
        if let Some(n) = limit {
            query = query.bind(n);
        }

        let rows = query.fetch_all(&self.pool).await?;

        let mut samples: Vec<RoundSample> = rows
            .iter()
            .map(|row| RoundSample {
                timestamp_ms: row.get("timestamp"),
                multiplier: row.get("multiplier"),
            })
            .collect();

        if limit.is_some() {
            samples.reverse();
        }

        Ok(samples)
    }

    async fn recent_records(&self, limit: u32) -> Result<Vec<RoundRecord>, StorageError> {
        let rows = sqlx::query(
            r#"
            SELECT id, timestamp, multiplier, type, prediction FROM jetx_logs
            ORDER BY timestamp DESC, id DESC
            LIMIT ?
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in &rows {
            let raw_kind: String = row.get("type");
            records.push(RoundRecord {
                id: row.get("id"),
                timestamp_ms: row.get("timestamp"),
                multiplier: row.get("multiplier"),
                kind: parse_kind(&raw_kind)?,
                prediction: row.get("prediction"),
            });
        }

        Ok(records)
    }
}

/// In-memory store. Test double, and the degraded "no database" mode when
/// SQLite cannot be opened at start-up.
#[derive(Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<RoundRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl HistoryStore for MemoryStore {
    async fn initialize(&self) -> Result<(), StorageError> {
        Ok(())
    }

    async fn append(&self, entry: &LogEntry) -> Result<i64, StorageError> {
        let mut rows = self.rows.lock().unwrap();
        let id = rows.len() as i64 + 1;
        rows.push(RoundRecord {
            id,
            timestamp_ms: entry.timestamp_ms,
            multiplier: entry.multiplier,
            kind: entry.kind,
            prediction: entry.prediction,
        });
        Ok(id)
    }

    async fn load_result_history(&self, limit: Option<u32>) -> Result<Vec<f64>, StorageError> {
        let samples = self.load_result_samples(limit).await?;
        Ok(samples.into_iter().map(|s| s.multiplier).collect())
    }

    async fn load_result_samples(
        &self,
        limit: Option<u32>,
    ) -> Result<Vec<RoundSample>, StorageError> {
        let rows = self.rows.lock().unwrap();
        let mut samples: Vec<RoundSample> = rows
            .iter()
            .filter(|r| r.kind == ObservationKind::Result)
            .map(|r| RoundSample {
                timestamp_ms: r.timestamp_ms,
                multiplier: r.multiplier,
            })
            .collect();

        if let Some(n) = limit {
            let keep_from = samples.len().saturating_sub(n as usize);
            samples.drain(..keep_from);
        }

        Ok(samples)
    }

    async fn recent_records(&self, limit: u32) -> Result<Vec<RoundRecord>, StorageError> {
        let rows = self.rows.lock().unwrap();
        Ok(rows.iter().rev().take(limit as usize).cloned().collect())
    }
}
