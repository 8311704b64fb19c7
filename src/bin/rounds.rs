//! Read-only dump of the most recent rounds, newest first. This is the same
//! descending-timestamp, row-limited query shape the dashboard polls with.

use anyhow::{Context, Result};
use chrono::DateTime;
use clap::Parser;
use tabled::{Table, Tabled};

use jetx_watcher::data::HistoryStore;
use jetx_watcher::domain::RoundRecord;
use jetx_watcher::SqliteStore;

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect recently recorded rounds")]
struct Args {
    /// SQLite database path
    #[arg(long, default_value = "jetx_logs.sqlite")]
    db: String,

    /// How many rows to show
    #[arg(long, default_value_t = 20)]
    limit: u32,
}

#[derive(Tabled)]
struct Row {
    id: i64,
    time: String,
    multiplier: String,
    #[tabled(rename = "type")]
    kind: String,
    prediction: String,
}

impl From<&RoundRecord> for Row {
    fn from(record: &RoundRecord) -> Self {
        let time = DateTime::from_timestamp_millis(record.timestamp_ms)
            .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
            .unwrap_or_else(|| "?".to_string());

        Self {
            id: record.id,
            time,
            multiplier: format!("{:.2}x", record.multiplier),
            kind: record.kind.to_string(),
            prediction: match record.prediction {
                Some(p) => format!("{:.2}x", p),
                None => "-".to_string(),
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let args = Args::parse();
    let store = SqliteStore::new(&args.db)
        .await
        .with_context(|| format!("opening database '{}'", args.db))?;

    let records = store.recent_records(args.limit).await?;
    if records.is_empty() {
        println!("Waiting for data — no rounds recorded yet.");
        return Ok(());
    }

    let rows: Vec<Row> = records.iter().map(Row::from).collect();
    println!("{}", Table::new(rows));

    Ok(())
}
