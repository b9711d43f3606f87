//! Status command implementation.

use campsync_engine::QueueStore;
use serde::Serialize;
use std::path::Path;

/// One row of the status report.
#[derive(Debug, Serialize)]
pub struct StatusRow {
    /// Stable queue key.
    pub key: &'static str,
    /// Human label.
    pub label: &'static str,
    /// Number of items currently queued.
    pub count: usize,
    /// Number of items flagged as conflicts.
    pub conflicts: usize,
    /// Earliest pending automatic retry (epoch ms), if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_retry: Option<u64>,
    /// Most recent failure message seen in this queue.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

/// Runs the status command.
pub fn run(path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let backend = super::open_backend(path)?;
    let store = QueueStore::new(backend);

    let rows: Vec<StatusRow> = store
        .health()
        .into_iter()
        .map(|h| StatusRow {
            key: h.key,
            label: h.label,
            count: h.count,
            conflicts: h.conflicts,
            next_retry: h.next_retry,
            last_error: h.last_error,
        })
        .collect();

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        _ => {
            print_text_output(path, &rows);
        }
    }

    Ok(())
}

fn print_text_output(path: &Path, rows: &[StatusRow]) {
    println!("Campsync Queue Status");
    println!("=====================");
    println!();
    println!("Path: {}", path.display());
    println!();
    for row in rows {
        println!(
            "  {:<18} {:>4} queued, {:>2} conflicted",
            row.label, row.count, row.conflicts
        );
        if let Some(at) = row.next_retry {
            println!("  {:<18} next retry at {at} (epoch ms)", "");
        }
        if let Some(err) = &row.last_error {
            println!("  {:<18} last error: {err}", "");
        }
    }
}
