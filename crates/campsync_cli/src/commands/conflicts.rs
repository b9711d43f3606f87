//! Conflict triage commands: list, retry, discard.

use campsync_engine::{ConflictSurface, QueueKind, QueueStore, TelemetryLog};
use campsync_store::StoreBackend;
use serde::Serialize;
use std::path::Path;
use std::sync::Arc;
use uuid::Uuid;

const TELEMETRY_SOURCE: &str = "cli";

/// One conflicted item as shown to the operator.
#[derive(Debug, Serialize)]
pub struct ConflictRow {
    /// Owning queue key.
    pub queue: &'static str,
    /// Human label of the owning queue.
    pub label: &'static str,
    /// Item id, used to retry or discard.
    pub id: Uuid,
    /// Why the server rejected the item, if recorded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// When the item was first queued (epoch ms).
    pub enqueued_at: u64,
}

fn surface(path: &Path) -> Result<ConflictSurface, Box<dyn std::error::Error>> {
    let backend: Arc<dyn StoreBackend> = super::open_backend(path)?;
    let store = QueueStore::new(Arc::clone(&backend));
    let telemetry = TelemetryLog::new(backend);
    Ok(ConflictSurface::new(store, telemetry, TELEMETRY_SOURCE))
}

fn parse_queue(key: &str) -> Result<QueueKind, Box<dyn std::error::Error>> {
    QueueKind::from_storage_key(key).ok_or_else(|| format!("Unknown queue key: {key}").into())
}

/// Runs the conflicts list command.
pub fn run_list(path: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    let rows: Vec<ConflictRow> = surface(path)?
        .list()
        .into_iter()
        .map(|entry| ConflictRow {
            queue: entry.queue.storage_key(),
            label: entry.label,
            id: entry.item.id,
            reason: entry.item.last_error,
            enqueued_at: entry.item.enqueued_at,
        })
        .collect();

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        _ => {
            if rows.is_empty() {
                println!("No conflicts.");
                return Ok(());
            }
            println!("{} conflicted item(s):", rows.len());
            println!();
            for row in &rows {
                println!("  [{}] {}", row.queue, row.id);
                if let Some(reason) = &row.reason {
                    println!("      reason: {reason}");
                }
            }
        }
    }

    Ok(())
}

/// Runs the conflicts retry command.
pub fn run_retry(path: &Path, queue: &str, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let kind = parse_queue(queue)?;
    let id = Uuid::parse_str(id)?;
    surface(path)?.retry(kind, id)?;
    println!("Item {id} will be retried on the next flush.");
    Ok(())
}

/// Runs the conflicts discard command.
pub fn run_discard(path: &Path, queue: &str, id: &str) -> Result<(), Box<dyn std::error::Error>> {
    let kind = parse_queue(queue)?;
    let id = Uuid::parse_str(id)?;
    surface(path)?.discard(kind, id)?;
    println!("Item {id} discarded.");
    Ok(())
}
