//! Telemetry commands: show and clear the bounded sync log.

use campsync_engine::{EventStatus, EventType, TelemetryEvent, TelemetryLog};
use std::path::Path;

/// Runs the telemetry show command.
pub fn run_show(
    path: &Path,
    limit: Option<usize>,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let log = TelemetryLog::new(super::open_backend(path)?);

    let mut events = log.read_all();
    if let Some(limit) = limit {
        events.truncate(limit);
    }

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&events)?);
        }
        _ => {
            if events.is_empty() {
                println!("No telemetry recorded.");
                return Ok(());
            }
            println!("{} event(s), newest first:", events.len());
            println!();
            for event in &events {
                print_event(event);
            }
        }
    }

    Ok(())
}

/// Runs the telemetry clear command.
pub fn run_clear(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let log = TelemetryLog::new(super::open_backend(path)?);
    log.clear();
    println!("Telemetry log cleared.");
    Ok(())
}

fn print_event(event: &TelemetryEvent) {
    println!(
        "  {} [{}/{}] {} - {}",
        event.created_at,
        type_label(event.event_type),
        status_label(event.status),
        event.source,
        event.message
    );
    if let Some(meta) = &event.meta {
        println!("      {meta}");
    }
}

fn type_label(event_type: EventType) -> &'static str {
    match event_type {
        EventType::Queue => "queue",
        EventType::Cache => "cache",
        EventType::Sync => "sync",
        EventType::Error => "error",
        EventType::Conflict => "conflict",
    }
}

fn status_label(status: EventStatus) -> &'static str {
    match status {
        EventStatus::Success => "success",
        EventStatus::Pending => "pending",
        EventStatus::Failed => "failed",
        EventStatus::Info => "info",
        EventStatus::Conflict => "conflict",
    }
}
