//! CLI command implementations.

pub mod conflicts;
pub mod status;
pub mod telemetry;

use campsync_store::FileBackend;
use std::path::Path;
use std::sync::Arc;

/// Opens the file-backed store every command reads from.
pub fn open_backend(path: &Path) -> Result<Arc<FileBackend>, Box<dyn std::error::Error>> {
    Ok(Arc::new(FileBackend::open(path)?))
}
