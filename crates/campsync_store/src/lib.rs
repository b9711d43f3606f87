//! # Campsync Store
//!
//! Durable slot store trait and implementations for Campsync.
//!
//! This crate provides the lowest-level persistence abstraction for the
//! offline action queue. Backends are **opaque slot stores**: each named
//! slot holds one serialized value that is replaced wholesale on write.
//! Backends do not interpret slot contents - queue and telemetry encoding
//! is owned by `campsync_engine`.
//!
//! ## Design Principles
//!
//! - Slots are addressed by stable string keys
//! - `write` replaces the whole slot atomically
//! - Must be `Send + Sync` so engine components can share a backend
//! - No locking across slots; callers keep load-mutate-save sequential
//!
//! ## Available Backends
//!
//! - [`InMemoryBackend`] - For testing and ephemeral state
//! - [`FileBackend`] - One file per slot under a root directory
//!
//! ## Example
//!
//! ```rust
//! use campsync_store::{InMemoryBackend, StoreBackend};
//!
//! let backend = InMemoryBackend::new();
//! backend.write("pos-orders", b"[]").unwrap();
//! assert_eq!(backend.read("pos-orders").unwrap(), Some(b"[]".to_vec()));
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod backend;
mod error;
mod file;
mod memory;

pub use backend::StoreBackend;
pub use error::{StoreError, StoreResult};
pub use file::FileBackend;
pub use memory::InMemoryBackend;
