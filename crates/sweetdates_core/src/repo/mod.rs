//! Repository layer: use-case oriented access to the record store.
//!
//! # Responsibility
//! - Define data access contracts for settings and memories.
//! - Keep SQL details inside the persistence boundary.
//!
//! # Invariants
//! - Every write goes through `RecordStore::run_transaction`.
//! - Memory write paths validate input before touching storage.

pub mod error;
pub mod memory_repo;
pub mod settings_repo;
