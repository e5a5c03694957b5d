//! Domain model for memories, their photos and application settings.
//!
//! # Responsibility
//! - Define the records persisted by the record store.
//! - Own field-level validation shared by every write path.
//!
//! # Invariants
//! - A `Memory` is identified by a store-assigned `MemoryId` that never changes.
//! - A `Photo` belongs to exactly one memory through `date_id`.

pub mod memory;
pub mod setting;
