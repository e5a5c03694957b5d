//! Derived views over stored photos.
//!
//! # Responsibility
//! - Turn stored photo blobs into process-local display handles.
//! - Build the dashboard card list and the single-memory gallery.
//!
//! # Invariants
//! - Every handle is released exactly once: explicitly or on drop.
//! - Live handles never exceed the registry capacity limit.
//! - Handles never write to the record store.

pub mod handle;
pub mod listing;

pub use handle::{DisplayHandle, PhotoViewRegistry, ViewError, ViewResult};
pub use listing::{build_cards, open_gallery, MemoryCard, MemoryGallery};
