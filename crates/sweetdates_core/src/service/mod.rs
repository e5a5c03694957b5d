//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep presentation callers decoupled from storage details.

pub mod memory_service;
pub mod settings_service;
pub mod setup_signal;
