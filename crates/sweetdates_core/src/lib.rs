//! Core persistence and derived-view layer for SweetDates.
//! This crate is the single source of truth for memory/photo/settings invariants.

pub mod app;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;
pub mod view;

pub use app::SweetDates;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::memory::{Memory, MemoryDraft, MemoryId, MemoryValidationError, Photo, PhotoId};
pub use model::setting::{
    Setting, SettingValidationError, Theme, PARTNER_NAME_KEY, THEME_KEY, USER_NAME_KEY,
};
pub use repo::error::{RepoError, RepoResult};
pub use repo::memory_repo::{
    MemoryListQuery, MemoryRepository, MemorySort, ParseMemorySortError, SqliteMemoryRepository,
};
pub use repo::settings_repo::{SettingsRepository, SqliteSettingsRepository};
pub use service::memory_service::MemoryService;
pub use service::settings_service::{CoupleNames, SettingsService};
pub use service::setup_signal::{SetupSignal, SetupSnapshot, SetupSubscriber};
pub use store::{Collection, RecordStore, StoreLocation, StoreTx};
pub use view::{
    DisplayHandle, MemoryCard, MemoryGallery, PhotoViewRegistry, ViewError, ViewResult,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
