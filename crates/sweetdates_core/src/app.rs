//! Top-level application state.
//!
//! # Responsibility
//! - Own the record store, the setup signal and the display-handle registry.
//! - Hand out services bound to the store; nothing else reaches storage.
//!
//! # Invariants
//! - The setup signal reflects storage after `open` and every facade write.
//! - `clear_all_data` leaves an empty, usable store and setup=false.

use crate::model::memory::MemoryId;
use crate::repo::error::RepoResult;
use crate::repo::memory_repo::{MemoryListQuery, SqliteMemoryRepository};
use crate::repo::settings_repo::SqliteSettingsRepository;
use crate::service::memory_service::MemoryService;
use crate::service::settings_service::SettingsService;
use crate::service::setup_signal::SetupSignal;
use crate::store::{RecordStore, StoreLocation};
use crate::view::{MemoryCard, MemoryGallery, PhotoViewRegistry, ViewResult};
use log::info;

/// Application state shared by every view.
pub struct SweetDates {
    store: RecordStore,
    setup: SetupSignal,
    views: PhotoViewRegistry,
}

impl SweetDates {
    /// Opens the store at `location` and loads the initial setup state.
    pub fn open(location: StoreLocation) -> RepoResult<Self> {
        Self::with_registry(location, PhotoViewRegistry::new())
    }

    /// Like [`Self::open`] with a caller-configured handle registry.
    pub fn with_registry(location: StoreLocation, views: PhotoViewRegistry) -> RepoResult<Self> {
        let mut app = Self {
            store: RecordStore::open_at(location)?,
            setup: SetupSignal::new(),
            views,
        };
        let snapshot = app.settings().refresh_setup()?;
        info!(
            "event=app_open module=app status=ok setup_complete={}",
            snapshot.complete
        );
        Ok(app)
    }

    pub fn setup_signal(&self) -> &SetupSignal {
        &self.setup
    }

    pub fn views(&self) -> &PhotoViewRegistry {
        &self.views
    }

    pub fn settings(&mut self) -> SettingsService<SqliteSettingsRepository<'_>> {
        SettingsService::new(
            SqliteSettingsRepository::new(&mut self.store),
            self.setup.clone(),
        )
    }

    pub fn memories(&mut self) -> MemoryService<SqliteMemoryRepository<'_>> {
        MemoryService::new(SqliteMemoryRepository::new(&mut self.store))
    }

    /// Dashboard cards; thumbnails are registered in [`Self::views`].
    pub fn dashboard(&mut self, query: &MemoryListQuery) -> ViewResult<Vec<MemoryCard>> {
        MemoryService::new(SqliteMemoryRepository::new(&mut self.store)).cards(&self.views, query)
    }

    /// Gallery for one memory; `NotFound` when it was deleted.
    pub fn gallery(&mut self, id: MemoryId) -> ViewResult<MemoryGallery> {
        MemoryService::new(SqliteMemoryRepository::new(&mut self.store)).gallery(&self.views, id)
    }

    /// Erases every memory, photo and setting.
    ///
    /// Outstanding display handles stay valid until released; they hold
    /// copies of the bytes, not store rows.
    pub fn clear_all_data(&mut self) -> RepoResult<()> {
        self.store.reset()?;
        self.settings().refresh_setup()?;
        info!("event=clear_all_data module=app status=ok");
        Ok(())
    }

    /// Applied schema version, for diagnostics.
    pub fn schema_version(&mut self) -> RepoResult<u32> {
        self.store.schema_version()
    }
}
