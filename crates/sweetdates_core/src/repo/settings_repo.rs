//! Settings repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Key/value reads and upserts over the `settings` collection.
//!
//! # Invariants
//! - At most one row per key; updates keep the row id.
//! - A missing key reads as `None`, never as an error.

use crate::model::setting::Setting;
use crate::repo::error::RepoResult;
use crate::store::{Collection, RecordStore};
use log::debug;
use rusqlite::{params, OptionalExtension};

const UPSERT_SETTING_SQL: &str = "INSERT INTO settings (key, value)
     VALUES (?1, ?2)
     ON CONFLICT(key) DO UPDATE SET value = excluded.value;";

/// Repository interface for application settings.
pub trait SettingsRepository {
    /// Returns the stored value for `key`.
    fn get_setting(&mut self, key: &str) -> RepoResult<Option<String>>;
    /// Inserts or updates one setting.
    fn set_setting(&mut self, key: &str, value: &str) -> RepoResult<()>;
    /// Upserts several settings in one transaction.
    fn set_settings(&mut self, entries: &[(&str, &str)]) -> RepoResult<()>;
    /// Returns every stored setting ordered by key.
    fn list_settings(&mut self) -> RepoResult<Vec<Setting>>;
}

/// SQLite-backed settings repository.
pub struct SqliteSettingsRepository<'store> {
    store: &'store mut RecordStore,
}

impl<'store> SqliteSettingsRepository<'store> {
    pub fn new(store: &'store mut RecordStore) -> Self {
        Self { store }
    }
}

impl SettingsRepository for SqliteSettingsRepository<'_> {
    fn get_setting(&mut self, key: &str) -> RepoResult<Option<String>> {
        let conn = self.store.connection()?;
        let value = conn
            .query_row("SELECT value FROM settings WHERE key = ?1;", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn set_setting(&mut self, key: &str, value: &str) -> RepoResult<()> {
        self.set_settings(&[(key, value)])
    }

    fn set_settings(&mut self, entries: &[(&str, &str)]) -> RepoResult<()> {
        if entries.is_empty() {
            return Ok(());
        }

        self.store.run_transaction(&[Collection::Settings], |tx| {
            let conn = tx.collection(Collection::Settings)?;
            for &(key, value) in entries {
                conn.execute(UPSERT_SETTING_SQL, params![key, value])?;
            }
            Ok(())
        })?;

        for &(key, _) in entries {
            debug!("event=setting_set module=repo status=ok key={key}");
        }
        Ok(())
    }

    fn list_settings(&mut self) -> RepoResult<Vec<Setting>> {
        let conn = self.store.connection()?;
        let mut stmt = conn.prepare("SELECT id, key, value FROM settings ORDER BY key ASC;")?;
        let mut rows = stmt.query([])?;
        let mut settings = Vec::new();
        while let Some(row) = rows.next()? {
            settings.push(Setting {
                id: row.get("id")?,
                key: row.get("key")?,
                value: row.get("value")?,
            });
        }
        Ok(settings)
    }
}
