//! Record store: the single owner of persisted collections.
//!
//! # Responsibility
//! - Open (and re-open) the SQLite database behind the three collections.
//! - Provide the only write primitive: a scoped, all-or-nothing transaction.
//! - Erase and re-initialize all state on reset.
//!
//! # Invariants
//! - Every mutation runs inside [`RecordStore::run_transaction`].
//! - A transaction body can only reach the collections it declared; SQL
//!   against any other managed table fails to prepare and the transaction
//!   rolls back with `CollectionOutOfScope`.
//! - Storage failures inside a body never leave partial writes behind.

use crate::db::migrations::{apply_migrations, current_user_version, drop_schema};
use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::repo::error::{RepoError, RepoResult};
use log::{debug, error, info, warn};
use rusqlite::hooks::{AuthAction, AuthContext, Authorization};
use rusqlite::{Connection, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

/// Persisted collection names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Settings,
    Memories,
    Photos,
}

impl Collection {
    pub const ALL: [Collection; 3] = [Self::Settings, Self::Memories, Self::Photos];

    /// Backing SQLite table.
    pub fn table_name(self) -> &'static str {
        match self {
            Self::Settings => "settings",
            Self::Memories => "dates",
            Self::Photos => "photos",
        }
    }

    /// Collection stored in `table`, if it is one of ours.
    pub fn from_table_name(table: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|collection| collection.table_name().eq_ignore_ascii_case(table))
    }
}

/// Where the store keeps its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    File(PathBuf),
    /// Process-local database; contents are lost on `close`.
    InMemory,
}

impl StoreLocation {
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self::File(path.as_ref().to_path_buf())
    }
}

/// Transactional owner of the settings, memories and photos collections.
pub struct RecordStore {
    location: StoreLocation,
    conn: Option<Connection>,
}

/// Handle passed to transaction bodies.
///
/// Gives access to the underlying connection only for declared collections.
/// The connection itself is guarded too: while the body runs, statements that
/// read or write an undeclared collection are refused by SQLite.
pub struct StoreTx<'tx> {
    conn: &'tx Connection,
    scope: &'tx [Collection],
}

impl StoreTx<'_> {
    /// Returns the transaction connection for `collection`.
    ///
    /// # Errors
    /// - `CollectionOutOfScope` when `collection` was not declared.
    pub fn collection(&self, collection: Collection) -> RepoResult<&Connection> {
        if self.scope.contains(&collection) {
            Ok(self.conn)
        } else {
            Err(RepoError::CollectionOutOfScope(collection))
        }
    }

    pub fn scope(&self) -> &[Collection] {
        self.scope
    }
}

impl RecordStore {
    /// Creates a closed store; nothing touches disk until [`Self::open`].
    pub fn new(location: StoreLocation) -> Self {
        Self {
            location,
            conn: None,
        }
    }

    /// Creates and opens a store in one step.
    pub fn open_at(location: StoreLocation) -> RepoResult<Self> {
        let mut store = Self::new(location);
        store.open()?;
        Ok(store)
    }

    /// Opens an empty in-memory store.
    pub fn in_memory() -> RepoResult<Self> {
        Self::open_at(StoreLocation::InMemory)
    }

    pub fn location(&self) -> &StoreLocation {
        &self.location
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    /// Ensures the store is ready; a no-op when already open.
    ///
    /// A failed open leaves the store closed, so calling again retries.
    ///
    /// # Errors
    /// - `StoreUnavailable` when the database cannot be opened or migrated.
    pub fn open(&mut self) -> RepoResult<()> {
        if self.conn.is_some() {
            return Ok(());
        }

        let conn = match &self.location {
            StoreLocation::File(path) => open_db(path),
            StoreLocation::InMemory => open_db_in_memory(),
        }
        .map_err(RepoError::StoreUnavailable)?;

        self.conn = Some(conn);
        Ok(())
    }

    /// Drops the connection. File-backed data stays on disk.
    pub fn close(&mut self) {
        if self.conn.take().is_some() {
            info!("event=store_close module=store status=ok");
        }
    }

    /// Connection for repository reads, opening the store on first use.
    pub(crate) fn connection(&mut self) -> RepoResult<&Connection> {
        let conn: &Connection = self.connection_mut()?;
        Ok(conn)
    }

    /// Returns the applied schema version.
    pub fn schema_version(&mut self) -> RepoResult<u32> {
        Ok(current_user_version(self.connection()?)?)
    }

    /// Runs `body` inside one IMMEDIATE transaction over `scope`.
    ///
    /// Commits when `body` returns `Ok`, rolls back otherwise. SQLite errors
    /// raised inside the body surface as `TransactionFailure`; other errors
    /// (validation, not-found) are returned unchanged. Any statement that
    /// touched an undeclared collection forces a rollback with
    /// `CollectionOutOfScope`, even if the body swallowed the error.
    pub fn run_transaction<T, F>(&mut self, scope: &[Collection], body: F) -> RepoResult<T>
    where
        F: FnOnce(&StoreTx<'_>) -> RepoResult<T>,
    {
        if scope.is_empty() {
            return Err(RepoError::InvalidData(
                "transaction scope cannot be empty".to_string(),
            ));
        }

        let started_at = Instant::now();
        let mut declared = Vec::with_capacity(scope.len());
        for collection in scope {
            if !declared.contains(collection) {
                declared.push(*collection);
            }
        }
        let label = scope_label(&declared);

        let conn = self.connection_mut()?;
        let tx = match conn.transaction_with_behavior(TransactionBehavior::Immediate) {
            Ok(tx) => tx,
            Err(err) => {
                warn!("event=tx_begin module=store status=error scope={label} error={err}");
                return Err(RepoError::TransactionFailure {
                    scope: declared,
                    source: err.into(),
                });
            }
        };

        let denied = Arc::new(Mutex::new(None));
        let outcome = {
            let _guard = ScopeGuard::install(&tx, &declared, Arc::clone(&denied));
            body(&StoreTx {
                conn: &tx,
                scope: &declared,
            })
        };
        let denied = *denied.lock().unwrap_or_else(PoisonError::into_inner);
        let outcome = match denied {
            Some(collection) => Err(RepoError::CollectionOutOfScope(collection)),
            None => outcome,
        };
        let scope = declared;

        match outcome {
            Ok(value) => {
                if let Err(err) = tx.commit() {
                    warn!(
                        "event=tx_commit module=store status=error scope={label} duration_ms={} error={err}",
                        started_at.elapsed().as_millis()
                    );
                    return Err(RepoError::TransactionFailure {
                        scope,
                        source: err.into(),
                    });
                }
                debug!(
                    "event=tx_commit module=store status=ok scope={label} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(value)
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback() {
                    error!(
                        "event=tx_rollback module=store status=error scope={label} error={rollback_err}"
                    );
                }
                warn!(
                    "event=tx_rollback module=store status=ok scope={label} duration_ms={} error_code={}",
                    started_at.elapsed().as_millis(),
                    error_code(&err)
                );
                Err(match err {
                    RepoError::Db(source) => RepoError::TransactionFailure { scope, source },
                    other => other,
                })
            }
        }
    }

    /// Erases every collection and the schema catalog, then re-initializes.
    ///
    /// # Errors
    /// - `StoreUnavailable` when erasing or re-initializing fails. The store
    ///   is left closed; the caller should treat this as fatal.
    pub fn reset(&mut self) -> RepoResult<()> {
        let started_at = Instant::now();
        info!("event=store_reset module=store status=start");

        let conn = self.connection_mut()?;
        match reinitialize(conn) {
            Ok(()) => {
                info!(
                    "event=store_reset module=store status=ok duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=store_reset module=store status=error duration_ms={} error_code={} error={err}",
                    started_at.elapsed().as_millis(),
                    err.code()
                );
                self.conn = None;
                Err(RepoError::StoreUnavailable(err))
            }
        }
    }

    fn connection_mut(&mut self) -> RepoResult<&mut Connection> {
        self.open()?;
        self.conn
            .as_mut()
            .ok_or(RepoError::InconsistentState("store connection missing after open"))
    }
}

/// Keeps a scope authorizer installed on the transaction connection and
/// removes it on drop, including when the body panics.
struct ScopeGuard<'conn> {
    conn: &'conn Connection,
}

impl<'conn> ScopeGuard<'conn> {
    fn install(
        conn: &'conn Connection,
        scope: &[Collection],
        denied: Arc<Mutex<Option<Collection>>>,
    ) -> Self {
        let scope = scope.to_vec();
        conn.authorizer(Some(move |ctx: AuthContext<'_>| {
            let table = match ctx.action {
                AuthAction::Read { table_name, .. }
                | AuthAction::Insert { table_name }
                | AuthAction::Update { table_name, .. }
                | AuthAction::Delete { table_name } => table_name,
                _ => return Authorization::Allow,
            };
            match Collection::from_table_name(table) {
                Some(collection) if !scope.contains(&collection) => {
                    let mut slot = denied.lock().unwrap_or_else(PoisonError::into_inner);
                    slot.get_or_insert(collection);
                    Authorization::Deny
                }
                _ => Authorization::Allow,
            }
        }));
        Self { conn }
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        self.conn.authorizer(None::<fn(AuthContext<'_>) -> Authorization>);
    }
}

fn reinitialize(conn: &mut Connection) -> DbResult<()> {
    drop_schema(conn)?;
    conn.execute_batch("VACUUM;")?;
    apply_migrations(conn)
}

fn scope_label(scope: &[Collection]) -> String {
    scope
        .iter()
        .map(|collection| collection.table_name())
        .collect::<Vec<_>>()
        .join("+")
}

fn error_code(err: &RepoError) -> &'static str {
    match err {
        RepoError::StoreUnavailable(_) => "store_unavailable",
        RepoError::Validation(_) | RepoError::InvalidSetting(_) => "validation",
        RepoError::NotFound(_) => "not_found",
        RepoError::TransactionFailure { .. } | RepoError::Db(_) => "db",
        RepoError::CollectionOutOfScope(_) => "out_of_scope",
        RepoError::InvalidData(_) => "invalid_data",
        RepoError::InconsistentState(_) => "inconsistent_state",
    }
}
