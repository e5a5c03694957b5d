//! Memory/photo repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Create, replace and delete a memory together with its ordered photos.
//! - Serve the read queries used by list and detail views.
//!
//! # Invariants
//! - A memory and its photos are written and removed in one transaction.
//! - Photo `order` is the 0-based input position, contiguous per memory.
//! - Photo reads are always ordered by `sort_order ASC`.
//! - Deleting a missing memory is a successful no-op.

use crate::model::memory::{timestamp_now, Memory, MemoryDraft, MemoryId, Photo};
use crate::repo::error::{RepoError, RepoResult};
use crate::store::{Collection, RecordStore};
use log::info;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const MEMORY_SELECT_SQL: &str = "SELECT
    id,
    title,
    description,
    date,
    rating,
    created_at
FROM dates";

const PHOTO_SELECT_SQL: &str = "SELECT
    id,
    date_id,
    blob,
    sort_order,
    created_at
FROM photos";

const MEMORY_SCOPE: &[Collection] = &[Collection::Memories, Collection::Photos];

/// Dashboard ordering options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MemorySort {
    /// Most recently created first.
    Recent,
    /// Latest memory date first.
    #[default]
    Newest,
    /// Earliest memory date first.
    Oldest,
    /// Highest rating first.
    Highest,
}

impl MemorySort {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Recent => "recent",
            Self::Newest => "newest",
            Self::Oldest => "oldest",
            Self::Highest => "highest",
        }
    }
}

/// Unknown sort name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMemorySortError(pub String);

impl Display for ParseMemorySortError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "unknown sort `{}`; expected recent|newest|oldest|highest",
            self.0
        )
    }
}

impl Error for ParseMemorySortError {}

impl FromStr for MemorySort {
    type Err = ParseMemorySortError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "recent" => Ok(Self::Recent),
            "newest" => Ok(Self::Newest),
            "oldest" => Ok(Self::Oldest),
            "highest" => Ok(Self::Highest),
            other => Err(ParseMemorySortError(other.to_string())),
        }
    }
}

/// Query options for listing memories.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemoryListQuery {
    /// Case-insensitive substring matched against title and description.
    pub filter: Option<String>,
    pub sort: MemorySort,
}

impl MemoryListQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_sort(mut self, sort: MemorySort) -> Self {
        self.sort = sort;
        self
    }
}

/// Repository interface for memories and their photos.
pub trait MemoryRepository {
    /// Validates `draft` and stores it with `photos` in display order.
    fn create_memory(&mut self, draft: &MemoryDraft, photos: &[Vec<u8>]) -> RepoResult<MemoryId>;
    /// Replaces the fields and the whole photo set of an existing memory.
    fn replace_memory(
        &mut self,
        id: MemoryId,
        draft: &MemoryDraft,
        photos: &[Vec<u8>],
    ) -> RepoResult<()>;
    fn get_memory(&mut self, id: MemoryId) -> RepoResult<Option<Memory>>;
    /// Lists memories filtered and sorted in memory.
    fn list_memories(&mut self, query: &MemoryListQuery) -> RepoResult<Vec<Memory>>;
    /// Photos of one memory ordered by `order` ascending.
    fn list_photos(&mut self, date_id: MemoryId) -> RepoResult<Vec<Photo>>;
    /// The lowest-order photo of one memory.
    fn first_photo(&mut self, date_id: MemoryId) -> RepoResult<Option<Photo>>;
    fn count_photos(&mut self, date_id: MemoryId) -> RepoResult<u32>;
    /// Removes a memory and all its photos atomically.
    fn delete_memory(&mut self, id: MemoryId) -> RepoResult<()>;
}

/// SQLite-backed memory repository.
pub struct SqliteMemoryRepository<'store> {
    store: &'store mut RecordStore,
}

impl<'store> SqliteMemoryRepository<'store> {
    pub fn new(store: &'store mut RecordStore) -> Self {
        Self { store }
    }
}

impl MemoryRepository for SqliteMemoryRepository<'_> {
    fn create_memory(&mut self, draft: &MemoryDraft, photos: &[Vec<u8>]) -> RepoResult<MemoryId> {
        let draft = draft.normalized()?;
        let created_at = now_stamp()?;

        let id = self.store.run_transaction(MEMORY_SCOPE, |tx| {
            let memories = tx.collection(Collection::Memories)?;
            memories.execute(
                "INSERT INTO dates (
                    title,
                    description,
                    date,
                    rating,
                    created_at
                ) VALUES (?1, ?2, ?3, ?4, ?5);",
                params![
                    draft.title.as_str(),
                    draft.description.as_deref(),
                    draft.date.as_str(),
                    draft.rating,
                    created_at.as_str(),
                ],
            )?;
            let id = memories.last_insert_rowid();

            insert_photos(tx.collection(Collection::Photos)?, id, photos, &created_at)?;
            Ok(id)
        })?;

        info!(
            "event=memory_create module=repo status=ok memory_id={id} photo_count={}",
            photos.len()
        );
        Ok(id)
    }

    fn replace_memory(
        &mut self,
        id: MemoryId,
        draft: &MemoryDraft,
        photos: &[Vec<u8>],
    ) -> RepoResult<()> {
        let draft = draft.normalized()?;
        let created_at = now_stamp()?;

        self.store.run_transaction(MEMORY_SCOPE, |tx| {
            let changed = tx.collection(Collection::Memories)?.execute(
                "UPDATE dates
                 SET
                    title = ?1,
                    description = ?2,
                    date = ?3,
                    rating = ?4
                 WHERE id = ?5;",
                params![
                    draft.title.as_str(),
                    draft.description.as_deref(),
                    draft.date.as_str(),
                    draft.rating,
                    id,
                ],
            )?;
            if changed == 0 {
                return Err(RepoError::NotFound(id));
            }

            let photos_conn = tx.collection(Collection::Photos)?;
            photos_conn.execute("DELETE FROM photos WHERE date_id = ?1;", [id])?;
            insert_photos(photos_conn, id, photos, &created_at)
        })?;

        info!(
            "event=memory_replace module=repo status=ok memory_id={id} photo_count={}",
            photos.len()
        );
        Ok(())
    }

    fn get_memory(&mut self, id: MemoryId) -> RepoResult<Option<Memory>> {
        let conn = self.store.connection()?;
        let mut stmt = conn.prepare(&format!("{MEMORY_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_memory_row(row)?));
        }
        Ok(None)
    }

    fn list_memories(&mut self, query: &MemoryListQuery) -> RepoResult<Vec<Memory>> {
        let conn = self.store.connection()?;
        let mut stmt = conn.prepare(&format!("{MEMORY_SELECT_SQL} ORDER BY id ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut memories = Vec::new();
        while let Some(row) = rows.next()? {
            memories.push(parse_memory_row(row)?);
        }
        Ok(apply_list_query(memories, query))
    }

    fn list_photos(&mut self, date_id: MemoryId) -> RepoResult<Vec<Photo>> {
        let conn = self.store.connection()?;
        let mut stmt = conn.prepare(&format!(
            "{PHOTO_SELECT_SQL}
             WHERE date_id = ?1
             ORDER BY sort_order ASC, id ASC;"
        ))?;
        let mut rows = stmt.query([date_id])?;
        let mut photos = Vec::new();
        while let Some(row) = rows.next()? {
            photos.push(parse_photo_row(row)?);
        }
        Ok(photos)
    }

    fn first_photo(&mut self, date_id: MemoryId) -> RepoResult<Option<Photo>> {
        let conn = self.store.connection()?;
        let photo = conn
            .query_row(
                &format!(
                    "{PHOTO_SELECT_SQL}
                     WHERE date_id = ?1
                     ORDER BY sort_order ASC, id ASC
                     LIMIT 1;"
                ),
                [date_id],
                |row| Ok(parse_photo_row(row)),
            )
            .optional()?;
        photo.transpose()
    }

    fn count_photos(&mut self, date_id: MemoryId) -> RepoResult<u32> {
        let conn = self.store.connection()?;
        let count = conn.query_row(
            "SELECT COUNT(*) FROM photos WHERE date_id = ?1;",
            [date_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn delete_memory(&mut self, id: MemoryId) -> RepoResult<()> {
        let (photos_removed, memories_removed) = self.store.run_transaction(MEMORY_SCOPE, |tx| {
            let photos_removed = tx
                .collection(Collection::Photos)?
                .execute("DELETE FROM photos WHERE date_id = ?1;", [id])?;
            let memories_removed = tx
                .collection(Collection::Memories)?
                .execute("DELETE FROM dates WHERE id = ?1;", [id])?;
            Ok((photos_removed, memories_removed))
        })?;

        info!(
            "event=memory_delete module=repo status=ok memory_id={id} found={} photos_removed={photos_removed}",
            memories_removed > 0
        );
        Ok(())
    }
}

/// Filters and sorts an id-ordered memory list.
///
/// Sorting is stable, so ties keep ascending id order.
pub fn apply_list_query(mut memories: Vec<Memory>, query: &MemoryListQuery) -> Vec<Memory> {
    if let Some(needle) = query.filter.as_deref().and_then(normalize_search_text) {
        memories.retain(|memory| matches_filter(memory, &needle));
    }

    match query.sort {
        MemorySort::Recent => memories.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.cmp(&a.id))
        }),
        MemorySort::Newest => memories.sort_by(|a, b| b.date.cmp(&a.date)),
        MemorySort::Oldest => memories.sort_by(|a, b| a.date.cmp(&b.date)),
        MemorySort::Highest => memories.sort_by(|a, b| b.rating.cmp(&a.rating)),
    }

    memories
}

/// Trims and lowercases a filter; blank input means "no filter".
///
/// Inner whitespace is kept as typed, so `"beach  day"` only matches text
/// with the same double space.
pub fn normalize_search_text(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_lowercase())
    }
}

fn matches_filter(memory: &Memory, needle: &str) -> bool {
    memory.title.to_lowercase().contains(needle)
        || memory
            .description
            .as_deref()
            .is_some_and(|description| description.to_lowercase().contains(needle))
}

fn insert_photos(
    conn: &Connection,
    date_id: MemoryId,
    photos: &[Vec<u8>],
    created_at: &str,
) -> RepoResult<()> {
    for (index, blob) in photos.iter().enumerate() {
        let order = u32::try_from(index)
            .map_err(|_| RepoError::InvalidData(format!("photo position {index} overflows")))?;
        conn.execute(
            "INSERT INTO photos (
                date_id,
                blob,
                sort_order,
                created_at
            ) VALUES (?1, ?2, ?3, ?4);",
            params![date_id, blob.as_slice(), order, created_at],
        )?;
    }
    Ok(())
}

fn now_stamp() -> RepoResult<String> {
    timestamp_now()
        .map_err(|err| RepoError::InvalidData(format!("failed to format timestamp: {err}")))
}

fn parse_memory_row(row: &Row<'_>) -> RepoResult<Memory> {
    let memory = Memory {
        id: row.get("id")?,
        title: row.get("title")?,
        description: row.get("description")?,
        date: row.get("date")?,
        rating: row.get("rating")?,
        created_at: row.get("created_at")?,
    };
    memory
        .validate()
        .map_err(|err| RepoError::InvalidData(format!("dates row {}: {err}", memory.id)))?;
    Ok(memory)
}

fn parse_photo_row(row: &Row<'_>) -> RepoResult<Photo> {
    Ok(Photo {
        id: row.get("id")?,
        date_id: row.get("date_id")?,
        blob: row.get("blob")?,
        order: row.get("sort_order")?,
        created_at: row.get("created_at")?,
    })
}

#[cfg(test)]
mod tests {
    use super::{apply_list_query, normalize_search_text, MemoryListQuery, MemorySort};
    use crate::model::memory::Memory;

    fn memory(id: i64, title: &str, date: &str, rating: u8) -> Memory {
        Memory {
            id,
            title: title.to_string(),
            description: None,
            date: date.to_string(),
            rating,
            created_at: format!("2024-01-01T00:00:0{id}.000Z"),
        }
    }

    #[test]
    fn normalize_search_text_trims_and_lowercases() {
        assert_eq!(
            normalize_search_text("  Beach \t DAY ").as_deref(),
            Some("beach \t day")
        );
        assert_eq!(normalize_search_text("   "), None);
    }

    #[test]
    fn filter_does_not_collapse_stored_whitespace() {
        let listed = apply_list_query(
            vec![
                memory(1, "Beach   Day", "2024-06-01", 5),
                memory(2, "Beach day trip", "2024-06-02", 4),
            ],
            &MemoryListQuery::new().with_filter(" BEACH DAY "),
        );
        let ids: Vec<i64> = listed.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn sort_names_parse_case_insensitively() {
        assert_eq!("Highest".parse::<MemorySort>().unwrap(), MemorySort::Highest);
        assert!("rating".parse::<MemorySort>().is_err());
        assert_eq!(MemorySort::default(), MemorySort::Newest);
    }

    #[test]
    fn ties_keep_id_order() {
        let listed = apply_list_query(
            vec![
                memory(1, "a", "2024-01-01", 4),
                memory(2, "b", "2024-01-01", 4),
                memory(3, "c", "2024-01-02", 2),
            ],
            &MemoryListQuery::new().with_sort(MemorySort::Highest),
        );
        let ids: Vec<i64> = listed.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn recent_sort_uses_created_at() {
        let listed = apply_list_query(
            vec![
                memory(1, "a", "2024-03-01", 1),
                memory(2, "b", "2023-01-01", 1),
            ],
            &MemoryListQuery::new().with_sort(MemorySort::Recent),
        );
        assert_eq!(listed[0].id, 2);
    }

    #[test]
    fn filter_matches_description() {
        let mut with_description = memory(1, "Dinner", "2024-01-01", 3);
        with_description.description = Some("Tiny PASTA place".to_string());
        let listed = apply_list_query(
            vec![with_description, memory(2, "Movie", "2024-01-02", 3)],
            &MemoryListQuery::new().with_filter("pasta"),
        );
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].id, 1);
    }
}
