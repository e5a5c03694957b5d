//! Dashboard cards and memory galleries.
//!
//! # Responsibility
//! - Pair listed memories with a thumbnail handle for their first photo.
//! - Materialize every photo of one memory in gallery order.
//!
//! # Invariants
//! - Only photos currently shown get a handle.
//! - Dropping a card list or a gallery releases all of its handles.

use crate::model::memory::{Memory, MemoryId};
use crate::repo::error::RepoError;
use crate::repo::memory_repo::{MemoryListQuery, MemoryRepository};
use crate::view::handle::{DisplayHandle, PhotoViewRegistry, ViewResult};
use serde::Serialize;

/// One dashboard entry.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryCard {
    #[serde(flatten)]
    pub memory: Memory,
    /// Handle for the lowest-order photo; serialized as its URL.
    #[serde(rename = "photoUrl")]
    pub thumbnail: Option<DisplayHandle>,
}

impl MemoryCard {
    pub fn photo_url(&self) -> Option<&str> {
        self.thumbnail.as_ref().map(DisplayHandle::url)
    }
}

/// All photos of one memory, in display order, with a wrapping cursor.
#[derive(Debug)]
pub struct MemoryGallery {
    memory: Memory,
    photos: Vec<DisplayHandle>,
    current: usize,
}

impl MemoryGallery {
    pub fn memory(&self) -> &Memory {
        &self.memory
    }

    pub fn photos(&self) -> &[DisplayHandle] {
        &self.photos
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn current(&self) -> Option<&DisplayHandle> {
        self.photos.get(self.current)
    }

    /// Advances to the next photo, wrapping to the first.
    pub fn next(&mut self) -> Option<&DisplayHandle> {
        if !self.photos.is_empty() {
            self.current = (self.current + 1) % self.photos.len();
        }
        self.current()
    }

    /// Steps back to the previous photo, wrapping to the last.
    pub fn previous(&mut self) -> Option<&DisplayHandle> {
        if !self.photos.is_empty() {
            self.current = (self.current + self.photos.len() - 1) % self.photos.len();
        }
        self.current()
    }

    /// Jumps to `index`; out-of-range indexes leave the cursor unchanged.
    pub fn select(&mut self, index: usize) -> Option<&DisplayHandle> {
        if index < self.photos.len() {
            self.current = index;
        }
        self.current()
    }

    /// Releases every handle and returns the memory.
    pub fn close(self) -> Memory {
        let Self { memory, photos, .. } = self;
        for handle in photos {
            handle.release();
        }
        memory
    }
}

/// Lists memories and materializes one thumbnail per memory that has photos.
pub fn build_cards<R: MemoryRepository + ?Sized>(
    repo: &mut R,
    registry: &PhotoViewRegistry,
    query: &MemoryListQuery,
) -> ViewResult<Vec<MemoryCard>> {
    let memories = repo.list_memories(query)?;
    let mut cards = Vec::with_capacity(memories.len());
    for memory in memories {
        let thumbnail = match repo.first_photo(memory.id)? {
            Some(photo) => Some(registry.materialize(&photo)?),
            None => None,
        };
        cards.push(MemoryCard { memory, thumbnail });
    }
    Ok(cards)
}

/// Loads one memory and materializes all of its photos.
///
/// # Errors
/// - `Repo(NotFound)` when the memory does not exist.
pub fn open_gallery<R: MemoryRepository + ?Sized>(
    repo: &mut R,
    registry: &PhotoViewRegistry,
    id: MemoryId,
) -> ViewResult<MemoryGallery> {
    let memory = repo.get_memory(id)?.ok_or(RepoError::NotFound(id))?;
    let photos = repo
        .list_photos(id)?
        .iter()
        .map(|photo| registry.materialize(photo))
        .collect::<ViewResult<Vec<_>>>()?;
    Ok(MemoryGallery {
        memory,
        photos,
        current: 0,
    })
}
