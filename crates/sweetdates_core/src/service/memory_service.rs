//! Memory use-case service.
//!
//! # Responsibility
//! - Entry points for memory create/edit/delete and read queries.
//! - Build dashboard cards and galleries with display handles.
//!
//! # Invariants
//! - Service APIs never bypass repository validation or transactions.

use crate::model::memory::{Memory, MemoryDraft, MemoryId, Photo};
use crate::repo::error::RepoResult;
use crate::repo::memory_repo::{MemoryListQuery, MemoryRepository};
use crate::view::{
    build_cards, open_gallery, MemoryCard, MemoryGallery, PhotoViewRegistry, ViewResult,
};

/// Use-case service wrapper for memory operations.
pub struct MemoryService<R: MemoryRepository> {
    repo: R,
}

impl<R: MemoryRepository> MemoryService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Creates a memory with photos in the given display order.
    pub fn create_memory(
        &mut self,
        draft: &MemoryDraft,
        photos: &[Vec<u8>],
    ) -> RepoResult<MemoryId> {
        self.repo.create_memory(draft, photos)
    }

    /// Edits a memory by replacing its fields and whole photo set.
    ///
    /// Returns `NotFound` for a missing id.
    pub fn edit_memory(
        &mut self,
        id: MemoryId,
        draft: &MemoryDraft,
        photos: &[Vec<u8>],
    ) -> RepoResult<()> {
        self.repo.replace_memory(id, draft, photos)
    }

    pub fn get_memory(&mut self, id: MemoryId) -> RepoResult<Option<Memory>> {
        self.repo.get_memory(id)
    }

    pub fn list_memories(&mut self, query: &MemoryListQuery) -> RepoResult<Vec<Memory>> {
        self.repo.list_memories(query)
    }

    pub fn list_photos(&mut self, id: MemoryId) -> RepoResult<Vec<Photo>> {
        self.repo.list_photos(id)
    }

    pub fn first_photo(&mut self, id: MemoryId) -> RepoResult<Option<Photo>> {
        self.repo.first_photo(id)
    }

    pub fn count_photos(&mut self, id: MemoryId) -> RepoResult<u32> {
        self.repo.count_photos(id)
    }

    /// Deletes a memory with its photos; missing ids are a no-op.
    pub fn delete_memory(&mut self, id: MemoryId) -> RepoResult<()> {
        self.repo.delete_memory(id)
    }

    /// Dashboard cards with first-photo thumbnails.
    pub fn cards(
        &mut self,
        registry: &PhotoViewRegistry,
        query: &MemoryListQuery,
    ) -> ViewResult<Vec<MemoryCard>> {
        build_cards(&mut self.repo, registry, query)
    }

    /// Gallery with every photo of one memory materialized.
    pub fn gallery(
        &mut self,
        registry: &PhotoViewRegistry,
        id: MemoryId,
    ) -> ViewResult<MemoryGallery> {
        open_gallery(&mut self.repo, registry, id)
    }
}
