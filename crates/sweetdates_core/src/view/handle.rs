//! Display handles for photo blobs.
//!
//! A handle maps an opaque `blob:` URL to the photo bytes while it is alive.
//! Handles are scoped guards: not clonable, released on drop, and only the
//! registry that issued one accepts it back.

use crate::model::memory::{Photo, PhotoId};
use crate::repo::error::RepoError;
use log::{debug, warn};
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Debug, Display, Formatter};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

const URL_PREFIX: &str = "blob:sweetdates/";

pub type ViewResult<T> = Result<T, ViewError>;

/// Error for view building and handle management.
#[derive(Debug)]
pub enum ViewError {
    /// The registry already holds its maximum number of live handles.
    HandleLimitExceeded { limit: usize },
    /// The handle was issued by a different registry; it is returned intact.
    ForeignHandle(DisplayHandle),
    Repo(RepoError),
}

impl Display for ViewError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HandleLimitExceeded { limit } => {
                write!(f, "display handle limit of {limit} reached")
            }
            Self::ForeignHandle(handle) => {
                write!(f, "handle {} belongs to another registry", handle.url())
            }
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ViewError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            Self::HandleLimitExceeded { .. } | Self::ForeignHandle(_) => None,
        }
    }
}

impl From<RepoError> for ViewError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

#[derive(Default)]
struct RegistryInner {
    limit: Option<usize>,
    live: Mutex<HashMap<Uuid, LiveEntry>>,
}

struct LiveEntry {
    photo_id: PhotoId,
    bytes: Arc<[u8]>,
}

impl RegistryInner {
    fn live(&self) -> MutexGuard<'_, HashMap<Uuid, LiveEntry>> {
        self.live.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Process-wide table of live display handles.
///
/// Cloning shares the same table.
#[derive(Clone, Default)]
pub struct PhotoViewRegistry {
    inner: Arc<RegistryInner>,
}

impl Debug for PhotoViewRegistry {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoViewRegistry")
            .field("limit", &self.inner.limit)
            .field("live", &self.live_count())
            .finish()
    }
}

impl PhotoViewRegistry {
    /// Creates an unbounded registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry that refuses to hold more than `limit` live handles.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            inner: Arc::new(RegistryInner {
                limit: Some(limit),
                live: Mutex::default(),
            }),
        }
    }

    pub fn limit(&self) -> Option<usize> {
        self.inner.limit
    }

    /// Makes `photo` displayable and returns the owning handle.
    ///
    /// # Errors
    /// - `HandleLimitExceeded` when the registry is full.
    pub fn materialize(&self, photo: &Photo) -> ViewResult<DisplayHandle> {
        let key = Uuid::new_v4();
        {
            let mut live = self.inner.live();
            if let Some(limit) = self.inner.limit {
                if live.len() >= limit {
                    warn!(
                        "event=handle_materialize module=view status=error error_code=limit_exceeded limit={limit}"
                    );
                    return Err(ViewError::HandleLimitExceeded { limit });
                }
            }
            live.insert(
                key,
                LiveEntry {
                    photo_id: photo.id,
                    bytes: Arc::from(photo.blob.as_slice()),
                },
            );
        }

        debug!(
            "event=handle_materialize module=view status=ok photo_id={} bytes={}",
            photo.id,
            photo.blob.len()
        );
        Ok(DisplayHandle {
            key,
            photo_id: photo.id,
            url: format!("{URL_PREFIX}{key}"),
            registry: Arc::clone(&self.inner),
            released: false,
        })
    }

    /// Releases a handle issued by this registry.
    ///
    /// # Errors
    /// - `ForeignHandle` (carrying the untouched handle) when another
    ///   registry issued it.
    pub fn release(&self, handle: DisplayHandle) -> ViewResult<()> {
        if !Arc::ptr_eq(&self.inner, &handle.registry) {
            return Err(ViewError::ForeignHandle(handle));
        }
        handle.release();
        Ok(())
    }

    /// Returns the bytes behind a live handle URL.
    pub fn resolve(&self, url: &str) -> Option<Arc<[u8]>> {
        let key = url
            .strip_prefix(URL_PREFIX)
            .and_then(|raw| Uuid::parse_str(raw).ok())?;
        self.inner
            .live()
            .get(&key)
            .map(|entry| Arc::clone(&entry.bytes))
    }

    /// Photo id behind a live handle URL.
    pub fn photo_for(&self, url: &str) -> Option<PhotoId> {
        let key = url
            .strip_prefix(URL_PREFIX)
            .and_then(|raw| Uuid::parse_str(raw).ok())?;
        self.inner.live().get(&key).map(|entry| entry.photo_id)
    }

    /// Number of handles not yet released.
    pub fn live_count(&self) -> usize {
        self.inner.live().len()
    }
}

/// Ephemeral reference a renderer can use to show one photo.
pub struct DisplayHandle {
    key: Uuid,
    photo_id: PhotoId,
    url: String,
    registry: Arc<RegistryInner>,
    released: bool,
}

impl DisplayHandle {
    pub fn photo_id(&self) -> PhotoId {
        self.photo_id
    }

    /// Opaque `blob:` URL, valid until the handle is released.
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Invalidates the URL and frees the buffered bytes.
    pub fn release(mut self) {
        self.release_inner();
    }

    fn release_inner(&mut self) {
        if self.released {
            return;
        }
        self.released = true;
        if self.registry.live().remove(&self.key).is_some() {
            debug!(
                "event=handle_release module=view status=ok photo_id={}",
                self.photo_id
            );
        }
    }
}

impl Drop for DisplayHandle {
    fn drop(&mut self) {
        self.release_inner();
    }
}

impl Debug for DisplayHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DisplayHandle")
            .field("photo_id", &self.photo_id)
            .field("url", &self.url)
            .finish()
    }
}

impl Serialize for DisplayHandle {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.url)
    }
}
