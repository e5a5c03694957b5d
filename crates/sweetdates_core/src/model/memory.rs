//! Memory and photo records.
//!
//! # Responsibility
//! - Define the dated memory record and its ordered photo attachments.
//! - Normalize and validate caller input before anything is written.
//!
//! # Invariants
//! - `title` is non-empty after trimming.
//! - `rating` is within `1..=5`.
//! - `date` is a calendar date in `YYYY-MM-DD` form.
//! - `created_at` is assigned once at creation and never rewritten.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use time::macros::format_description;
use time::{Date, OffsetDateTime};

/// Store-assigned identifier of a memory row.
pub type MemoryId = i64;

/// Store-assigned identifier of a photo row.
pub type PhotoId = i64;

pub const MIN_RATING: u8 = 1;
pub const MAX_RATING: u8 = 5;

/// A recorded dated event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memory {
    pub id: MemoryId,
    pub title: String,
    /// `None` when the user left the description blank.
    pub description: Option<String>,
    /// Calendar date in `YYYY-MM-DD` form.
    pub date: String,
    pub rating: u8,
    /// UTC timestamp in `YYYY-MM-DDTHH:MM:SS.mmmZ` form.
    pub created_at: String,
}

/// A binary image attachment owned by one memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Photo {
    pub id: PhotoId,
    /// Owning memory id.
    pub date_id: MemoryId,
    /// Already-compressed image payload; never inspected by the core.
    pub blob: Vec<u8>,
    /// Zero-based gallery position, unique within `date_id`.
    pub order: u32,
    pub created_at: String,
}

/// Caller-supplied fields for creating or replacing a memory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryDraft {
    pub title: String,
    pub description: Option<String>,
    pub date: String,
    pub rating: u8,
}

/// Field-level validation failures for memory input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MemoryValidationError {
    EmptyTitle,
    RatingOutOfRange(u8),
    InvalidDate(String),
}

impl Display for MemoryValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "memory title cannot be empty"),
            Self::RatingOutOfRange(value) => write!(
                f,
                "rating {value} is out of range; expected {MIN_RATING}..={MAX_RATING}"
            ),
            Self::InvalidDate(value) => {
                write!(f, "invalid memory date `{value}`; expected YYYY-MM-DD")
            }
        }
    }
}

impl Error for MemoryValidationError {}

impl MemoryDraft {
    /// Creates a draft without a description.
    pub fn new(title: impl Into<String>, date: impl Into<String>, rating: u8) -> Self {
        Self {
            title: title.into(),
            description: None,
            date: date.into(),
            rating,
        }
    }

    /// Sets the optional description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Returns a trimmed copy of this draft after validating every field.
    ///
    /// Blank descriptions collapse to `None`.
    pub fn normalized(&self) -> Result<Self, MemoryValidationError> {
        let title = self.title.trim();
        if title.is_empty() {
            return Err(MemoryValidationError::EmptyTitle);
        }

        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(MemoryValidationError::RatingOutOfRange(self.rating));
        }

        let date = self.date.trim();
        parse_calendar_date(date)?;

        let description = self
            .description
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_string);

        Ok(Self {
            title: title.to_string(),
            description,
            date: date.to_string(),
            rating: self.rating,
        })
    }
}

impl Memory {
    /// Validates a row read back from storage.
    pub fn validate(&self) -> Result<(), MemoryValidationError> {
        if self.title.trim().is_empty() {
            return Err(MemoryValidationError::EmptyTitle);
        }
        if !(MIN_RATING..=MAX_RATING).contains(&self.rating) {
            return Err(MemoryValidationError::RatingOutOfRange(self.rating));
        }
        parse_calendar_date(&self.date)?;
        Ok(())
    }
}

/// Parses a `YYYY-MM-DD` calendar date.
pub fn parse_calendar_date(value: &str) -> Result<Date, MemoryValidationError> {
    Date::parse(value, format_description!("[year]-[month]-[day]"))
        .map_err(|_| MemoryValidationError::InvalidDate(value.to_string()))
}

/// Formats the current UTC time with millisecond precision.
///
/// Fixed-width output keeps lexical and chronological order identical.
pub fn timestamp_now() -> Result<String, time::error::Format> {
    OffsetDateTime::now_utc().format(format_description!(
        "[year]-[month]-[day]T[hour]:[minute]:[second].[subsecond digits:3]Z"
    ))
}
