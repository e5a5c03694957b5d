//! Application settings records and well-known keys.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

pub const USER_NAME_KEY: &str = "userName";
pub const PARTNER_NAME_KEY: &str = "partnerName";
pub const THEME_KEY: &str = "theme";

/// One persisted key/value row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Setting {
    pub id: i64,
    pub key: String,
    pub value: String,
}

/// Input rejected by setup/name-editing flows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingValidationError {
    /// The named setting was empty or whitespace-only.
    BlankName(&'static str),
}

impl Display for SettingValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName(key) => write!(f, "setting `{key}` cannot be blank"),
        }
    }
}

impl Error for SettingValidationError {}

/// Color theme selectable in settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Lilac,
    Mauve,
    Rose,
    Peach,
    Passion,
    Coral,
    Sky,
    Mint,
}

impl Theme {
    pub const ALL: [Theme; 8] = [
        Theme::Lilac,
        Theme::Mauve,
        Theme::Rose,
        Theme::Peach,
        Theme::Passion,
        Theme::Coral,
        Theme::Sky,
        Theme::Mint,
    ];

    /// Stable id persisted under [`THEME_KEY`].
    pub fn id(self) -> &'static str {
        match self {
            Self::Lilac => "lilac",
            Self::Mauve => "mauve",
            Self::Rose => "rose",
            Self::Peach => "peach",
            Self::Passion => "passion",
            Self::Coral => "coral",
            Self::Sky => "sky",
            Self::Mint => "mint",
        }
    }

    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Lilac => "Lilac",
            Self::Mauve => "Mauve",
            Self::Rose => "Rose",
            Self::Peach => "Peach",
            Self::Passion => "Passion",
            Self::Coral => "Coral",
            Self::Sky => "Sky",
            Self::Mint => "Mint",
        }
    }

    /// Resolves a stored id, falling back to the default theme.
    pub fn from_id_or_default(value: Option<&str>) -> Self {
        value
            .and_then(|id| id.parse().ok())
            .unwrap_or_default()
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|theme| theme.id() == value)
            .ok_or_else(|| format!("unknown theme `{value}`"))
    }
}
