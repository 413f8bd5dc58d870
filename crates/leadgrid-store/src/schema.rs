//! Persisted record schema.
//!
//! A list document holds the primary record table plus an optional search
//! log. Fields introduced after the first schema version carry a serde
//! default so older documents load without migration.

use crate::error::{Result, StoreError};
use leadgrid_core::{PlaceId, Timestamp};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;
use std::str::FromStr;

/// Schema version written by this build.
///
/// - v1: place data only
/// - v2: adds `hidden`, `called`, `interested`, `note`
pub const SCHEMA_VERSION: u32 = 2;

/// A persisted, detail-enriched business entry with user-editable flags.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Record {
    /// Provider identifier, unique within a list
    pub place_id: PlaceId,
    /// Display name
    pub name: String,
    /// Formatted address
    #[serde(default, deserialize_with = "null_as_default")]
    pub address: String,
    /// Formatted phone number
    #[serde(default, deserialize_with = "null_as_default")]
    pub phone: String,
    /// Website URL
    #[serde(default, deserialize_with = "null_as_default")]
    pub website: String,
    /// Average user rating, if the provider has one
    #[serde(default)]
    pub rating: Option<f64>,
    /// Provider place types
    #[serde(default, deserialize_with = "null_as_default")]
    pub categories: Vec<String>,
    /// Keyword whose search surfaced this place
    #[serde(default, deserialize_with = "null_as_default")]
    pub keyword: String,
    /// When the details were fetched
    pub extracted_at: Timestamp,

    /// Hidden from the default UI view (v2)
    #[serde(default, deserialize_with = "null_as_default")]
    pub hidden: bool,
    /// Already contacted (v2)
    #[serde(default, deserialize_with = "null_as_default")]
    pub called: bool,
    /// Marked as a promising lead (v2)
    #[serde(default, deserialize_with = "null_as_default")]
    pub interested: bool,
    /// Free-text note (v2)
    #[serde(default, deserialize_with = "null_as_default")]
    pub note: String,
}

impl Record {
    /// Create a record stamped now, with empty contact data and cleared flags.
    #[must_use]
    pub fn new(place_id: PlaceId, name: impl Into<String>) -> Self {
        Self {
            place_id,
            name: name.into(),
            address: String::new(),
            phone: String::new(),
            website: String::new(),
            rating: None,
            categories: Vec::new(),
            keyword: String::new(),
            extracted_at: Timestamp::now(),
            hidden: false,
            called: false,
            interested: false,
            note: String::new(),
        }
    }
}

/// One row of the auxiliary search log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchLogEntry {
    /// When the run finished
    pub searched_at: Timestamp,
    /// Free-form area that was geocoded
    pub area: String,
    /// Requested search radius in meters
    pub radius_m: u32,
    /// Grid spacing in meters
    pub grid_step_m: u32,
    /// Keywords searched, in order
    pub keywords: Vec<String>,
    /// Number of grid points queried per keyword
    #[serde(default)]
    pub grid_points: usize,
    /// Records added by the run
    #[serde(default)]
    pub new_records: usize,
}

/// On-disk shape of a list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListDocument {
    /// Schema version the document was written with
    #[serde(default = "legacy_schema_version")]
    pub schema_version: u32,
    /// Primary record table
    #[serde(default)]
    pub records: Vec<Record>,
    /// Auxiliary search log, absent until the first logged run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub searches: Option<Vec<SearchLogEntry>>,
}

impl ListDocument {
    /// Header-only document: no records, no search log.
    #[must_use]
    pub fn empty() -> Self {
        Self::from_records(Vec::new())
    }

    /// Document holding only the primary table.
    #[must_use]
    pub fn from_records(records: Vec<Record>) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            records,
            searches: None,
        }
    }
}

fn legacy_schema_version() -> u32 {
    1
}

fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Row fields that may be edited in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordField {
    /// `hidden` flag
    Hidden,
    /// `called` flag
    Called,
    /// `interested` flag
    Interested,
    /// Free-text note
    Note,
}

impl RecordField {
    /// Canonical field name.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hidden => "hidden",
            Self::Called => "called",
            Self::Interested => "interested",
            Self::Note => "note",
        }
    }
}

impl fmt::Display for RecordField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecordField {
    type Err = StoreError;

    /// Accepts canonical names and the UI action names `hide` / `call`.
    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hidden" | "hide" => Ok(Self::Hidden),
            "called" | "call" => Ok(Self::Called),
            "interested" => Ok(Self::Interested),
            "note" => Ok(Self::Note),
            _ => Err(StoreError::InvalidField {
                field: s.to_string(),
            }),
        }
    }
}

/// A single in-place row edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowEdit {
    /// Set the `hidden` flag
    Hidden(bool),
    /// Set the `called` flag
    Called(bool),
    /// Set the `interested` flag
    Interested(bool),
    /// Replace the note
    Note(String),
}

impl RowEdit {
    /// Build an edit from a field name and a loosely typed value.
    ///
    /// Flags take a JSON boolean, the note takes a string (or `null` to clear).
    pub fn parse(field: &str, value: &JsonValue) -> Result<Self> {
        let field = field.parse::<RecordField>()?;
        match field {
            RecordField::Note => match value {
                JsonValue::String(note) => Ok(Self::Note(note.clone())),
                JsonValue::Null => Ok(Self::Note(String::new())),
                other => Err(StoreError::InvalidValue {
                    field: field.to_string(),
                    reason: format!("expected a string, got {other}"),
                }),
            },
            flag => {
                let value = value.as_bool().ok_or_else(|| StoreError::InvalidValue {
                    field: flag.to_string(),
                    reason: format!("expected a boolean, got {value}"),
                })?;
                Ok(match flag {
                    RecordField::Hidden => Self::Hidden(value),
                    RecordField::Called => Self::Called(value),
                    _ => Self::Interested(value),
                })
            }
        }
    }

    /// Field this edit targets.
    #[must_use]
    pub fn field(&self) -> RecordField {
        match self {
            Self::Hidden(_) => RecordField::Hidden,
            Self::Called(_) => RecordField::Called,
            Self::Interested(_) => RecordField::Interested,
            Self::Note(_) => RecordField::Note,
        }
    }

    /// Apply the edit to a record.
    pub fn apply(&self, record: &mut Record) {
        match self {
            Self::Hidden(value) => record.hidden = *value,
            Self::Called(value) => record.called = *value,
            Self::Interested(value) => record.interested = *value,
            Self::Note(note) => record.note.clone_from(note),
        }
    }
}
