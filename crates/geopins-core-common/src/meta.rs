//! Pin metadata records.
//!
//! A [`Meta`] is written by a board next to the pinned files of every version and
//! is read back, never modified, by the geospatial layer.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Version of the metadata record layout.
pub const META_API_VERSION: u32 = 1;

/// Timestamp layout used in version names and the `created` field.
pub const CREATED_FORMAT: &str = "%Y%m%dT%H%M%SZ";

/// The file(s) stored in one pin version.
///
/// A pin created from a single path is always recorded as [`PinFile::Single`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PinFile {
    /// One file name relative to the version directory.
    Single(String),
    /// Several file names relative to the version directory, never empty.
    Multiple(Vec<String>),
}

impl PinFile {
    /// Builds the record for a list of stored file names.
    #[must_use]
    pub fn from_names(mut names: Vec<String>) -> Self {
        if names.len() == 1 {
            Self::Single(names.remove(0))
        } else {
            Self::Multiple(names)
        }
    }

    /// Returns the file name when exactly one file is recorded as a plain string.
    #[must_use]
    pub fn as_single(&self) -> Option<&str> {
        match self {
            Self::Single(name) => Some(name),
            Self::Multiple(_) => None,
        }
    }

    /// Returns all recorded file names in order.
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        match self {
            Self::Single(name) => vec![name.as_str()],
            Self::Multiple(names) => names.iter().map(String::as_str).collect(),
        }
    }

    /// Number of recorded files.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Multiple(names) => names.len(),
        }
    }

    /// Returns `true` when no file is recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Identity of one stored version of a pin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionMeta {
    /// Version name, `<created>-<hash>`.
    pub version: String,
    /// Creation time.
    pub created: DateTime<Utc>,
    /// Short content hash.
    pub hash: String,
}

impl VersionMeta {
    /// Derives the version identity from a creation time and the full pin hash.
    #[must_use]
    pub fn new(created: DateTime<Utc>, pin_hash: &str) -> Self {
        let hash: String = pin_hash.chars().take(5).collect();
        Self {
            version: format!("{}-{hash}", created.format(CREATED_FORMAT)),
            created,
            hash,
        }
    }

    /// Parses a version name produced by [`VersionMeta::new`].
    #[must_use]
    pub fn parse(version: &str) -> Option<Self> {
        let (timestamp, hash) = version.split_once('-')?;
        let created = NaiveDateTime::parse_from_str(timestamp, CREATED_FORMAT)
            .ok()?
            .and_utc();
        Some(Self {
            version: version.to_string(),
            created,
            hash: hash.to_string(),
        })
    }
}

/// Metadata about a stored pin version.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meta {
    /// Human-readable title.
    pub title: String,
    /// Optional longer description.
    #[serde(default)]
    pub description: Option<String>,
    /// Creation timestamp in [`CREATED_FORMAT`].
    pub created: String,
    /// Content hash of the stored files.
    pub pin_hash: String,
    /// Stored file name(s).
    pub file: PinFile,
    /// Total size in bytes of the stored files.
    pub file_size: u64,
    /// Declared filetype code, `"file"` for uploads.
    #[serde(rename = "type")]
    pub pin_type: String,
    /// Record layout version.
    pub api_version: u32,
    /// Caller-supplied metadata.
    #[serde(default)]
    pub user: Map<String, Value>,
    /// Pin name; derived from the storage location, not serialized.
    #[serde(skip)]
    pub name: String,
    /// Version identity; derived from the storage location, not serialized.
    #[serde(skip)]
    pub version: VersionMeta,
}
