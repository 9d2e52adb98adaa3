//! Options for writing and uploading pins.

use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// Options accepted by `Board::pin_write`.
///
/// | Option | Default | Generic values | `GeoTable` / `RasterGrid` |
/// |---|---|---|---|
/// | `pin_type` | per value kind | supported | supported |
/// | `title` | generated | supported | supported |
/// | `description` | `None` | supported | supported |
/// | `metadata` | `None` | supported | supported |
/// | `versioned` | board default | supported | rejected when set |
/// | `created` | now | supported | rejected when set |
/// | `force_identical_write` | `false` | supported | rejected when `true` |
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PinWriteOptions {
    /// Pin name
    pub name: String,
    /// Filetype code used to save the value (e.g. `"csv"`, `"gpkg"`)
    pub pin_type: Option<String>,
    /// Pin title
    pub title: Option<String>,
    /// Pin description
    pub description: Option<String>,
    /// Caller metadata stored as `Meta::user`
    pub metadata: Option<Map<String, Value>>,
    /// Whether older versions are kept
    pub versioned: Option<bool>,
    /// Creation time recorded in the version name
    pub created: Option<DateTime<Utc>>,
    /// Store even when the content matches the latest version
    pub force_identical_write: bool,
}

impl PinWriteOptions {
    /// Create write options for the named pin with defaults
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Set the filetype code
    #[must_use]
    pub fn with_type(mut self, pin_type: impl Into<String>) -> Self {
        self.pin_type = Some(pin_type.into());
        self
    }

    /// Set the title
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the description
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Set caller metadata
    #[must_use]
    pub fn with_metadata(mut self, metadata: Map<String, Value>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    /// Set versioning
    #[must_use]
    pub fn with_versioned(mut self, versioned: bool) -> Self {
        self.versioned = Some(versioned);
        self
    }

    /// Set the creation time
    #[must_use]
    pub fn with_created(mut self, created: DateTime<Utc>) -> Self {
        self.created = Some(created);
        self
    }

    /// Set whether identical content is stored again
    #[must_use]
    pub fn with_force_identical_write(mut self, force: bool) -> Self {
        self.force_identical_write = force;
        self
    }
}

/// Request accepted by `PinStorage::pin_upload`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UploadRequest {
    /// Pin name
    pub name: String,
    /// Pin title
    pub title: Option<String>,
    /// Pin description
    pub description: Option<String>,
    /// Caller metadata stored as `Meta::user`
    pub metadata: Option<Map<String, Value>>,
    /// Whether older versions are kept
    pub versioned: Option<bool>,
    /// Creation time recorded in the version name
    pub created: Option<DateTime<Utc>>,
    /// Store even when the content matches the latest version
    pub force_identical_write: bool,
}

impl UploadRequest {
    /// Create an upload request for the named pin with defaults
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Carries over only the descriptive fields of write options.
    ///
    /// Versioning and creation options are dropped; callers that support them
    /// use the `From` conversion instead.
    #[must_use]
    pub fn describing(options: &PinWriteOptions) -> Self {
        Self {
            name: options.name.clone(),
            title: options.title.clone(),
            description: options.description.clone(),
            metadata: options.metadata.clone(),
            ..Self::default()
        }
    }
}

impl From<&PinWriteOptions> for UploadRequest {
    fn from(options: &PinWriteOptions) -> Self {
        Self {
            versioned: options.versioned,
            created: options.created,
            force_identical_write: options.force_identical_write,
            ..Self::describing(options)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_options_builder() {
        let options = PinWriteOptions::new("rivers")
            .with_type("gpkg")
            .with_title("Rivers")
            .with_force_identical_write(true);

        assert_eq!(options.name, "rivers");
        assert_eq!(options.pin_type.as_deref(), Some("gpkg"));
        assert_eq!(options.title.as_deref(), Some("Rivers"));
        assert!(options.force_identical_write);
        assert!(options.versioned.is_none());
    }

    #[test]
    fn test_describing_drops_versioning() {
        let options = PinWriteOptions::new("rivers")
            .with_description("All rivers")
            .with_versioned(false)
            .with_force_identical_write(true);

        let request = UploadRequest::describing(&options);
        assert_eq!(request.description.as_deref(), Some("All rivers"));
        assert!(request.versioned.is_none());
        assert!(!request.force_identical_write);

        let request = UploadRequest::from(&options);
        assert_eq!(request.versioned, Some(false));
        assert!(request.force_identical_write);
    }
}
