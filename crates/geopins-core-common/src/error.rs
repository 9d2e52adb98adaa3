//! Error types shared by boards and format codecs.
//!
//! Boards report [`BoardError`]; format crates report [`CodecError`]. Both are
//! wrapped by the root error of `geopins-core`.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by a pin board while storing or retrieving pins.
#[derive(Debug, Error)]
pub enum BoardError {
    /// No pin with this name exists on the board
    #[error("Cannot find pin '{name}'")]
    PinNotFound {
        /// The requested pin name
        name: String,
    },

    /// The pin exists but the requested version does not
    #[error("Cannot find version '{version}' of pin '{name}'")]
    VersionNotFound {
        /// The pin name
        name: String,
        /// The requested version
        version: String,
    },

    /// Pin names must be usable as a single directory name
    #[error("Invalid pin name '{name}': {reason}")]
    InvalidName {
        /// The rejected name
        name: String,
        /// Why the name was rejected
        reason: String,
    },

    /// A caller-supplied hash does not match the stored pin hash
    #[error("Pin hash {actual} does not match given hash {expected}")]
    HashMismatch {
        /// Hash supplied by the caller
        expected: String,
        /// Hash recorded in the pin metadata
        actual: String,
    },

    /// No reader is registered for the declared pin type
    #[error("No driver for type {filetype}")]
    NoDriver {
        /// The declared pin type
        filetype: String,
    },

    /// No writer is registered for the requested pin type
    #[error("Cannot save type: {filetype}")]
    CannotSave {
        /// The requested pin type
        filetype: String,
    },

    /// The type is known but cannot hold this kind of value
    #[error("Cannot save a {value_type} value as type: {filetype}")]
    ValueNotSupported {
        /// The requested pin type
        filetype: String,
        /// The value's type name
        value_type: String,
    },

    /// Pins created by upload have no reader
    #[error(
        "Methods like `pin_read()` are not able to read 'file' type pins. Use `pin_download()` to download the file."
    )]
    FileTypePin {
        /// The pin name
        name: String,
    },

    /// A reader needed exactly one file
    #[error("Expected 1 file, got {actual}")]
    FileCount {
        /// Number of files stored in the pin
        actual: usize,
    },

    /// An unversioned write was requested on a pin that already has history
    #[error(
        "Pin '{name}' has {versions} versions, but you have requested a write without versions"
    )]
    UnversionedWrite {
        /// The pin name
        name: String,
        /// Number of existing versions
        versions: usize,
    },

    /// The computed version directory already exists
    #[error("The pin version '{version}' of '{name}' already exists")]
    VersionExists {
        /// The pin name
        name: String,
        /// The colliding version
        version: String,
    },

    /// The metadata record could not be (de)serialized
    #[error("Invalid pin metadata at '{path}': {source}")]
    Metadata {
        /// The metadata file
        path: PathBuf,
        /// The underlying error
        #[source]
        source: serde_json::Error,
    },

    /// Filesystem failure
    #[error("I/O error at '{path}': {source}")]
    Io {
        /// The path being accessed
        path: PathBuf,
        /// The underlying error
        #[source]
        source: std::io::Error,
    },

    /// A codec failed while the board encoded or decoded a value
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl BoardError {
    /// Wraps an I/O error with the path that was being accessed.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors raised while encoding or decoding a pinned file.
#[derive(Debug, Error)]
pub enum CodecError {
    /// Failed to read a file
    #[error("Failed to read {format} file '{path}': {source}")]
    Read {
        /// The format being read (e.g., "GeoPackage")
        format: String,
        /// The file path
        path: PathBuf,
        /// The underlying error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Failed to write a file
    #[error("Failed to write {format} file '{path}': {source}")]
    Write {
        /// The format being written
        format: String,
        /// The file path
        path: PathBuf,
        /// The underlying error
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// The file was readable but its content is not what the format requires
    #[error("Invalid {format} data: {message}")]
    InvalidData {
        /// The format
        format: String,
        /// Description of the problem
        message: String,
    },

    /// The coordinate reference system cannot be expressed by the codec
    #[error("Unsupported CRS '{crs}': only EPSG codes are supported")]
    UnsupportedCrs {
        /// The rejected CRS text
        crs: String,
    },

    /// A column type has no mapping in the target format
    #[error("Column '{column}' has type {data_type} which is not supported by {format}")]
    UnsupportedColumnType {
        /// The format
        format: String,
        /// The column name
        column: String,
        /// Debug rendering of the Arrow data type
        data_type: String,
    },

    /// The table has no usable geometry column
    #[error("Geometry column '{column}' not found or not a WKB binary column")]
    MissingGeometryColumn {
        /// The expected geometry column
        column: String,
    },

    /// Geometry encoding or decoding failed
    #[error("Invalid geometry: {message}")]
    Geometry {
        /// Description of the failure
        message: String,
    },
}

/// Type alias for codec results.
pub type CodecResult<T> = std::result::Result<T, CodecError>;

/// Extension trait for attaching file and format context to codec failures.
pub trait CodecErrorExt<T> {
    /// Add read context to an error.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError::Read`] if the underlying operation fails.
    fn with_read_context(self, format: &str, path: impl Into<PathBuf>) -> CodecResult<T>;

    /// Add write context to an error.
    ///
    /// # Errors
    ///
    /// Returns a [`CodecError::Write`] if the underlying operation fails.
    fn with_write_context(self, format: &str, path: impl Into<PathBuf>) -> CodecResult<T>;
}

impl<T, E> CodecErrorExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn with_read_context(self, format: &str, path: impl Into<PathBuf>) -> CodecResult<T> {
        self.map_err(|e| CodecError::Read {
            format: format.to_string(),
            path: path.into(),
            source: Box::new(e),
        })
    }

    fn with_write_context(self, format: &str, path: impl Into<PathBuf>) -> CodecResult<T> {
        self.map_err(|e| CodecError::Write {
            format: format.to_string(),
            path: path.into(),
            source: Box::new(e),
        })
    }
}
