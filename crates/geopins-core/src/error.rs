//! Custom error types for `geopins` operations.
//!
//! This module provides structured error handling using `thiserror`. The root
//! [`GeoPinsError`] wraps the domain errors of the geospatial layer together with
//! the [`BoardError`] and [`CodecError`] types shared with boards and format
//! crates, so a single `?` propagates any of them.

use geopins_core_common::{BoardError, CodecError};
use thiserror::Error;

use crate::filetypes::display_name;

/// Main error type for `geopins` operations.
///
/// Display formatting is delegated to the underlying variants.
#[derive(Debug, Error)]
pub enum GeoPinsError {
    /// No codec for a filetype, or the filetype does not fit the value
    #[error(transparent)]
    Driver(#[from] DriverError),

    /// The stored pin is not what the caller asked for
    #[error(transparent)]
    Pin(#[from] PinError),

    /// Write options the geospatial drivers cannot honour
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Local I/O performed by the geospatial layer itself
    #[error(transparent)]
    Io(#[from] IoError),

    /// Errors reported by the wrapped board
    #[error(transparent)]
    Board(#[from] BoardError),

    /// Encoding or decoding failures
    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Driver-related errors.
///
/// The read and write messages of unrecognized filetypes match the ones the
/// generic board uses, so callers see the same text whichever layer failed.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The filetype code is not in the registry
    #[error("Filetype '{filetype}' is not recognized.")]
    UnrecognizedFiletype {
        /// The unknown code
        filetype: String,
    },

    /// No reader exists for an unrecognized filetype
    #[error("No driver for type {filetype}")]
    NoDriver {
        /// The unknown code
        filetype: String,
    },

    /// No writer exists for an unrecognized filetype
    #[error("Cannot save type: {filetype}")]
    CannotSave {
        /// The unknown code
        filetype: String,
    },

    /// A known filetype cannot be read into this class
    #[error("Reading from '{filetype}' format is not supported for {class}.")]
    ReadNotSupported {
        /// The filetype code
        filetype: String,
        /// Class of the requested value (e.g. `GeoTable`)
        class: String,
    },

    /// A known filetype cannot hold this class
    #[error("Writing to {display_name} is not supported for {class}.")]
    WriteNotSupported {
        /// The filetype code
        filetype: String,
        /// Registry display name of the filetype (e.g. `CSV`)
        display_name: String,
        /// Class of the value being written
        class: String,
    },
}

/// Errors about the content of a stored pin.
#[derive(Debug, Error)]
pub enum PinError {
    /// The pin decoded to a different class than requested
    #[error("Expected pin '{name}' to be a {expected}, got {actual}")]
    TypeMismatch {
        /// The pin name
        name: String,
        /// The requested class
        expected: String,
        /// The class actually read
        actual: String,
    },

    /// A geospatial codec needs exactly one file
    #[error("Expected 1 file, got {actual}")]
    FileCount {
        /// Number of downloaded files
        actual: usize,
    },
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A write option the geospatial drivers reject
    #[error("`{option}` is not supported for {class} pins.")]
    UnsupportedOption {
        /// The option as the caller set it (e.g. `versioned`)
        option: String,
        /// Class of the value being written
        class: String,
    },
}

/// I/O errors raised outside the codecs.
#[derive(Debug, Error)]
pub enum IoError {
    /// The scratch directory for an encode could not be created
    #[error("Failed to create a temporary directory: {source}")]
    TempDir {
        /// The underlying error
        #[source]
        source: std::io::Error,
    },
}

/// Type alias for Results using `GeoPinsError`.
pub type Result<T> = std::result::Result<T, GeoPinsError>;

impl GeoPinsError {
    /// Get a user-friendly error message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Driver(e) => e.to_string(),
            Self::Pin(e) => e.to_string(),
            Self::Config(e) => format!("Configuration error: {e}"),
            Self::Io(e) => e.to_string(),
            Self::Board(e) => format!("Board error: {e}"),
            Self::Codec(e) => codec_message(e),
        }
    }

    /// Get recovery suggestions if available.
    #[must_use]
    pub fn recovery_suggestion(&self) -> Option<String> {
        match self {
            Self::Driver(e) => e.recovery_suggestion(),
            Self::Config(_) => Some(
                "Write geospatial pins with the default versioning and creation time.".to_string(),
            ),
            Self::Board(BoardError::PinNotFound { .. }) => {
                Some("Check the board path and the pin name.".to_string())
            }
            Self::Board(BoardError::VersionNotFound { .. }) => {
                Some("Run 'geopins versions' to list the stored versions.".to_string())
            }
            Self::Codec(CodecError::Read { .. }) => {
                Some("The pinned file may be corrupt; try an earlier version.".to_string())
            }
            _ => None,
        }
    }
}

impl DriverError {
    fn recovery_suggestion(&self) -> Option<String> {
        match self {
            Self::UnrecognizedFiletype { .. } | Self::NoDriver { .. } | Self::CannotSave { .. } => {
                Some("Run 'geopins drivers' to see all known filetypes.".to_string())
            }
            Self::WriteNotSupported { class, .. } => Some(format!(
                "Leave the type unset to use the default filetype for {class}."
            )),
            Self::ReadNotSupported { .. } => None,
        }
    }
}

fn codec_message(error: &CodecError) -> String {
    match error {
        CodecError::Read { format, path, .. } => {
            format!("Failed to read {format} file: {}", path.display())
        }
        CodecError::Write { format, path, .. } => {
            format!("Failed to write {format} file: {}", path.display())
        }
        _ => error.to_string(),
    }
}

/// Whether reading or writing was attempted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Decoding a stored pin
    Read,
    /// Encoding a value into a pin
    Write,
}

/// Builds the error for a filetype that has no codec for `class`.
///
/// Unrecognized filetypes get the generic board's wording; recognized ones name
/// the class that cannot be stored in them.
#[must_use]
pub fn driver_not_supported(filetype: &str, class: &str, mode: Mode) -> DriverError {
    let filetype = filetype.to_string();
    match (display_name(&filetype), mode) {
        (Err(_), Mode::Read) => DriverError::NoDriver { filetype },
        (Err(_), Mode::Write) => DriverError::CannotSave { filetype },
        (Ok(_), Mode::Read) => DriverError::ReadNotSupported {
            filetype,
            class: class.to_string(),
        },
        (Ok(name), Mode::Write) => DriverError::WriteNotSupported {
            filetype,
            display_name: name.to_string(),
            class: class.to_string(),
        },
    }
}
