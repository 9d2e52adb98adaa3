//! Board abstractions.
//!
//! [`PinStorage`] is the storage surface the geospatial layer consumes: it
//! fetches metadata, moves files in and out of the board, and maps pin
//! coordinates to paths. [`Board`] adds reading and writing of in-memory
//! values on top of it.

use std::path::PathBuf;

use crate::error::BoardError;
use crate::meta::{Meta, VersionMeta};
use crate::options::{PinWriteOptions, UploadRequest};

/// Storage operations of a pin board.
pub trait PinStorage {
    /// Returns `true` if a pin with this name exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the board cannot be inspected.
    fn pin_exists(&self, name: &str) -> Result<bool, BoardError>;

    /// Lists the stored versions of a pin, oldest first.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::PinNotFound`] if the pin does not exist.
    fn pin_versions(&self, name: &str) -> Result<Vec<VersionMeta>, BoardError>;

    /// Fetches the metadata of a pin version; `None` selects the latest.
    ///
    /// # Errors
    ///
    /// Returns an error if the pin or version does not exist or its record is
    /// unreadable.
    fn pin_fetch(&self, name: &str, version: Option<&str>) -> Result<Meta, BoardError>;

    /// Makes the files of a pin version available locally and returns their paths.
    ///
    /// When `hash` is given it must match the stored pin hash.
    ///
    /// # Errors
    ///
    /// Returns an error if the version cannot be resolved or the hash differs.
    fn pin_download(
        &self,
        name: &str,
        version: Option<&str>,
        hash: Option<&str>,
    ) -> Result<Vec<PathBuf>, BoardError>;

    /// Stores local files as a new version of a pin.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is invalid or the files cannot be stored.
    fn pin_upload(&self, paths: &[PathBuf], request: &UploadRequest) -> Result<Meta, BoardError>;

    /// Joins pin coordinates (name, version, file) into a board path.
    fn construct_path(&self, elements: &[&str]) -> PathBuf;

    /// Checks that a name is acceptable to this board.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::InvalidName`] for rejected names.
    fn validate_pin_name(&self, name: &str) -> Result<(), BoardError> {
        validate_pin_name(name)
    }
}

/// A pin board that reads and writes in-memory values.
pub trait Board: PinStorage {
    /// Values this board can store.
    type Value;

    /// Error returned by value operations.
    type Error: From<BoardError>;

    /// Reads a pin version into memory.
    ///
    /// # Errors
    ///
    /// Returns an error if the pin cannot be fetched or decoded.
    fn pin_read(
        &self,
        name: &str,
        version: Option<&str>,
        hash: Option<&str>,
    ) -> Result<Self::Value, Self::Error>;

    /// Encodes a value and stores it as a new pin version.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be encoded as the requested type
    /// or the board rejects the write.
    fn pin_write(&self, value: &Self::Value, options: &PinWriteOptions)
    -> Result<Meta, Self::Error>;
}

/// Default pin name rules: non-empty, a single path component, not hidden.
///
/// # Errors
///
/// Returns [`BoardError::InvalidName`] describing the first violated rule.
pub fn validate_pin_name(name: &str) -> Result<(), BoardError> {
    let invalid = |reason: &str| {
        Err(BoardError::InvalidName {
            name: name.to_string(),
            reason: reason.to_string(),
        })
    };

    if name.trim().is_empty() {
        return invalid("name is empty");
    }
    if name.contains(['/', '\\']) {
        return invalid("name must not contain slashes");
    }
    if name.starts_with('.') {
        return invalid("name must not start with a dot");
    }
    Ok(())
}
