//! Common types and traits shared across `geopins` crates.
//!
//! This crate provides the board abstractions, pin metadata and the in-memory
//! value types shared between `geopins-core`, the boards and the format
//! crates, preventing circular dependencies.

pub mod board;
pub mod error;
pub mod meta;
pub mod options;
pub mod types;

// Re-export commonly used types
pub use board::{Board, PinStorage, validate_pin_name};
pub use error::{BoardError, CodecError, CodecErrorExt, CodecResult};
pub use meta::{CREATED_FORMAT, META_API_VERSION, Meta, PinFile, VersionMeta};
pub use options::{PinWriteOptions, UploadRequest};
pub use types::{Crs, GeoTable, GeoTransform, PinData, PinValue, RasterGrid};
