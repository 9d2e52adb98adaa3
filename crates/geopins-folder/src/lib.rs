//! A versioned pin board on the local filesystem.
//!
//! [`FolderBoard`] stores every pin version in its own directory:
//!
//! ```text
//! <root>/<name>/<version>/data.txt   JSON metadata record
//! <root>/<name>/<version>/<files>    pinned file(s)
//! ```
//!
//! Version names are `<created>-<hash>` so that sorting them orders versions
//! by creation time.

pub mod board;
pub mod hash;
pub mod values;

pub use board::{FolderBoard, META_FILE};
pub use hash::pin_hash;
