//! Content hashes of pinned files.

use std::fs;
use std::path::PathBuf;

use geopins_core_common::BoardError;
use sha2::{Digest, Sha256};

/// Number of hex characters kept from the SHA-256 digest.
pub const PIN_HASH_LEN: usize = 16;

/// Hashes the names and contents of files in order.
///
/// Returns the truncated hex digest and the total size in bytes.
///
/// # Errors
///
/// Returns [`BoardError::Io`] if a file cannot be read.
pub fn pin_hash(paths: &[PathBuf]) -> Result<(String, u64), BoardError> {
    let mut hasher = Sha256::new();
    let mut size = 0_u64;

    for path in paths {
        let contents = fs::read(path).map_err(|e| BoardError::io(path, e))?;
        if let Some(name) = path.file_name() {
            hasher.update(name.as_encoded_bytes());
        }
        hasher.update(&contents);
        size += contents.len() as u64;
    }

    let digest = hex::encode(hasher.finalize());
    Ok((digest[..PIN_HASH_LEN].to_string(), size))
}
