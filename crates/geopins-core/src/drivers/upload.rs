//! Moving encoded files in and out of a board.

use std::path::{Path, PathBuf};

use geopins_core_common::{CodecResult, Meta, PinStorage, PinWriteOptions, UploadRequest};
use log::{debug, info};

use crate::error::{ConfigError, IoError, PinError, Result};

/// Rejects write options that a geospatial upload cannot honour.
///
/// Uploads always create a new version with the board's own creation time.
pub(crate) fn check_options(options: &PinWriteOptions, class: &str) -> Result<()> {
    let unsupported = if options.force_identical_write {
        Some("force_identical_write=True")
    } else if options.versioned.is_some() {
        Some("versioned")
    } else if options.created.is_some() {
        Some("created")
    } else {
        None
    };

    match unsupported {
        Some(option) => Err(ConfigError::UnsupportedOption {
            option: option.to_string(),
            class: class.to_string(),
        }
        .into()),
        None => Ok(()),
    }
}

/// Encodes a value to `<name>.<extension>` in a scratch directory and uploads it.
///
/// The scratch directory is removed when this returns, whatever the outcome.
pub(crate) fn upload_encoded<B, F>(
    board: &B,
    options: &PinWriteOptions,
    class: &str,
    extension: &str,
    encode: F,
) -> Result<Meta>
where
    B: PinStorage + ?Sized,
    F: FnOnce(&Path) -> CodecResult<()>,
{
    check_options(options, class)?;
    board.validate_pin_name(&options.name)?;

    let temp_dir = tempfile::tempdir().map_err(|source| IoError::TempDir { source })?;
    let path = temp_dir.path().join(format!("{}.{extension}", options.name));
    debug!("Encoding {class} to {}", path.display());
    encode(&path)?;

    let meta = board.pin_upload(
        std::slice::from_ref(&path),
        &UploadRequest::describing(options),
    )?;
    info!(
        "Pinned {class} '{}' as {extension} (version {})",
        options.name, meta.version.version
    );
    Ok(meta)
}

/// Downloads a pin version that must consist of exactly one file.
pub(crate) fn download_single<B>(
    board: &B,
    name: &str,
    version: Option<&str>,
    hash: Option<&str>,
) -> Result<PathBuf>
where
    B: PinStorage + ?Sized,
{
    let mut paths = board.pin_download(name, version, hash)?;
    if paths.len() != 1 {
        return Err(PinError::FileCount {
            actual: paths.len(),
        }
        .into());
    }
    Ok(paths.remove(0))
}
