//! The folder board.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, SubsecRound, Utc};
use geopins_core_common::{
    Board, BoardError, CREATED_FORMAT, META_API_VERSION, Meta, PinData, PinFile, PinStorage,
    PinWriteOptions, UploadRequest, VersionMeta,
};
use log::{debug, info};

use crate::hash::pin_hash;
use crate::values::{check_writable, default_title, default_type, read_value, write_value};

/// Name of the metadata record in every version directory.
pub const META_FILE: &str = "data.txt";

/// Type recorded for pins created by [`PinStorage::pin_upload`].
const FILE_TYPE: &str = "file";

/// A pin board stored in a local directory.
#[derive(Debug, Clone)]
pub struct FolderBoard {
    root: PathBuf,
    versioned: bool,
}

/// What a new version stores, independent of how its files were produced.
struct NewVersion<'a> {
    paths: &'a [PathBuf],
    request: &'a UploadRequest,
    pin_type: &'a str,
    default_title: String,
}

impl FolderBoard {
    /// Creates a versioned board rooted at `root`.
    ///
    /// The directory is created on the first write.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            versioned: true,
        }
    }

    /// Sets whether writes keep older versions unless the request says otherwise.
    #[must_use]
    pub fn with_versioned(mut self, versioned: bool) -> Self {
        self.versioned = versioned;
        self
    }

    /// The board directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether writes keep older versions by default.
    #[must_use]
    pub fn versioned(&self) -> bool {
        self.versioned
    }

    /// Names of all pins, sorted.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::Io`] if the board directory cannot be listed.
    pub fn pin_list(&self) -> Result<Vec<String>, BoardError> {
        if !self.root.is_dir() {
            return Ok(Vec::new());
        }
        let mut names: Vec<String> = subdirectories(&self.root)?
            .into_iter()
            .filter(|name| !name.starts_with('.'))
            .collect();
        names.sort();
        Ok(names)
    }

    /// Deletes a pin and all its versions.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::PinNotFound`] if the pin does not exist.
    pub fn pin_delete(&self, name: &str) -> Result<(), BoardError> {
        let dir = self.pin_dir(name)?;
        info!("Deleting pin '{name}'");
        fs::remove_dir_all(&dir).map_err(|e| BoardError::io(&dir, e))
    }

    /// Deletes one version of a pin.
    ///
    /// # Errors
    ///
    /// Returns an error if the pin or version does not exist.
    pub fn pin_version_delete(&self, name: &str, version: &str) -> Result<(), BoardError> {
        let dir = self.version_dir(name, version)?;
        info!("Deleting version '{version}' of pin '{name}'");
        fs::remove_dir_all(&dir).map_err(|e| BoardError::io(&dir, e))
    }

    fn pin_dir(&self, name: &str) -> Result<PathBuf, BoardError> {
        self.validate_pin_name(name)?;
        let dir = self.root.join(name);
        if dir.is_dir() {
            Ok(dir)
        } else {
            Err(BoardError::PinNotFound {
                name: name.to_string(),
            })
        }
    }

    fn version_dir(&self, name: &str, version: &str) -> Result<PathBuf, BoardError> {
        let dir = self.pin_dir(name)?.join(version);
        if dir.join(META_FILE).is_file() {
            Ok(dir)
        } else {
            Err(BoardError::VersionNotFound {
                name: name.to_string(),
                version: version.to_string(),
            })
        }
    }

    fn latest_version(&self, name: &str) -> Result<VersionMeta, BoardError> {
        self.pin_versions(name)?
            .pop()
            .ok_or_else(|| BoardError::PinNotFound {
                name: name.to_string(),
            })
    }

    fn store(&self, new: NewVersion<'_>) -> Result<Meta, BoardError> {
        let NewVersion {
            paths,
            request,
            pin_type,
            default_title,
        } = new;
        let name = request.name.as_str();
        self.validate_pin_name(name)?;

        let (hash, file_size) = pin_hash(paths)?;
        let exists = self.pin_exists(name)?;
        let existing = if exists {
            self.pin_versions(name)?
        } else {
            Vec::new()
        };

        if let Some(latest) = existing.last().filter(|_| !request.force_identical_write) {
            let latest = self.pin_fetch(name, Some(latest.version.as_str()))?;
            if latest.pin_hash == hash {
                info!(
                    "Pin '{name}' content is identical to version '{}', not writing a new version",
                    latest.version.version
                );
                return Ok(latest);
            }
        }

        let versioned = request.versioned.unwrap_or(self.versioned);
        if !versioned && existing.len() > 1 {
            return Err(BoardError::UnversionedWrite {
                name: name.to_string(),
                versions: existing.len(),
            });
        }

        let created: DateTime<Utc> = request.created.unwrap_or_else(Utc::now).trunc_subsecs(0);
        let version = VersionMeta::new(created, &hash);
        let dir = self.root.join(name).join(&version.version);
        if dir.exists() {
            return Err(BoardError::VersionExists {
                name: name.to_string(),
                version: version.version,
            });
        }
        fs::create_dir_all(&dir).map_err(|e| BoardError::io(&dir, e))?;

        let mut file_names = Vec::with_capacity(paths.len());
        for path in paths {
            let file_name = path
                .file_name()
                .ok_or_else(|| BoardError::io(path, std::io::ErrorKind::InvalidInput.into()))?;
            let target = dir.join(file_name);
            fs::copy(path, &target).map_err(|e| BoardError::io(&target, e))?;
            file_names.push(file_name.to_string_lossy().into_owned());
        }

        let meta = Meta {
            title: request.title.clone().unwrap_or(default_title),
            description: request.description.clone(),
            created: created.format(CREATED_FORMAT).to_string(),
            pin_hash: hash,
            file: PinFile::from_names(file_names),
            file_size,
            pin_type: pin_type.to_string(),
            api_version: META_API_VERSION,
            user: request.metadata.clone().unwrap_or_default(),
            name: name.to_string(),
            version,
        };
        let record = dir.join(META_FILE);
        let json = serde_json::to_string_pretty(&meta).map_err(|e| BoardError::Metadata {
            path: record.clone(),
            source: e,
        })?;
        fs::write(&record, json).map_err(|e| BoardError::io(&record, e))?;
        info!(
            "Wrote version '{}' of pin '{name}' ({pin_type}, {file_size} bytes)",
            meta.version.version
        );

        if !versioned {
            for old in existing {
                self.pin_version_delete(name, &old.version)?;
            }
        }

        Ok(meta)
    }
}

impl PinStorage for FolderBoard {
    fn pin_exists(&self, name: &str) -> Result<bool, BoardError> {
        self.validate_pin_name(name)?;
        Ok(self.root.join(name).is_dir())
    }

    fn pin_versions(&self, name: &str) -> Result<Vec<VersionMeta>, BoardError> {
        let dir = self.pin_dir(name)?;
        let mut versions: Vec<VersionMeta> = subdirectories(&dir)?
            .iter()
            .filter(|version| dir.join(version).join(META_FILE).is_file())
            .filter_map(|version| VersionMeta::parse(version))
            .collect();
        versions.sort_by(|a, b| a.version.cmp(&b.version));
        Ok(versions)
    }

    fn pin_fetch(&self, name: &str, version: Option<&str>) -> Result<Meta, BoardError> {
        let version = match version {
            Some(version) => VersionMeta::parse(version).ok_or_else(|| {
                BoardError::VersionNotFound {
                    name: name.to_string(),
                    version: version.to_string(),
                }
            })?,
            None => self.latest_version(name)?,
        };
        let record = self.version_dir(name, &version.version)?.join(META_FILE);
        debug!("Fetching metadata from {}", record.display());

        let text = fs::read_to_string(&record).map_err(|e| BoardError::io(&record, e))?;
        let mut meta: Meta = serde_json::from_str(&text).map_err(|e| BoardError::Metadata {
            path: record.clone(),
            source: e,
        })?;
        meta.name = name.to_string();
        meta.version = version;
        Ok(meta)
    }

    fn pin_download(
        &self,
        name: &str,
        version: Option<&str>,
        hash: Option<&str>,
    ) -> Result<Vec<PathBuf>, BoardError> {
        let meta = self.pin_fetch(name, version)?;
        if let Some(expected) = hash.filter(|expected| *expected != meta.pin_hash) {
            return Err(BoardError::HashMismatch {
                expected: expected.to_string(),
                actual: meta.pin_hash,
            });
        }

        let paths = meta
            .file
            .names()
            .into_iter()
            .map(|file| self.construct_path(&[name, meta.version.version.as_str(), file]))
            .collect();
        Ok(paths)
    }

    fn pin_upload(&self, paths: &[PathBuf], request: &UploadRequest) -> Result<Meta, BoardError> {
        let default_title = match paths.len() {
            1 => format!("{}: a pinned file", request.name),
            n => format!("{}: {n} pinned files", request.name),
        };
        self.store(NewVersion {
            paths,
            request,
            pin_type: FILE_TYPE,
            default_title,
        })
    }

    fn construct_path(&self, elements: &[&str]) -> PathBuf {
        elements
            .iter()
            .fold(self.root.clone(), |path, element| path.join(element))
    }
}

impl Board for FolderBoard {
    type Value = PinData;
    type Error = BoardError;

    fn pin_read(
        &self,
        name: &str,
        version: Option<&str>,
        hash: Option<&str>,
    ) -> Result<PinData, BoardError> {
        let meta = self.pin_fetch(name, version)?;
        if meta.pin_type == FILE_TYPE {
            return Err(BoardError::FileTypePin {
                name: name.to_string(),
            });
        }

        let paths = self.pin_download(name, Some(meta.version.version.as_str()), hash)?;
        let [path] = paths.as_slice() else {
            return Err(BoardError::FileCount {
                actual: paths.len(),
            });
        };
        debug!("Reading pin '{name}' as {}", meta.pin_type);
        read_value(path, &meta.pin_type)
    }

    fn pin_write(&self, value: &PinData, options: &PinWriteOptions) -> Result<Meta, BoardError> {
        let pin_type = options
            .pin_type
            .as_deref()
            .unwrap_or_else(|| default_type(value));
        check_writable(value, pin_type)?;
        self.validate_pin_name(&options.name)?;

        let temp_dir = tempfile::tempdir().map_err(|e| BoardError::io(std::env::temp_dir(), e))?;
        let path = temp_dir.path().join(format!("{}.{pin_type}", options.name));
        write_value(&path, value, pin_type)?;

        self.store(NewVersion {
            paths: std::slice::from_ref(&path),
            request: &UploadRequest::from(options),
            pin_type,
            default_title: default_title(&options.name, value),
        })
    }
}

fn subdirectories(dir: &Path) -> Result<Vec<String>, BoardError> {
    let entries = fs::read_dir(dir).map_err(|e| BoardError::io(dir, e))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| BoardError::io(dir, e))?;
        if entry.path().is_dir() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    Ok(names)
}
