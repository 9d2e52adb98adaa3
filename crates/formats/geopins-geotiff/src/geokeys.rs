//! GeoKey directory encoding.
//!
//! The directory is a flat `u16` array: a header `[version, revision,
//! minor_revision, key_count]` followed by `key_count` entries of
//! `[key_id, tag_location, count, value]`. Only keys stored inline
//! (`tag_location == 0`) are interpreted.

use geopins_core_common::{CodecError, CodecResult, Crs};

const GT_MODEL_TYPE: u16 = 1024;
const GT_RASTER_TYPE: u16 = 1025;
const GEOGRAPHIC_TYPE: u16 = 2048;
const PROJECTED_CS_TYPE: u16 = 3072;

const MODEL_TYPE_PROJECTED: u16 = 1;
const MODEL_TYPE_GEOGRAPHIC: u16 = 2;
const RASTER_PIXEL_IS_AREA: u16 = 1;
const USER_DEFINED: u16 = 32767;

/// Inline GeoKeys of a GeoTIFF.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeoKeyDirectory {
    keys: Vec<(u16, u16)>,
}

impl GeoKeyDirectory {
    /// Keys describing a pixel-is-area raster in the given CRS.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::UnsupportedCrs`] if the EPSG code does not fit a
    /// GeoKey value.
    pub fn for_crs(crs: Option<Crs>) -> CodecResult<Self> {
        let mut keys = Vec::with_capacity(3);
        if let Some(crs) = crs {
            let code = u16::try_from(crs.epsg())
                .ok()
                .filter(|code| *code != USER_DEFINED)
                .ok_or_else(|| CodecError::UnsupportedCrs {
                    crs: crs.to_string(),
                })?;
            if crs.is_geographic() {
                keys.push((GT_MODEL_TYPE, MODEL_TYPE_GEOGRAPHIC));
                keys.push((GEOGRAPHIC_TYPE, code));
            } else {
                keys.push((GT_MODEL_TYPE, MODEL_TYPE_PROJECTED));
                keys.push((PROJECTED_CS_TYPE, code));
            }
        }
        keys.push((GT_RASTER_TYPE, RASTER_PIXEL_IS_AREA));
        keys.sort_unstable();
        Ok(Self { keys })
    }

    /// Parses a `GeoKeyDirectoryTag` value.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::InvalidData`] if the array is shorter than its
    /// header announces.
    pub fn from_tag(values: &[u16]) -> CodecResult<Self> {
        let invalid = |message: String| CodecError::InvalidData {
            format: "GeoTIFF".to_string(),
            message,
        };

        let header = values
            .get(..4)
            .ok_or_else(|| invalid(format!("GeoKey directory has {} values", values.len())))?;
        let count = usize::from(header[3]);
        let entries = values.get(4..4 + count * 4).ok_or_else(|| {
            invalid(format!(
                "GeoKey directory announces {count} keys but has {} values",
                values.len()
            ))
        })?;

        let keys = entries
            .chunks_exact(4)
            .filter(|entry| entry[1] == 0)
            .map(|entry| (entry[0], entry[3]))
            .collect();
        Ok(Self { keys })
    }

    /// Encodes the directory as a `GeoKeyDirectoryTag` value.
    #[must_use]
    pub fn to_tag(&self) -> Vec<u16> {
        let count = u16::try_from(self.keys.len()).unwrap_or(u16::MAX);
        let mut values = vec![1, 1, 0, count];
        for &(key, value) in &self.keys {
            values.extend_from_slice(&[key, 0, 1, value]);
        }
        values
    }

    /// Value of an inline key.
    #[must_use]
    pub fn get(&self, key: u16) -> Option<u16> {
        self.keys.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
    }

    /// The EPSG CRS described by the keys, if any.
    #[must_use]
    pub fn crs(&self) -> Option<Crs> {
        self.get(PROJECTED_CS_TYPE)
            .or_else(|| self.get(GEOGRAPHIC_TYPE))
            .filter(|code| *code != USER_DEFINED)
            .map(|code| Crs::from_epsg(u32::from(code)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_projected_directory() {
        let directory = GeoKeyDirectory::for_crs(Some(Crs::from_epsg(2193))).unwrap();
        assert_eq!(
            directory.to_tag(),
            vec![1, 1, 0, 3, 1024, 0, 1, 1, 1025, 0, 1, 1, 3072, 0, 1, 2193]
        );
        assert_eq!(directory.crs(), Some(Crs::from_epsg(2193)));
    }

    #[test]
    fn test_geographic_directory() {
        let directory = GeoKeyDirectory::for_crs(Some(Crs::WGS84)).unwrap();
        assert_eq!(directory.get(1024), Some(2));
        assert_eq!(directory.get(2048), Some(4326));
        assert_eq!(GeoKeyDirectory::from_tag(&directory.to_tag()).unwrap(), directory);
    }

    #[test]
    fn test_no_crs() {
        let directory = GeoKeyDirectory::for_crs(None).unwrap();
        assert_eq!(directory.to_tag(), vec![1, 1, 0, 1, 1025, 0, 1, 1]);
        assert_eq!(directory.crs(), None);
    }

    #[test]
    fn test_large_code_rejected() {
        let err = GeoKeyDirectory::for_crs(Some(Crs::from_epsg(102_100))).unwrap_err();
        assert!(matches!(err, CodecError::UnsupportedCrs { .. }));
    }

    #[test]
    fn test_truncated_and_user_defined() {
        assert!(GeoKeyDirectory::from_tag(&[1, 1, 0]).is_err());
        assert!(GeoKeyDirectory::from_tag(&[1, 1, 0, 2, 1024, 0, 1, 1]).is_err());

        let directory =
            GeoKeyDirectory::from_tag(&[1, 1, 0, 2, 1024, 0, 1, 1, 3072, 0, 1, 32767]).unwrap();
        assert_eq!(directory.crs(), None);
    }
}
