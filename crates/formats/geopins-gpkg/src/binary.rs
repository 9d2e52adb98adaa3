//! GeoPackage geometry blob header.
//!
//! Layout: magic `GP`, version byte, flags byte, `srs_id` (i32 in the byte
//! order given by flag bit 0), an optional envelope, then standard WKB.

use geopins_core_common::{CodecError, CodecResult};

const MAGIC: &[u8; 2] = b"GP";
const VERSION: u8 = 0;
const FLAG_LITTLE_ENDIAN: u8 = 0b0000_0001;
const ENVELOPE_MASK: u8 = 0b0000_1110;

/// Envelope byte sizes indexed by the envelope contents indicator.
const ENVELOPE_SIZES: [usize; 5] = [0, 32, 48, 48, 64];

/// Wraps WKB bytes in a GeoPackage blob without an envelope.
#[must_use]
pub fn encode_geometry(wkb: &[u8], srs_id: i32) -> Vec<u8> {
    let mut blob = Vec::with_capacity(8 + wkb.len());
    blob.extend_from_slice(MAGIC);
    blob.push(VERSION);
    blob.push(FLAG_LITTLE_ENDIAN);
    blob.extend_from_slice(&srs_id.to_le_bytes());
    blob.extend_from_slice(wkb);
    blob
}

/// A decoded GeoPackage blob.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeometryBlob<'a> {
    /// SRS id recorded in the header
    pub srs_id: i32,
    /// WKB payload
    pub wkb: &'a [u8],
}

/// Splits a GeoPackage blob into its header fields and WKB payload.
///
/// # Errors
///
/// Returns [`CodecError::InvalidData`] if the magic, version or envelope
/// indicator is invalid or the blob is shorter than its header.
pub fn decode_geometry(blob: &[u8]) -> CodecResult<GeometryBlob<'_>> {
    let invalid = |message: String| CodecError::InvalidData {
        format: "GeoPackage".to_string(),
        message,
    };

    if blob.len() < 8 || &blob[..2] != MAGIC {
        return Err(invalid("geometry blob does not start with 'GP'".to_string()));
    }
    if blob[2] != VERSION {
        return Err(invalid(format!("unsupported geometry blob version {}", blob[2])));
    }

    let flags = blob[3];
    let indicator = usize::from((flags & ENVELOPE_MASK) >> 1);
    let envelope = *ENVELOPE_SIZES
        .get(indicator)
        .ok_or_else(|| invalid(format!("invalid envelope indicator {indicator}")))?;

    let srs_bytes = [blob[4], blob[5], blob[6], blob[7]];
    let srs_id = if flags & FLAG_LITTLE_ENDIAN == 0 {
        i32::from_be_bytes(srs_bytes)
    } else {
        i32::from_le_bytes(srs_bytes)
    };

    let header = 8 + envelope;
    let wkb = blob
        .get(header..)
        .ok_or_else(|| invalid(format!("geometry blob shorter than its {header} byte header")))?;

    Ok(GeometryBlob { srs_id, wkb })
}

#[cfg(test)]
mod tests {
    use super::*;

    const POINT_WKB: [u8; 21] = [
        1, 1, 0, 0, 0, // little endian point
        0, 0, 0, 0, 0, 0, 0xf0, 0x3f, // x = 1.0
        0, 0, 0, 0, 0, 0, 0, 0x40, // y = 2.0
    ];

    #[test]
    fn test_header_layout() {
        let blob = encode_geometry(&POINT_WKB, 4326);
        assert_eq!(&blob[..4], &[b'G', b'P', 0, 1]);
        assert_eq!(&blob[4..8], &4326_i32.to_le_bytes());

        let decoded = decode_geometry(&blob).unwrap();
        assert_eq!(decoded.srs_id, 4326);
        assert_eq!(decoded.wkb, &POINT_WKB);
    }

    #[test]
    fn test_big_endian_with_envelope() {
        let mut blob = vec![b'G', b'P', 0, 0b0000_0010];
        blob.extend_from_slice(&2193_i32.to_be_bytes());
        blob.extend_from_slice(&[0_u8; 32]);
        blob.extend_from_slice(&POINT_WKB);

        let decoded = decode_geometry(&blob).unwrap();
        assert_eq!(decoded.srs_id, 2193);
        assert_eq!(decoded.wkb, &POINT_WKB);
    }

    #[test]
    fn test_rejects_invalid_blobs() {
        assert!(decode_geometry(b"XY\0\x01\0\0\0\0").is_err());
        assert!(decode_geometry(b"GP").is_err());
        assert!(decode_geometry(&[b'G', b'P', 0, 0b0000_1010, 0, 0, 0, 0]).is_err());
        // envelope indicator 1 but no envelope bytes
        assert!(decode_geometry(&[b'G', b'P', 0, 0b0000_0011, 0, 0, 0, 0]).is_err());
    }
}
