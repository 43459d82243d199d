//! Versioned binary format for overview waveforms
//!
//! Layout, all integers little-endian:
//!
//! | Offset | Size | Field          |
//! |--------|------|----------------|
//! | 0      | 2    | format version |
//! | 2      | 2    | bucket count   |
//! | 4      | 1    | channel count  |
//! | 5      | n    | samples, one u16 per channel per bucket, bucket-major |
//!
//! The blob is exact: `5 + bucket_count * channel_count * 2` bytes, no
//! padding, no trailing data. Decoding rejects anything else outright
//! rather than guessing.

use crate::error::{Error, Result};

/// Current format version written by [`encode`].
pub const WAVEFORM_BINARY_VERSION: u16 = 1;

const HEADER_SIZE: usize = 5;
const SAMPLE_SIZE: usize = 2;
const SAMPLE_MAX: f64 = 65535.0;

/// A decoded waveform blob.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedWaveform {
    pub version: u16,
    pub bucket_count: u16,
    pub channel_count: u8,
    /// Per-bucket, per-channel values in `[0, 1]`.
    pub buckets: Vec<Vec<f64>>,
}

/// Serialize a digest (per-bucket, per-channel normalized values) into
/// a waveform blob.
///
/// Values are quantized to `round(value * 65535)`. Fails if the digest
/// shape cannot be represented in the header fields.
pub fn encode(buckets: &[Vec<f64>]) -> Result<Vec<u8>> {
    let bucket_count = u16::try_from(buckets.len()).map_err(|_| {
        Error::InvalidDigestShape(format!(
            "{} buckets exceed the u16 header field",
            buckets.len()
        ))
    })?;

    let channel_count = buckets.first().map(Vec::len).unwrap_or(0);
    if channel_count == 0 {
        return Err(Error::InvalidDigestShape(
            "digest has no channels".to_string(),
        ));
    }
    let channel_count = u8::try_from(channel_count).map_err(|_| {
        Error::InvalidDigestShape(format!(
            "{channel_count} channels exceed the u8 header field"
        ))
    })?;

    let mut blob =
        Vec::with_capacity(HEADER_SIZE + buckets.len() * channel_count as usize * SAMPLE_SIZE);
    blob.extend_from_slice(&WAVEFORM_BINARY_VERSION.to_le_bytes());
    blob.extend_from_slice(&bucket_count.to_le_bytes());
    blob.push(channel_count);

    for bucket in buckets {
        if bucket.len() != channel_count as usize {
            return Err(Error::InvalidDigestShape(format!(
                "bucket has {} channels, expected {channel_count}",
                bucket.len()
            )));
        }

        for &value in bucket {
            let quantized = (value * SAMPLE_MAX).round() as u16;
            blob.extend_from_slice(&quantized.to_le_bytes());
        }
    }

    Ok(blob)
}

/// Deserialize a waveform blob.
///
/// Rejects a blob shorter than the header, an unrecognized format
/// version, or a byte length that disagrees with the header. Sample
/// values come back as `raw / 65535`, within `1/65535` of the encoded
/// value.
pub fn decode(blob: &[u8]) -> Result<DecodedWaveform> {
    if blob.len() < HEADER_SIZE {
        return Err(Error::TruncatedHeader { actual: blob.len() });
    }

    let version = u16::from_le_bytes([blob[0], blob[1]]);
    if version != WAVEFORM_BINARY_VERSION {
        return Err(Error::UnsupportedVersion(version));
    }

    let bucket_count = u16::from_le_bytes([blob[2], blob[3]]);
    let channel_count = blob[4];

    let expected = HEADER_SIZE + bucket_count as usize * channel_count as usize * SAMPLE_SIZE;
    if blob.len() != expected {
        return Err(Error::InvalidBlobLength {
            expected,
            actual: blob.len(),
        });
    }

    let mut buckets = Vec::with_capacity(bucket_count as usize);
    let mut offset = HEADER_SIZE;

    for _ in 0..bucket_count {
        let mut channels = Vec::with_capacity(channel_count as usize);
        for _ in 0..channel_count {
            let raw = u16::from_le_bytes([blob[offset], blob[offset + 1]]);
            channels.push(f64::from(raw) / SAMPLE_MAX);
            offset += SAMPLE_SIZE;
        }
        buckets.push(channels);
    }

    Ok(DecodedWaveform {
        version,
        bucket_count,
        channel_count,
        buckets,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encodes_known_blob_bit_exactly() {
        let blob = encode(&[vec![0.0], vec![1.0]]).unwrap();
        assert_eq!(blob, [0x01, 0x00, 0x02, 0x00, 0x01, 0x00, 0x00, 0xff, 0xff]);
    }

    #[test]
    fn round_trip_recovers_header_and_bounded_samples() {
        let digest = vec![
            vec![0.0, 0.25],
            vec![0.5, 0.75],
            vec![1.0, 0.125],
        ];

        let decoded = decode(&encode(&digest).unwrap()).unwrap();
        assert_eq!(decoded.version, WAVEFORM_BINARY_VERSION);
        assert_eq!(decoded.bucket_count, 3);
        assert_eq!(decoded.channel_count, 2);

        for (bucket, original) in decoded.buckets.iter().zip(&digest) {
            for (&value, &expected) in bucket.iter().zip(original) {
                assert!((value - expected).abs() <= 1.0 / 65535.0);
            }
        }
    }

    #[test]
    fn quantization_rounds_to_nearest() {
        // 0.5 * 65535 = 32767.5 rounds up to 32768.
        let blob = encode(&[vec![0.5]]).unwrap();
        assert_eq!(&blob[5..], &32768u16.to_le_bytes());
    }

    #[test]
    fn rejects_wrong_length() {
        let mut blob = encode(&[vec![0.5], vec![0.25]]).unwrap();
        blob.push(0);

        match decode(&blob) {
            Err(Error::InvalidBlobLength { expected, actual }) => {
                assert_eq!(expected, 9);
                assert_eq!(actual, 10);
            }
            other => panic!("expected length error, got {other:?}"),
        }

        assert!(matches!(
            decode(&[0x01, 0x00]),
            Err(Error::TruncatedHeader { actual: 2 })
        ));
    }

    #[test]
    fn rejects_unknown_version() {
        let mut blob = encode(&[vec![0.5]]).unwrap();
        blob[0] = 0x7f;

        assert!(matches!(
            decode(&blob),
            Err(Error::UnsupportedVersion(0x7f))
        ));
    }

    #[test]
    fn rejects_unrepresentable_digests() {
        assert!(matches!(encode(&[]), Err(Error::InvalidDigestShape(_))));
        assert!(matches!(
            encode(&[vec![]]),
            Err(Error::InvalidDigestShape(_))
        ));
        assert!(matches!(
            encode(&[vec![0.1; 256]]),
            Err(Error::InvalidDigestShape(_))
        ));
        assert!(matches!(
            encode(&[vec![0.1, 0.2], vec![0.3]]),
            Err(Error::InvalidDigestShape(_))
        ));
    }
}
