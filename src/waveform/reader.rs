//! Pluggable sample decoding for raw PCM batches
//!
//! The bucket calculator is generic over a [`SampleReader`] so that new
//! sample encodings can be added without touching the accumulation
//! logic. Readers are stateless and reentrant; the same reader value may
//! serve any number of batches or calculators.

/// Extracts normalized sample values from an opaque raw-sample buffer.
pub trait SampleReader {
    /// Read the sample at `sample_index`, normalized to `[0, 1]`.
    ///
    /// `sample_index` is a logical, zero-based sample index, not a byte
    /// offset. An index that maps at or beyond the last whole sample in
    /// `data` reads as `0.0` rather than an error, so a short final
    /// batch never aborts digestion.
    fn read(&self, data: &[u8], sample_index: usize) -> f64;

    /// Number of whole samples representable in `data`.
    fn sample_count(&self, data: &[u8]) -> usize;
}

const SAMPLE_SIZE: usize = 2;
const MAX_VALUE: f64 = 65535.0;

/// Reader for unsigned 16-bit little-endian PCM, normalized by `1/65535`.
///
/// This is the encoding the external decoder process emits (`-f u16le`).
#[derive(Debug, Clone, Copy, Default)]
pub struct U16LeReader {
    start_offset: usize,
}

impl U16LeReader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reader that begins decoding at `start_offset` bytes into each
    /// buffer, for containers that prefix batches with a fixed header.
    pub fn with_offset(start_offset: usize) -> Self {
        Self { start_offset }
    }
}

impl SampleReader for U16LeReader {
    fn read(&self, data: &[u8], sample_index: usize) -> f64 {
        let byte_offset = self.start_offset + sample_index * SAMPLE_SIZE;
        if byte_offset + SAMPLE_SIZE > data.len() {
            return 0.0;
        }

        let raw = u16::from_le_bytes([data[byte_offset], data[byte_offset + 1]]);
        f64::from(raw) / MAX_VALUE
    }

    fn sample_count(&self, data: &[u8]) -> usize {
        data.len() / SAMPLE_SIZE
    }
}
