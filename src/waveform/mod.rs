//! Overview waveform digestion
//!
//! Raw decoded PCM arrives in arbitrary-sized batches and is folded into
//! a fixed number of time buckets, one running sum of squares per channel
//! per bucket. A digest snapshot normalizes the per-bucket RMS values to
//! `[0, 1]` per channel and can be taken at any point while samples are
//! still streaming in, so callers can render progressively refined
//! previews. Snapshots are serialized with the versioned binary format in
//! [`binary`].
//!
//! The pieces compose bottom-up:
//!
//! - [`reader::SampleReader`] abstracts the PCM sample encoding
//! - [`buckets::WaveformBucketCalculator`] accumulates and digests
//! - [`binary`] encodes/decodes the wire blob
//! - [`worker::WaveformWorker`] owns one calculator behind a
//!   request/response channel pair

pub mod binary;
pub mod buckets;
pub mod reader;
pub mod worker;

pub use binary::{decode, encode, DecodedWaveform, WAVEFORM_BINARY_VERSION};
pub use buckets::WaveformBucketCalculator;
pub use reader::{SampleReader, U16LeReader};
pub use worker::{
    WaveformRequest, WaveformResponse, WaveformWorker, WaveformWorkerConfig,
    DEFAULT_BUCKET_COUNT,
};
