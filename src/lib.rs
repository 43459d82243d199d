//! Audio digestion and content identity for the muzik library importer.
//!
//! Two independent subsystems live here:
//!
//! - [`waveform`] — streams raw decoded PCM through a fixed set of time
//!   buckets and produces a compact, normalized overview waveform encoded
//!   as a versioned binary blob. The [`waveform::WaveformWorker`] actor
//!   wraps the whole path behind a request/response channel so one task
//!   owns the accumulation state per audio source.
//! - [`fingerprint`] — content identity used during import: a streaming
//!   xxHash-32 of whole-file bytes for deduplication and change
//!   detection, and a perceptual hash (plus average colour) of embedded
//!   cover art for near-duplicate artwork detection.
//!
//! Decoding, scanning, persistence and UI are collaborators of this
//! crate, not part of it.

pub mod error;
pub mod fingerprint;
pub mod waveform;

pub use crate::error::{Error, Result};
