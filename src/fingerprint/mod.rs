//! Content identity for library import
//!
//! Two fingerprints are taken while importing a file: a fast
//! non-cryptographic [`content`] hash of the whole file's bytes, used as
//! the dedup/change-detection key, and a perceptual [`artwork`] hash of
//! embedded cover art for near-duplicate artwork detection. Both are
//! pure values compared bitwise; similarity policy (thresholds, Hamming
//! cutoffs) belongs to the caller.

pub mod artwork;
pub mod content;

pub use artwork::{average_colour, fingerprint, Rgb};
pub use content::{hash_bytes, hash_file, ContentHasher};
