//! Whole-file content hashing for deduplication
//!
//! xxHash-32 over the full byte stream, order-sensitive. Two files with
//! an equal hash are treated as identical content; a changed hash means
//! the file must be re-imported. Explicitly not a security primitive.

use crate::error::{Error, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use xxhash_rust::xxh32::{xxh32, Xxh32};

const HASH_SEED: u32 = 0;
const READ_CHUNK_SIZE: usize = 1024 * 1024;

/// Streaming xxHash-32 state.
///
/// Instances share nothing; hashing independent files concurrently is
/// safe.
pub struct ContentHasher {
    state: Xxh32,
}

impl ContentHasher {
    pub fn new() -> Self {
        Self {
            state: Xxh32::new(HASH_SEED),
        }
    }

    /// Fold the next chunk of the stream into the hash.
    pub fn update(&mut self, bytes: &[u8]) {
        self.state.update(bytes);
    }

    /// Finish and return the 32-bit hash of everything fed so far.
    pub fn finish(&self) -> u32 {
        self.state.digest()
    }
}

impl Default for ContentHasher {
    fn default() -> Self {
        Self::new()
    }
}

/// One-shot hash of an in-memory buffer.
pub fn hash_bytes(bytes: &[u8]) -> u32 {
    xxh32(bytes, HASH_SEED)
}

/// Hash a file's full content.
///
/// Reads in 1 MiB chunks on a blocking task; I/O errors propagate to
/// the caller, which decides retry/skip policy.
pub async fn hash_file(path: &Path) -> Result<u32> {
    let path = path.to_path_buf();
    tracing::debug!(path = %path.display(), "hashing file content");

    let hash = tokio::task::spawn_blocking(move || -> Result<u32> {
        let mut file = File::open(&path)?;
        let mut hasher = ContentHasher::new();
        let mut buffer = vec![0u8; READ_CHUNK_SIZE];

        loop {
            let bytes_read = file.read(&mut buffer)?;
            if bytes_read == 0 {
                break;
            }
            hasher.update(&buffer[..bytes_read]);
        }

        Ok(hasher.finish())
    })
    .await
    .map_err(|e| Error::Other(anyhow::anyhow!("hashing task failed: {e}")))??;

    Ok(hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn streaming_matches_one_shot() {
        let data = b"the quick brown fox jumps over the lazy dog";

        let mut hasher = ContentHasher::new();
        hasher.update(&data[..7]);
        hasher.update(&data[7..7]);
        hasher.update(&data[7..]);

        assert_eq!(hasher.finish(), hash_bytes(data));
    }

    #[test]
    fn hash_is_order_sensitive() {
        assert_ne!(hash_bytes(b"ab"), hash_bytes(b"ba"));
        assert_ne!(hash_bytes(b""), hash_bytes(b"\0"));
    }

    #[test]
    fn equal_content_hashes_equal() {
        assert_eq!(hash_bytes(b"same bytes"), hash_bytes(b"same bytes"));
    }
}
