//! Waveform digestion worker
//!
//! One worker task owns one [`WaveformBucketCalculator`] for the
//! lifetime of a single audio source. The caller streams raw sample
//! chunks in as requests and gets a freshly encoded waveform blob back
//! for every request, payload or not, which makes progressive previews
//! free: send chunks as the decoder produces them and render each
//! response, then send one final empty request for the finished blob.
//!
//! Message handling is strictly sequential: one request is fully
//! processed (update, digest, encode, respond) before the next is read,
//! so the worker needs no locking. Requests and responses are correlated
//! only by the caller-supplied id; the worker issues exactly one
//! response per request and never a partial one. Multiple workers run as
//! independent tasks sharing no state.
//!
//! There is no cancellation primitive. A caller abandoning a source
//! drops the handle (or calls [`WaveformWorker::shutdown`]); in-flight
//! requests run to completion and their responses are discarded.

use crate::error::{Error, Result};
use crate::waveform::binary;
use crate::waveform::buckets::WaveformBucketCalculator;
use crate::waveform::reader::U16LeReader;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Default number of display buckets for an overview waveform.
pub const DEFAULT_BUCKET_COUNT: u16 = 1024;

const CHANNEL_CAPACITY: usize = 32;

/// Fixed per-source configuration a worker is started with.
#[derive(Debug, Clone, Copy)]
pub struct WaveformWorkerConfig {
    /// Total frame count of the source, from the decoder's probe.
    pub frame_count: u64,
    /// Interleaved channel count of the source.
    pub channel_count: u8,
    /// Number of display buckets to digest into.
    pub bucket_count: u16,
}

impl WaveformWorkerConfig {
    pub fn new(frame_count: u64, channel_count: u8) -> Self {
        Self {
            frame_count,
            channel_count,
            bucket_count: DEFAULT_BUCKET_COUNT,
        }
    }

    pub fn with_bucket_count(mut self, bucket_count: u16) -> Self {
        self.bucket_count = bucket_count;
        self
    }

    /// A worker must not start without a usable frame and channel count.
    fn validate(&self) -> Result<()> {
        if self.frame_count == 0 {
            return Err(Error::Config("frame count must be non-zero".to_string()));
        }
        if self.channel_count == 0 {
            return Err(Error::Config("channel count must be non-zero".to_string()));
        }
        if self.bucket_count == 0 {
            return Err(Error::Config("bucket count must be non-zero".to_string()));
        }
        Ok(())
    }
}

/// Request message: a correlation id and an optional chunk of raw
/// samples to fold in before digesting.
#[derive(Debug)]
pub struct WaveformRequest {
    pub id: Uuid,
    pub buffer: Option<Vec<u8>>,
}

/// Response message: the request's id and the encoded waveform blob.
#[derive(Debug)]
pub struct WaveformResponse {
    pub id: Uuid,
    pub buffer: Vec<u8>,
}

/// Handle to a spawned waveform digestion worker.
///
/// Buffers are transferred by ownership in both directions; nothing is
/// copied across the channel boundary.
pub struct WaveformWorker {
    request_tx: mpsc::Sender<WaveformRequest>,
    response_rx: mpsc::Receiver<WaveformResponse>,
    handle: JoinHandle<()>,
}

impl WaveformWorker {
    /// Validate `config` and spawn the worker task.
    ///
    /// A degenerate configuration is a fatal startup error: the task is
    /// never spawned.
    pub fn spawn(config: WaveformWorkerConfig) -> Result<Self> {
        config.validate()?;

        let (request_tx, request_rx) = mpsc::channel(CHANNEL_CAPACITY);
        let (response_tx, response_rx) = mpsc::channel(CHANNEL_CAPACITY);

        let handle = tokio::spawn(worker_loop(config, request_rx, response_tx));

        Ok(Self {
            request_tx,
            response_rx,
            handle,
        })
    }

    /// Submit a request. The caller is responsible for id uniqueness
    /// among its in-flight requests.
    pub async fn send(&self, request: WaveformRequest) -> Result<()> {
        self.request_tx
            .send(request)
            .await
            .map_err(|_| Error::WorkerStopped)
    }

    /// Receive the next response, in request order. `None` means the
    /// worker has stopped.
    pub async fn recv(&mut self) -> Option<WaveformResponse> {
        self.response_rx.recv().await
    }

    /// Submit one request under a fresh id and wait for its response.
    ///
    /// Responses to earlier fire-and-forget [`send`](Self::send)s that
    /// are still queued get discarded on the way to the matching one, so
    /// do not interleave `request` with manual `recv` bookkeeping.
    pub async fn request(&mut self, buffer: Option<Vec<u8>>) -> Result<Vec<u8>> {
        let id = Uuid::new_v4();
        self.send(WaveformRequest { id, buffer }).await?;

        loop {
            let response = self.recv().await.ok_or(Error::WorkerStopped)?;
            if response.id == id {
                return Ok(response.buffer);
            }
            debug!(id = %response.id, "discarding unmatched waveform response");
        }
    }

    /// Close the request channel and wait for the worker to drain and
    /// exit.
    pub async fn shutdown(self) {
        let Self {
            request_tx,
            response_rx,
            handle,
        } = self;

        drop(request_tx);
        drop(response_rx);

        if let Err(e) = handle.await {
            error!("waveform worker task failed: {e}");
        }
    }
}

async fn worker_loop(
    config: WaveformWorkerConfig,
    mut request_rx: mpsc::Receiver<WaveformRequest>,
    response_tx: mpsc::Sender<WaveformResponse>,
) {
    let mut calculator = WaveformBucketCalculator::new(
        U16LeReader::new(),
        config.bucket_count as usize,
        config.channel_count as usize,
        config.frame_count,
    );

    info!(
        frame_count = config.frame_count,
        channel_count = config.channel_count,
        bucket_count = config.bucket_count,
        "waveform worker started"
    );

    while let Some(WaveformRequest { id, buffer }) = request_rx.recv().await {
        if let Some(buffer) = buffer {
            calculator.update(&buffer);
        }

        let encoded = match binary::encode(&calculator.digest()) {
            Ok(blob) => blob,
            Err(e) => {
                // Unreachable with a validated config; bail rather than
                // answer with a partial response.
                error!(%id, "failed to encode waveform digest: {e}");
                break;
            }
        };

        if response_tx
            .send(WaveformResponse {
                id,
                buffer: encoded,
            })
            .await
            .is_err()
        {
            debug!("response channel closed, stopping waveform worker");
            break;
        }
    }

    info!("waveform worker stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_degenerate_configs() {
        let missing_frames = WaveformWorkerConfig::new(0, 2);
        let missing_channels = WaveformWorkerConfig::new(100, 0);
        let no_buckets = WaveformWorkerConfig::new(100, 2).with_bucket_count(0);

        for config in [missing_frames, missing_channels, no_buckets] {
            assert!(matches!(config.validate(), Err(Error::Config(_))));
        }
    }

    #[test]
    fn default_bucket_count_applies() {
        let config = WaveformWorkerConfig::new(100, 2);
        assert_eq!(config.bucket_count, DEFAULT_BUCKET_COUNT);
        assert!(config.validate().is_ok());
    }
}
