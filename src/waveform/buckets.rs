//! Streaming bucket accumulation and RMS digestion
//!
//! One [`WaveformBucketCalculator`] is created per audio source with a
//! fixed bucket count, channel count and total frame count. Sample
//! batches are folded in with [`update`](WaveformBucketCalculator::update)
//! in stream order; [`digest`](WaveformBucketCalculator::digest) takes a
//! normalized snapshot of whatever has been accumulated so far without
//! mutating anything, so it can be called repeatedly for progressive
//! previews and once more for the final result.

use crate::waveform::reader::SampleReader;

/// One time bucket: running sum of squares per channel, plus the number
/// of frames folded in so far.
struct Bucket {
    channel_sums: Vec<f64>,
    frame_count: u64,
}

/// Streaming accumulator folding sample batches into fixed time buckets.
pub struct WaveformBucketCalculator<R: SampleReader> {
    reader: R,
    channel_count: usize,
    frames_per_bucket: u64,
    buckets: Vec<Bucket>,
    current_sample_offset: u64,
}

impl<R: SampleReader> WaveformBucketCalculator<R> {
    /// Create a calculator for a source with `frame_count` total frames
    /// of `channel_count` interleaved channels, digested into
    /// `bucket_count` buckets.
    ///
    /// Remainder frames (when `frame_count` is not divisible by
    /// `bucket_count`) land in the last bucket.
    pub fn new(reader: R, bucket_count: usize, channel_count: usize, frame_count: u64) -> Self {
        let frames_per_bucket = frame_count / bucket_count as u64;

        tracing::debug!(
            bucket_count,
            channel_count,
            frame_count,
            frames_per_bucket,
            "creating waveform bucket calculator"
        );

        let buckets = (0..bucket_count)
            .map(|_| Bucket {
                channel_sums: vec![0.0; channel_count],
                frame_count: 0,
            })
            .collect();

        Self {
            reader,
            channel_count,
            frames_per_bucket,
            buckets,
            current_sample_offset: 0,
        }
    }

    /// Fold one batch of raw samples into the buckets.
    ///
    /// Batches must be supplied in stream order; a zero-length batch is
    /// a no-op. State is never reset, so successive calls continue where
    /// the previous batch left off.
    pub fn update(&mut self, data: &[u8]) {
        let sample_count = self.reader.sample_count(data);

        for sample_index in 0..sample_count {
            let value = self.reader.read(data, sample_index);
            self.accumulate(self.current_sample_offset + sample_index as u64, value);
        }

        self.current_sample_offset += sample_count as u64;
    }

    fn accumulate(&mut self, global_index: u64, value: f64) {
        let frame_index = global_index / self.channel_count as u64;
        let channel = (global_index % self.channel_count as u64) as usize;

        // frames_per_bucket is 0 when the source has fewer frames than
        // buckets; everything then collapses into the last bucket.
        let bucket_index = if self.frames_per_bucket == 0 {
            self.buckets.len() - 1
        } else {
            ((frame_index / self.frames_per_bucket) as usize).min(self.buckets.len() - 1)
        };

        let bucket = &mut self.buckets[bucket_index];

        // Count each frame exactly once, on its first channel.
        if channel == 0 {
            bucket.frame_count += 1;
        }

        bucket.channel_sums[channel] += value * value;
    }

    /// Snapshot the accumulated state as per-bucket, per-channel values
    /// normalized to `[0, 1]`.
    ///
    /// Per channel, the RMS values of all buckets are rescaled against
    /// the channel's min/max, where the min is taken over non-zero RMS
    /// values only so silent buckets do not distort the dynamic range.
    /// A silent bucket stays `0`; a channel with no dynamic range
    /// (`min == max`) collapses to all zeros.
    pub fn digest(&self) -> Vec<Vec<f64>> {
        let rms_values: Vec<Vec<f64>> = self
            .buckets
            .iter()
            .map(|bucket| {
                bucket
                    .channel_sums
                    .iter()
                    .map(|&channel_sum| {
                        if bucket.frame_count == 0 {
                            0.0
                        } else {
                            (channel_sum / bucket.frame_count as f64).sqrt()
                        }
                    })
                    .collect()
            })
            .collect();

        let channel_ranges: Vec<(f64, f64)> = (0..self.channel_count)
            .map(|channel| {
                let mut min = f64::INFINITY;
                let mut max = 0.0f64;

                for bucket in &rms_values {
                    let value = bucket[channel];
                    if value != 0.0 && value < min {
                        min = value;
                    }
                    if value > max {
                        max = value;
                    }
                }

                if min.is_infinite() {
                    min = 0.0;
                }

                (min, max)
            })
            .collect();

        rms_values
            .iter()
            .map(|bucket| {
                bucket
                    .iter()
                    .enumerate()
                    .map(|(channel, &value)| {
                        if value == 0.0 {
                            return 0.0;
                        }
                        let (min, max) = channel_ranges[channel];
                        if min == max {
                            return 0.0;
                        }
                        (value - min) / (max - min)
                    })
                    .collect()
            })
            .collect()
    }
}
