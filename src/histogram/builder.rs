use super::buffer::{Channel, PixelBuffer, BUCKET_COUNT, CHANNEL_COUNT};
use super::sampler::{self, channel_samples};
use crate::errors::Result;
use rayon::prelude::*;

type Buckets = [[u32; BUCKET_COUNT]; CHANNEL_COUNT];

/// Bucket counts for red, green and blue plus the largest count across all of them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelHistogram {
    buckets: Buckets,
    global_max: u32,
}

impl ChannelHistogram {
    /// Histogram of an image with no pixels: nothing to draw.
    pub fn empty() -> Self {
        Self {
            buckets: [[0; BUCKET_COUNT]; CHANNEL_COUNT],
            global_max: 0,
        }
    }

    pub fn from_buckets(buckets: Buckets) -> Self {
        let global_max = buckets.iter().flatten().copied().max().unwrap_or(0);
        Self { buckets, global_max }
    }

    pub fn buckets(&self, channel: Channel) -> &[u32; BUCKET_COUNT] {
        &self.buckets[channel.index()]
    }

    pub fn global_max(&self) -> u32 {
        self.global_max
    }

    /// Number of pixels counted for the channel.
    pub fn channel_total(&self, channel: Channel) -> u64 {
        self.buckets(channel).iter().map(|&c| c as u64).sum()
    }

    pub fn channel_max(&self, channel: Channel) -> u32 {
        self.buckets(channel).iter().copied().max().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.global_max == 0
    }
}

impl Default for ChannelHistogram {
    fn default() -> Self {
        Self::empty()
    }
}

fn count_pixels(data: &[u8]) -> Buckets {
    let mut buckets = [[0u32; BUCKET_COUNT]; CHANNEL_COUNT];
    for (channel_buckets, channel) in buckets.iter_mut().zip(Channel::ALL) {
        for value in channel_samples(data, channel) {
            channel_buckets[value as usize] += 1;
        }
    }
    buckets
}

fn merge(mut into: Buckets, from: Buckets) -> Buckets {
    for (into_channel, from_channel) in into.iter_mut().zip(from.iter()) {
        for (a, b) in into_channel.iter_mut().zip(from_channel.iter()) {
            *a += b;
        }
    }
    into
}

/// Counts every pixel of every channel into fresh bucket arrays.
pub fn build(buffer: &PixelBuffer) -> Result<ChannelHistogram> {
    let samples = sampler::sample_all(buffer)?;

    let mut buckets = [[0u32; BUCKET_COUNT]; CHANNEL_COUNT];
    for (channel_buckets, values) in buckets.iter_mut().zip(samples) {
        for value in values {
            channel_buckets[value as usize] += 1;
        }
    }

    let histogram = ChannelHistogram::from_buckets(buckets);
    tracing::debug!(
        width = buffer.width(),
        height = buffer.height(),
        global_max = histogram.global_max(),
        "histogram built"
    );
    Ok(histogram)
}

/// Like [`build`], but an unusable image yields the empty histogram.
pub fn build_or_empty(buffer: &PixelBuffer) -> ChannelHistogram {
    match build(buffer) {
        Ok(histogram) => histogram,
        Err(e) => {
            e.log_and_report();
            ChannelHistogram::empty()
        }
    }
}

/// Builds the histogram from horizontal tiles in parallel.
///
/// Every tile counts into its own arrays and the partial results are summed,
/// so the output is identical to [`build`].
pub fn build_parallel(buffer: &PixelBuffer, num_tiles: usize) -> Result<ChannelHistogram> {
    sampler::sample_all(buffer)?;

    let height = buffer.height();
    let tiles = num_tiles.clamp(1, height as usize) as u32;
    let tile_height = height / tiles;

    let buckets = (0..tiles)
        .into_par_iter()
        .map(|i| {
            let start_y = i * tile_height;
            let end_y = if i == tiles - 1 { height } else { (i + 1) * tile_height };
            count_pixels(buffer.rows(start_y, end_y))
        })
        .reduce(|| [[0u32; BUCKET_COUNT]; CHANNEL_COUNT], merge);

    let histogram = ChannelHistogram::from_buckets(buckets);
    tracing::debug!(
        width = buffer.width(),
        height,
        tiles,
        global_max = histogram.global_max(),
        "histogram built in parallel"
    );
    Ok(histogram)
}

/// Adaptive tile count based on image size
pub fn optimal_tile_count(width: u32, height: u32) -> usize {
    let total_pixels = width as u64 * height as u64;
    let min_tiles = 2;
    let max_tiles = num_cpus::get().max(min_tiles);

    if total_pixels < 1_000_000 {
        min_tiles
    } else if total_pixels < 10_000_000 {
        (max_tiles / 2).max(min_tiles)
    } else {
        max_tiles
    }
}
