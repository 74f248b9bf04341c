use super::buffer::{Channel, BUCKET_COUNT};
use super::builder::ChannelHistogram;
use crate::errors::{HistogramError, Result};
use serde::{Deserialize, Serialize};
use std::ops::Range;

pub const DEFAULT_COMPARTMENT_COUNT: usize = 4;

/// A contiguous run of buckets and the statistics derived from it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Compartment {
    pub index: usize,
    /// First bucket, inclusive.
    pub start: usize,
    /// Last bucket, exclusive.
    pub end: usize,
    pub sum: u64,
    /// Sum divided by the number of buckets in the compartment.
    pub average: f64,
    /// Share of the channel's pixels, 0..=100.
    pub percentage: f64,
    /// Mean of the percentages of this and every earlier compartment.
    pub cumulative_average_percentage: f64,
}

impl Compartment {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }
}

/// Channel-wide figures plus the compartments they were derived from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelStatistics {
    pub channel: Channel,
    pub total: u64,
    pub sum_of_compartments: u64,
    /// Mean of the compartment averages.
    pub average_of_compartments: f64,
    pub compartments: Vec<Compartment>,
}

/// Splits `0..BUCKET_COUNT` into `count` ranges. Every range gets
/// `BUCKET_COUNT / count` buckets and the last one also takes the remainder.
pub fn compartment_ranges(count: usize) -> Result<Vec<Range<usize>>> {
    if count == 0 || count > BUCKET_COUNT {
        return Err(HistogramError::InvalidCompartmentCount {
            count,
            max: BUCKET_COUNT,
        });
    }

    let base = BUCKET_COUNT / count;
    Ok((0..count)
        .map(|i| {
            let start = i * base;
            let end = if i == count - 1 { BUCKET_COUNT } else { start + base };
            start..end
        })
        .collect())
}

fn ratio(numerator: f64, denominator: f64) -> f64 {
    if denominator == 0.0 {
        0.0
    } else {
        numerator / denominator
    }
}

pub fn aggregate(
    histogram: &ChannelHistogram,
    channel: Channel,
    compartment_count: usize,
) -> Result<Vec<Compartment>> {
    let ranges = compartment_ranges(compartment_count)?;
    let buckets = histogram.buckets(channel);
    let total = histogram.channel_total(channel);

    if total == 0 {
        tracing::debug!(%channel, "channel is empty, compartment statistics are zero");
    }

    let mut percentage_sum = 0.0;
    let compartments = ranges
        .into_iter()
        .enumerate()
        .map(|(index, range)| {
            let sum: u64 = buckets[range.clone()].iter().map(|&c| c as u64).sum();
            let average = ratio(sum as f64, range.len() as f64);
            let percentage = ratio(sum as f64, total as f64) * 100.0;
            percentage_sum += percentage;

            Compartment {
                index,
                start: range.start,
                end: range.end,
                sum,
                average,
                percentage,
                cumulative_average_percentage: percentage_sum / (index + 1) as f64,
            }
        })
        .collect();

    Ok(compartments)
}

pub fn summarize(
    histogram: &ChannelHistogram,
    channel: Channel,
    compartment_count: usize,
) -> Result<ChannelStatistics> {
    let compartments = aggregate(histogram, channel, compartment_count)?;
    let sum_of_compartments = compartments.iter().map(|c| c.sum).sum();
    let average_of_compartments = ratio(
        compartments.iter().map(|c| c.average).sum(),
        compartments.len() as f64,
    );

    Ok(ChannelStatistics {
        channel,
        total: histogram.channel_total(channel),
        sum_of_compartments,
        average_of_compartments,
        compartments,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histogram::{build, PixelBuffer};

    fn two_pixel_histogram() -> ChannelHistogram {
        let buffer = PixelBuffer::from_pixels(2, 1, &[[255, 0, 0], [0, 255, 0]]).unwrap();
        build(&buffer).unwrap()
    }

    #[test]
    fn test_ranges_partition_every_bucket() {
        for count in 1..=BUCKET_COUNT {
            let ranges = compartment_ranges(count).unwrap();
            assert_eq!(ranges.len(), count);
            assert_eq!(ranges[0].start, 0);
            assert_eq!(ranges[count - 1].end, BUCKET_COUNT);
            for pair in ranges.windows(2) {
                assert_eq!(pair[0].end, pair[1].start);
            }
        }
    }

    #[test]
    fn test_last_range_absorbs_remainder() {
        let ranges = compartment_ranges(3).unwrap();
        assert_eq!(ranges, vec![0..85, 85..170, 170..256]);
    }

    #[test]
    fn test_invalid_counts() {
        assert!(compartment_ranges(0).is_err());
        assert!(compartment_ranges(257).is_err());
    }

    #[test]
    fn test_single_compartment_scenario() {
        let histogram = two_pixel_histogram();
        let compartments = aggregate(&histogram, Channel::Red, 1).unwrap();
        assert_eq!(compartments.len(), 1);

        let c = &compartments[0];
        assert_eq!(c.sum, 2);
        assert!((c.average - 2.0 / 256.0).abs() < 1e-12);
        assert!((c.percentage - 100.0).abs() < 1e-9);
        assert!((c.cumulative_average_percentage - 100.0).abs() < 1e-9);
    }

    #[test]
    fn test_sums_and_percentages_add_up() {
        let histogram = two_pixel_histogram();
        for channel in Channel::ALL {
            let compartments = aggregate(&histogram, channel, 5).unwrap();
            let sum: u64 = compartments.iter().map(|c| c.sum).sum();
            assert_eq!(sum, histogram.channel_total(channel));

            let percent: f64 = compartments.iter().map(|c| c.percentage).sum();
            assert!((percent - 100.0).abs() < 1e-6);
        }
    }

    #[test]
    fn test_cumulative_average_percentage() {
        let histogram = two_pixel_histogram();
        // red: bucket 0 and bucket 255 hold one pixel each
        let compartments = aggregate(&histogram, Channel::Red, 4).unwrap();
        let percentages: Vec<f64> = compartments.iter().map(|c| c.percentage).collect();
        assert_eq!(percentages, vec![50.0, 0.0, 0.0, 50.0]);

        let cumulative: Vec<f64> = compartments
            .iter()
            .map(|c| c.cumulative_average_percentage)
            .collect();
        assert_eq!(cumulative, vec![50.0, 25.0, 50.0 / 3.0, 25.0]);
    }

    #[test]
    fn test_empty_channel_gives_zero_statistics() {
        let histogram = ChannelHistogram::empty();
        let stats = summarize(&histogram, Channel::Blue, DEFAULT_COMPARTMENT_COUNT).unwrap();
        assert_eq!(stats.total, 0);
        assert_eq!(stats.sum_of_compartments, 0);
        assert_eq!(stats.average_of_compartments, 0.0);
        for c in &stats.compartments {
            assert_eq!(c.percentage, 0.0);
            assert_eq!(c.average, 0.0);
            assert_eq!(c.cumulative_average_percentage, 0.0);
        }
    }

    #[test]
    fn test_summarize_averages_compartment_averages() {
        let histogram = two_pixel_histogram();
        let stats = summarize(&histogram, Channel::Blue, 2).unwrap();
        assert_eq!(stats.total, 2);
        assert_eq!(stats.sum_of_compartments, 2);
        // blue: both pixels in the first 128-bucket compartment
        assert!((stats.average_of_compartments - (2.0 / 128.0) / 2.0).abs() < 1e-12);
    }
}
