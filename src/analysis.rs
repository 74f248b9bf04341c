use crate::errors::Result;
use crate::histogram::{
    build, build_parallel, optimal_tile_count, project_all, summarize, Channel, ChannelHistogram,
    ChannelStatistics, ChartConfig, ChartPolyline, PixelBuffer, DEFAULT_COMPARTMENT_COUNT,
};
use crate::profiler;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Buffers with at least this many pixels are counted in parallel tiles.
pub const PARALLEL_PIXEL_THRESHOLD: u64 = 1_000_000;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisConfig {
    pub compartment_count: usize,
    pub chart: ChartConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            compartment_count: DEFAULT_COMPARTMENT_COUNT,
            chart: ChartConfig::default(),
        }
    }
}

/// Everything derived from one image.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramAnalysis {
    pub width: u32,
    pub height: u32,
    pub histogram: ChannelHistogram,
    pub statistics: Vec<ChannelStatistics>,
    pub charts: [ChartPolyline; 3],
}

pub fn build_histogram(buffer: &PixelBuffer) -> Result<ChannelHistogram> {
    profiler::with_profiler(|p| p.start_timer("histogram_build"));
    let result = if buffer.pixel_count() >= PARALLEL_PIXEL_THRESHOLD {
        let tiles = optimal_tile_count(buffer.width(), buffer.height());
        build_parallel(buffer, tiles)
    } else {
        build(buffer)
    };
    profiler::with_profiler(|p| p.end_timer("histogram_build"));
    result
}

/// Statistics and chart geometry for an existing histogram. The two are
/// independent and computed concurrently.
pub fn derive(
    histogram: &ChannelHistogram,
    config: &AnalysisConfig,
) -> Result<(Vec<ChannelStatistics>, [ChartPolyline; 3])> {
    let (statistics, charts) = rayon::join(
        || {
            Channel::ALL
                .as_slice()
                .par_iter()
                .map(|&channel| summarize(histogram, channel, config.compartment_count))
                .collect::<Result<Vec<_>>>()
        },
        || project_all(histogram, &config.chart),
    );
    Ok((statistics?, charts))
}

/// Runs the whole pipeline on a decoded image.
pub fn analyze(buffer: &PixelBuffer, config: &AnalysisConfig) -> Result<HistogramAnalysis> {
    let histogram = build_histogram(buffer)?;
    let (statistics, charts) = derive(&histogram, config)?;

    tracing::info!(
        width = buffer.width(),
        height = buffer.height(),
        global_max = histogram.global_max(),
        "analysis complete"
    );

    Ok(HistogramAnalysis {
        width: buffer.width(),
        height: buffer.height(),
        histogram,
        statistics,
        charts,
    })
}
