use crate::analysis::HistogramAnalysis;
use crate::errors::Result;
use crate::histogram::{Channel, ChannelStatistics, ChartPolyline};
use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ChannelReport<'a> {
    pub channel: Channel,
    pub buckets: &'a [u32],
    pub statistics: &'a ChannelStatistics,
}

/// Serializable view of an analysis.
#[derive(Debug, Serialize)]
pub struct AnalysisReport<'a> {
    pub generated_at: DateTime<Utc>,
    pub width: u32,
    pub height: u32,
    pub global_max: u32,
    pub channels: Vec<ChannelReport<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub charts: Option<&'a [ChartPolyline]>,
}

impl<'a> AnalysisReport<'a> {
    pub fn new(analysis: &'a HistogramAnalysis, include_charts: bool) -> Self {
        let channels = analysis
            .statistics
            .iter()
            .map(|statistics| ChannelReport {
                channel: statistics.channel,
                buckets: analysis.histogram.buckets(statistics.channel),
                statistics,
            })
            .collect();

        Self {
            generated_at: Utc::now(),
            width: analysis.width,
            height: analysis.height,
            global_max: analysis.histogram.global_max(),
            channels,
            charts: include_charts.then_some(&analysis.charts[..]),
        }
    }
}

pub fn to_json(analysis: &HistogramAnalysis, include_charts: bool) -> Result<String> {
    Ok(serde_json::to_string_pretty(&AnalysisReport::new(analysis, include_charts))?)
}

pub fn log_statistics(statistics: &ChannelStatistics) {
    let channel = statistics.channel.name();
    tracing::info!("[{}] Sum: {}", channel, statistics.total);
    tracing::info!("[{}] Sum of all compartments {}", channel, statistics.sum_of_compartments);
    tracing::info!(
        "[{}] Average value of all compartments {:.4}",
        channel,
        statistics.average_of_compartments
    );

    for c in &statistics.compartments {
        let n = c.index + 1;
        tracing::info!("[{}] Sum of {} compartment {} (buckets {}..{})", channel, n, c.sum, c.start, c.end);
        tracing::info!("[{}] Average value of the {} compartment {:.4}", channel, n, c.average);
        tracing::info!(
            "[{}] Average percentage of the {} compartment {:.2}",
            channel,
            n,
            c.cumulative_average_percentage
        );
        tracing::info!("[{}] Percentage of the {} compartment {:.2}", channel, n, c.percentage);
    }
}

pub fn log_analysis(analysis: &HistogramAnalysis) {
    tracing::info!(
        "{}x{} image, global max {}",
        analysis.width,
        analysis.height,
        analysis.histogram.global_max()
    );
    for statistics in &analysis.statistics {
        log_statistics(statistics);
    }
}
