use super::buffer::{Channel, BUCKET_COUNT};
use super::builder::ChannelHistogram;
use serde::{Deserialize, Serialize};

/// Extra height added to the scaling target so tall peaks overshoot the top edge.
pub const DEFAULT_VERTICAL_PADDING: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartStyle {
    /// Area closed at the baseline, scaled against the global maximum.
    Filled,
    /// Open line per channel, each scaled against its own maximum.
    Outline,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChartColor {
    Red,
    Green,
    Blue,
    Neutral,
}

impl ChartColor {
    pub fn for_channel(channel: Channel, colored: bool) -> Self {
        if !colored {
            return ChartColor::Neutral;
        }
        match channel {
            Channel::Red => ChartColor::Red,
            Channel::Green => ChartColor::Green,
            Channel::Blue => ChartColor::Blue,
        }
    }

    pub fn rgb(self) -> [u8; 3] {
        match self {
            ChartColor::Red => [255, 0, 0],
            ChartColor::Green => [0, 255, 0],
            ChartColor::Blue => [0, 0, 255],
            ChartColor::Neutral => [255, 255, 255],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    pub canvas_width: u32,
    pub canvas_height: u32,
    /// Device density correction applied to the horizontal step.
    pub density_scale: f32,
    pub vertical_padding: u32,
    pub colored: bool,
    pub style: ChartStyle,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1028,
            canvas_height: 400,
            density_scale: 1.0,
            vertical_padding: DEFAULT_VERTICAL_PADDING,
            colored: true,
            style: ChartStyle::Filled,
        }
    }
}

impl ChartConfig {
    /// Horizontal distance between consecutive buckets. Canvases narrower
    /// than one pixel per bucket get a step of 0 and every point lands on x = 0.
    pub fn step(&self) -> f32 {
        let step = (self.canvas_width as f32 / (BUCKET_COUNT + 1) as f32).floor() * self.density_scale;
        if step == 0.0 {
            tracing::debug!(canvas_width = self.canvas_width, "canvas too narrow, chart collapses to x = 0");
        }
        step
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub x: f32,
    pub y: f32,
}

impl ChartPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPolyline {
    pub channel: Channel,
    pub color: ChartColor,
    pub style: ChartStyle,
    pub points: Vec<ChartPoint>,
}

impl ChartPolyline {
    /// True when the first and last points both sit on the baseline.
    pub fn is_closed_at(&self, baseline: f32) -> bool {
        matches!(
            (self.points.first(), self.points.last()),
            (Some(first), Some(last)) if first.y == baseline && last.y == baseline
        )
    }
}

fn scaled(count: u32, max: u32, target: u32) -> f32 {
    if max == 0 {
        return 0.0;
    }
    ((count as f64 / max as f64) * target as f64).round() as f32
}

pub fn project(histogram: &ChannelHistogram, channel: Channel, config: &ChartConfig) -> ChartPolyline {
    let points = match config.style {
        ChartStyle::Filled => filled_points(histogram, channel, config),
        ChartStyle::Outline => outline_points(histogram, channel, config),
    };

    ChartPolyline {
        channel,
        color: ChartColor::for_channel(channel, config.colored),
        style: config.style,
        points,
    }
}

pub fn project_all(histogram: &ChannelHistogram, config: &ChartConfig) -> [ChartPolyline; 3] {
    Channel::ALL.map(|channel| project(histogram, channel, config))
}

fn filled_points(histogram: &ChannelHistogram, channel: Channel, config: &ChartConfig) -> Vec<ChartPoint> {
    let buckets = histogram.buckets(channel);
    let max = histogram.global_max();
    let height = config.canvas_height as f32;
    let target = config.canvas_height + config.vertical_padding;
    let step = config.step();

    // The last bucket has no point of its own; its slot closes the shape.
    let mut points = Vec::with_capacity(BUCKET_COUNT + 1);
    points.push(ChartPoint::new(0.0, height));
    for (j, &count) in buckets.iter().take(BUCKET_COUNT - 1).enumerate() {
        let value = scaled(count, max, target);
        points.push(ChartPoint::new(j as f32 * step, height - value));
    }
    points.push(ChartPoint::new((BUCKET_COUNT - 1) as f32 * step, height));
    points
}

fn outline_points(histogram: &ChannelHistogram, channel: Channel, config: &ChartConfig) -> Vec<ChartPoint> {
    let max = histogram.channel_max(channel);
    let height = config.canvas_height as f32;
    let step = config.step();

    histogram
        .buckets(channel)
        .iter()
        .enumerate()
        .map(|(j, &count)| {
            let value = scaled(count, max, config.canvas_height);
            ChartPoint::new(j as f32 * step, height - value)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::histogram::{build, PixelBuffer};

    fn config(width: u32, height: u32) -> ChartConfig {
        ChartConfig {
            canvas_width: width,
            canvas_height: height,
            ..ChartConfig::default()
        }
    }

    fn two_pixel_histogram() -> ChannelHistogram {
        let buffer = PixelBuffer::from_pixels(2, 1, &[[255, 0, 0], [0, 255, 0]]).unwrap();
        build(&buffer).unwrap()
    }

    #[test]
    fn test_step_is_truncated_then_scaled() {
        let mut cfg = config(514, 100);
        assert_eq!(cfg.step(), 2.0);
        cfg.canvas_width = 600;
        assert_eq!(cfg.step(), 2.0);
        cfg.density_scale = 1.5;
        assert_eq!(cfg.step(), 3.0);
    }

    #[test]
    fn test_narrow_canvas_collapses_to_zero_step() {
        let histogram = two_pixel_histogram();
        let cfg = config(100, 100);
        assert_eq!(cfg.step(), 0.0);

        for style in [ChartStyle::Filled, ChartStyle::Outline] {
            let cfg = ChartConfig { style, ..cfg.clone() };
            let line = project(&histogram, Channel::Red, &cfg);
            assert!(line.points.iter().all(|p| p.x == 0.0));
        }
        assert_eq!(config(257, 100).step(), 1.0);
    }

    #[test]
    fn test_filled_polyline_shape() {
        let histogram = two_pixel_histogram();
        let cfg = config(514, 100);
        let line = project(&histogram, Channel::Blue, &cfg);

        // baseline anchor + 255 bucket points + closing anchor
        assert_eq!(line.points.len(), BUCKET_COUNT + 1);
        assert!(line.is_closed_at(100.0));
        assert_eq!(line.points.last().unwrap().x, 255.0 * 2.0);

        // blue bucket 0 holds the global max: scaled to height + padding
        assert_eq!(line.points[1], ChartPoint::new(0.0, 100.0 - 200.0));
        assert_eq!(line.points[2], ChartPoint::new(2.0, 100.0));
    }

    #[test]
    fn test_value_is_rounded() {
        // red bucket 0 holds 1 of a global max of 2: 0.5 * (10 + 100) = 55
        let histogram = two_pixel_histogram();
        let line = project(&histogram, Channel::Red, &config(514, 10));
        assert_eq!(line.points[1].y, 10.0 - 55.0);
    }

    #[test]
    fn test_zero_max_gives_flat_baseline() {
        let histogram = ChannelHistogram::empty();
        for style in [ChartStyle::Filled, ChartStyle::Outline] {
            let cfg = ChartConfig {
                style,
                ..config(300, 80)
            };
            for line in project_all(&histogram, &cfg) {
                assert!(line.points.iter().all(|p| p.y == 80.0));
            }
        }
    }

    #[test]
    fn test_color_is_metadata_only() {
        let histogram = two_pixel_histogram();
        let colored = project(&histogram, Channel::Green, &config(400, 50));
        let mono = project(
            &histogram,
            Channel::Green,
            &ChartConfig {
                colored: false,
                ..config(400, 50)
            },
        );
        assert_eq!(colored.color, ChartColor::Green);
        assert_eq!(mono.color, ChartColor::Neutral);
        assert_eq!(colored.points, mono.points);
    }

    #[test]
    fn test_outline_uses_channel_max() {
        let histogram = two_pixel_histogram();
        let cfg = ChartConfig {
            style: ChartStyle::Outline,
            ..config(514, 100)
        };
        let line = project(&histogram, Channel::Red, &cfg);
        assert_eq!(line.points.len(), BUCKET_COUNT);
        assert!(!line.is_closed_at(100.0));
        // red max is 1, so each occupied bucket reaches the top
        assert_eq!(line.points[0], ChartPoint::new(0.0, 0.0));
        assert_eq!(line.points[255], ChartPoint::new(510.0, 0.0));
        assert_eq!(line.points[1].y, 100.0);
    }
}
