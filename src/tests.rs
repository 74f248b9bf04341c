#[cfg(test)]
mod tests {
    use crate::analysis::{analyze, AnalysisConfig};
    use crate::histogram::{self, Channel, ChartStyle, PixelBuffer, BUCKET_COUNT};
    use crate::render;
    use crate::settings::Settings;
    use crate::task_scheduler::{HistogramSession, TaskScheduler};

    /// Deterministic pseudo-random buffer (xorshift).
    fn noisy_buffer(width: u32, height: u32, seed: u32) -> PixelBuffer {
        let mut state = seed.max(1);
        let data = (0..width * height * 3)
            .map(|_| {
                state ^= state << 13;
                state ^= state >> 17;
                state ^= state << 5;
                (state >> 24) as u8
            })
            .collect();
        PixelBuffer::new(width, height, data).unwrap()
    }

    #[test]
    fn test_histogram_properties_hold_for_many_images() {
        for (i, (w, h)) in [(1, 1), (3, 7), (64, 48), (250, 3)].into_iter().enumerate() {
            let buffer = noisy_buffer(w, h, i as u32 + 11);
            let counts = histogram::build(&buffer).unwrap();

            let mut true_max = 0u32;
            for channel in Channel::ALL {
                assert_eq!(counts.channel_total(channel), (w * h) as u64);
                true_max = true_max.max(*counts.buckets(channel).iter().max().unwrap());

                for count in [1, 3, 4, 7, 256] {
                    let compartments = histogram::aggregate(&counts, channel, count).unwrap();
                    let sum: u64 = compartments.iter().map(|c| c.sum).sum();
                    assert_eq!(sum, (w * h) as u64);
                    let percent: f64 = compartments.iter().map(|c| c.percentage).sum();
                    assert!((percent - 100.0).abs() < 1e-6);
                    let covered: usize = compartments.iter().map(|c| c.len()).sum();
                    assert_eq!(covered, BUCKET_COUNT);
                    assert!(compartments.iter().all(|c| !c.is_empty()));
                }
            }
            assert_eq!(counts.global_max(), true_max);
        }
    }

    #[test]
    fn test_file_to_chart_pipeline() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gradient.png");
        let img = image::RgbImage::from_fn(256, 4, |x, _| image::Rgb([x as u8, 255 - x as u8, 0]));
        img.save(&path).unwrap();

        let settings = Settings {
            canvas_width: 514,
            canvas_height: 120,
            ..Settings::default()
        };

        let mut session = HistogramSession::new(TaskScheduler::new(1).unwrap());
        session.select_file(path, settings.analysis_config());
        let analysis = session.wait().unwrap().unwrap();
        session.shutdown();

        // every red and green level appears four times, blue is always 0
        assert_eq!(analysis.histogram.buckets(Channel::Red)[17], 4);
        assert_eq!(analysis.histogram.buckets(Channel::Blue)[0], 1024);
        assert_eq!(analysis.histogram.global_max(), 1024);

        let red = &analysis.statistics[0];
        assert_eq!(red.compartments.len(), 4);
        for c in &red.compartments {
            assert!((c.percentage - 25.0).abs() < 1e-9);
        }

        let chart = render::render_chart(&analysis.charts, settings.canvas_width, settings.canvas_height);
        assert_eq!(chart.dimensions(), (514, 120));
        // blue bucket 0 towers over the canvas, painted last
        assert_eq!(*chart.get_pixel(0, 60), image::Rgb([0, 0, 255]));
    }

    #[test]
    fn test_degenerate_image_draws_nothing() {
        let buffer = PixelBuffer::new(0, 3, Vec::new()).unwrap();
        let err = analyze(&buffer, &AnalysisConfig::default()).unwrap_err();
        assert!(err.is_recoverable());

        let empty = histogram::build_or_empty(&buffer);
        let config = AnalysisConfig::default();
        let lines = histogram::project_all(&empty, &config.chart);
        for line in &lines {
            assert!(line.points.iter().all(|p| p.y == config.chart.canvas_height as f32));
        }
        let stats = histogram::summarize(&empty, Channel::Red, config.compartment_count).unwrap();
        assert!(stats.compartments.iter().all(|c| c.percentage == 0.0));
    }

    #[test]
    fn test_outline_style_through_settings() {
        let settings = Settings {
            chart_style: ChartStyle::Outline,
            colored: false,
            ..Settings::default()
        };
        let analysis = analyze(&noisy_buffer(32, 32, 5), &settings.analysis_config()).unwrap();
        for line in &analysis.charts {
            assert_eq!(line.style, ChartStyle::Outline);
            assert_eq!(line.points.len(), BUCKET_COUNT);
            assert_eq!(line.color, histogram::ChartColor::Neutral);
        }
    }
}
