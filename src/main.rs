use anyhow::{bail, Context};
use clap::Parser;
use histoview::histogram::ChartStyle;
use histoview::image_loader;
use histoview::logging;
use histoview::render;
use histoview::report;
use histoview::settings::Settings;
use histoview::task_scheduler::{HistogramSession, TaskScheduler};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "histoview")]
#[command(version, about = "Per-channel RGB histogram and compartment statistics of a photo", long_about = None)]
struct Cli {
    /// Image to analyze
    #[arg(value_name = "IMAGE")]
    image: PathBuf,

    /// Write the rendered chart to this PNG file
    #[arg(short, long, value_name = "FILE")]
    out: Option<PathBuf>,

    /// Print the analysis as JSON on stdout
    #[arg(long)]
    json: bool,

    /// Include chart geometry in the JSON output
    #[arg(long, requires = "json")]
    with_charts: bool,

    /// Number of compartments per channel (1-256)
    #[arg(short, long, value_name = "N")]
    compartments: Option<usize>,

    /// Chart canvas width in pixels
    #[arg(long, value_name = "PX")]
    width: Option<u32>,

    /// Chart canvas height in pixels
    #[arg(long, value_name = "PX")]
    height: Option<u32>,

    /// Horizontal density correction factor
    #[arg(long, value_name = "FLOAT", conflicts_with = "dpi")]
    density: Option<f32>,

    /// Derive the density factor from the display DPI (dpi / 160)
    #[arg(long, value_name = "DPI")]
    dpi: Option<u32>,

    /// Draw every channel in one neutral color
    #[arg(long)]
    mono: bool,

    /// Draw open per-channel lines instead of filled areas
    #[arg(long)]
    outline: bool,

    /// Settings file to use instead of the user configuration
    #[arg(long, value_name = "FILE")]
    settings: Option<PathBuf>,

    /// Store the effective settings as the user configuration
    #[arg(long)]
    save_settings: bool,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

impl Cli {
    fn apply(&self, settings: &mut Settings) {
        if let Some(n) = self.compartments {
            settings.compartment_count = n;
        }
        if let Some(width) = self.width {
            settings.canvas_width = width;
        }
        if let Some(height) = self.height {
            settings.canvas_height = height;
        }
        if let Some(density) = self.density {
            settings.density_scale = density;
            settings.dpi = None;
        }
        if let Some(dpi) = self.dpi {
            settings.dpi = Some(dpi);
        }
        if self.mono {
            settings.colored = false;
        }
        if self.outline {
            settings.chart_style = ChartStyle::Outline;
        }
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut settings = match &cli.settings {
        Some(path) => Settings::load_from(path)
            .with_context(|| format!("failed to read settings from {}", path.display()))?,
        None => Settings::load(),
    };
    cli.apply(&mut settings);
    settings.validate()?;

    logging::init_tracing(cli.debug || settings.debug_logging);

    if cli.save_settings {
        let path = settings.save()?;
        log::info!("Settings saved to {}", path.display());
    }

    if !image_loader::is_supported_image(&cli.image) {
        log::warn!("{} does not have a known image extension", cli.image.display());
    }

    let scheduler = TaskScheduler::new(settings.worker_count())?;
    let mut session = HistogramSession::new(scheduler);
    session.select_file(cli.image.clone(), settings.analysis_config());
    log::info!("Loading {}...", cli.image.display());

    let outcome = session.wait();
    session.shutdown();

    let analysis = match outcome {
        Some(Ok(analysis)) => analysis,
        Some(Err(e)) => {
            eprintln!("{}", e.user_message());
            bail!("analysis of {} failed [{}]", cli.image.display(), e.error_code());
        }
        None => bail!("no analysis was produced"),
    };

    report::log_analysis(&analysis);

    if cli.json {
        println!("{}", report::to_json(&analysis, cli.with_charts)?);
    }

    if let Some(out) = &cli.out {
        let chart = render::render_chart(&analysis.charts, settings.canvas_width, settings.canvas_height);
        chart
            .save(out)
            .with_context(|| format!("failed to write chart to {}", out.display()))?;
        log::info!("Chart written to {}", out.display());
    }

    Ok(())
}
