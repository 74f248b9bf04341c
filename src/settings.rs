use crate::analysis::AnalysisConfig;
use crate::errors::{HistogramError, Result};
use crate::histogram::{
    ChartConfig, ChartStyle, BUCKET_COUNT, DEFAULT_COMPARTMENT_COUNT, DEFAULT_VERTICAL_PADDING,
};
use crate::task_scheduler::TaskScheduler;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Density of a baseline (scale 1.0) display.
const BASELINE_DPI: f32 = 160.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    // Statistics
    pub compartment_count: usize,

    // Chart
    pub canvas_width: u32,
    pub canvas_height: u32,
    pub density_scale: f32,
    /// When set, overrides `density_scale` with `dpi / 160`.
    pub dpi: Option<u32>,
    pub vertical_padding: u32,
    pub colored: bool,
    pub chart_style: ChartStyle,

    // Performance
    /// Background worker count; 0 picks one per CPU.
    pub worker_threads: usize,

    pub debug_logging: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            compartment_count: DEFAULT_COMPARTMENT_COUNT,

            canvas_width: 1028,
            canvas_height: 400,
            density_scale: 1.0,
            dpi: None,
            vertical_padding: DEFAULT_VERTICAL_PADDING,
            colored: true,
            chart_style: ChartStyle::Filled,

            worker_threads: 0,

            debug_logging: false,
        }
    }
}

impl Settings {
    pub fn config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "histoview", "histoview")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Loads the user's settings, falling back to defaults when missing or unreadable.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::warn!("Ignoring settings at {:?}: {}", path, e);
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let settings: Settings = serde_json::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path().ok_or_else(|| HistogramError::Settings {
            message: "no configuration directory available".to_string(),
        })?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if self.compartment_count == 0 || self.compartment_count > BUCKET_COUNT {
            return Err(HistogramError::InvalidCompartmentCount {
                count: self.compartment_count,
                max: BUCKET_COUNT,
            });
        }
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(HistogramError::Settings {
                message: format!(
                    "canvas must be non-empty, got {}x{}",
                    self.canvas_width, self.canvas_height
                ),
            });
        }
        if !(self.density_scale.is_finite() && self.density_scale > 0.0) {
            return Err(HistogramError::Settings {
                message: format!("density scale must be positive, got {}", self.density_scale),
            });
        }
        if self.dpi == Some(0) {
            return Err(HistogramError::Settings {
                message: "dpi must be positive".to_string(),
            });
        }
        Ok(())
    }

    pub fn effective_density(&self) -> f32 {
        match self.dpi {
            Some(dpi) => dpi as f32 / BASELINE_DPI,
            None => self.density_scale,
        }
    }

    pub fn chart_config(&self) -> ChartConfig {
        ChartConfig {
            canvas_width: self.canvas_width,
            canvas_height: self.canvas_height,
            density_scale: self.effective_density(),
            vertical_padding: self.vertical_padding,
            colored: self.colored,
            style: self.chart_style,
        }
    }

    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            compartment_count: self.compartment_count,
            chart: self.chart_config(),
        }
    }

    pub fn worker_count(&self) -> usize {
        if self.worker_threads == 0 {
            TaskScheduler::default_worker_count()
        } else {
            self.worker_threads
        }
    }
}
