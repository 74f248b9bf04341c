//! Per-channel RGB histograms for photos.
//!
//! The [`histogram`] module is the pure core: sampling a decoded
//! [`PixelBuffer`](histogram::PixelBuffer), counting buckets, compartment
//! statistics and chart geometry. The remaining modules are the collaborators
//! around it: file loading, rendering, background scheduling and settings.

pub mod analysis;
pub mod errors;
pub mod histogram;
pub mod image_loader;
pub mod logging;
pub mod profiler;
pub mod render;
pub mod report;
pub mod settings;
pub mod task_scheduler;

mod tests;

pub use analysis::{analyze, AnalysisConfig, HistogramAnalysis};
pub use errors::{HistogramError, Result};
