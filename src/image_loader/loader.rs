use crate::errors::{HistogramError, Result};
use crate::histogram::PixelBuffer;
use image::{DynamicImage, GenericImageView};
use std::path::Path;

const MAX_FILE_BYTES: u64 = 500 * 1024 * 1024;
const MAX_MEGAPIXELS: u64 = 100;

pub fn load_image(path: &Path) -> Result<DynamicImage> {
    if !path.exists() {
        return Err(HistogramError::FileNotFound {
            path: path.to_path_buf(),
        });
    }

    let file_size = std::fs::metadata(path)?.len();
    if file_size > MAX_FILE_BYTES {
        return Err(HistogramError::ImageLoad {
            path: path.to_path_buf(),
            message: format!(
                "File too large: {}MB (max {}MB)",
                file_size / (1024 * 1024),
                MAX_FILE_BYTES / (1024 * 1024)
            ),
        });
    }

    crate::profiler::with_profiler(|p| p.start_timer("image_load"));
    let result = image::open(path).map_err(|e| HistogramError::ImageLoad {
        path: path.to_path_buf(),
        message: e.to_string(),
    });
    crate::profiler::with_profiler(|p| p.end_timer("image_load"));

    let img = result?;
    let (width, height) = img.dimensions();
    let megapixels = (width as u64 * height as u64) / 1_000_000;
    if megapixels > MAX_MEGAPIXELS {
        return Err(HistogramError::ImageLoad {
            path: path.to_path_buf(),
            message: format!("Image too large: {}MP (max {}MP)", megapixels, MAX_MEGAPIXELS),
        });
    }

    log::debug!("Loaded {:?} ({}x{})", path, width, height);
    Ok(img)
}

/// Decodes the file and converts it to the RGB8 buffer the histogram consumes.
pub fn load_pixel_buffer(path: &Path) -> Result<PixelBuffer> {
    let img = load_image(path)?;
    Ok(PixelBuffer::from_image(&img))
}
