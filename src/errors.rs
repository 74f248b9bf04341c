use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HistogramError {
    #[error("Invalid image: {message}")]
    InvalidImage { message: String },

    #[error("Channel value {value} at index {index} is outside 0..=255")]
    ValueOutOfRange { index: usize, value: u16 },

    #[error("Invalid compartment count {count}: expected 1..={max}")]
    InvalidCompartmentCount { count: usize, max: usize },

    #[error("Failed to load image '{path}': {message}")]
    ImageLoad { path: PathBuf, message: String },

    #[error("File not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Settings error: {message}")]
    Settings { message: String },

    #[error("Thread pool error: {message}")]
    ThreadPool { message: String },

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("JSON error: {source}")]
    Json {
        #[from]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, HistogramError>;

impl HistogramError {
    pub fn invalid_image(message: impl Into<String>) -> Self {
        HistogramError::InvalidImage {
            message: message.into(),
        }
    }

    /// Returns true if the caller can fall back to an empty result
    /// ("draw nothing") instead of giving up.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            HistogramError::InvalidImage { .. }
                | HistogramError::ValueOutOfRange { .. }
                | HistogramError::FileNotFound { .. }
                | HistogramError::ImageLoad { .. }
                | HistogramError::Io { .. }
        )
    }

    /// Returns a user-friendly error message with recovery suggestions
    pub fn user_message(&self) -> String {
        let base_message = self.to_string();
        let suggestion = match self {
            HistogramError::InvalidImage { .. } => "No usable image is available. Select or capture another photo.",
            HistogramError::ValueOutOfRange { .. } => "The pixel data is not 8-bit. Convert it or use the clamping constructor.",
            HistogramError::InvalidCompartmentCount { .. } => "Choose between 1 and 256 compartments.",
            HistogramError::FileNotFound { .. } => "Check if the file exists and you have permission to access it.",
            HistogramError::ImageLoad { .. } => "The image file may be corrupted or in an unsupported format.",
            HistogramError::Settings { .. } | HistogramError::Json { .. } => "The settings file could not be used. Defaults will be applied.",
            HistogramError::ThreadPool { .. } => "Background processing failed. Try again.",
            HistogramError::Io { .. } => "File system error occurred. Check disk space and permissions.",
        };

        format!("{}\n\n{}", base_message, suggestion)
    }

    /// Returns an error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            HistogramError::InvalidImage { .. } => "INVALID_IMAGE",
            HistogramError::ValueOutOfRange { .. } => "VALUE_OUT_OF_RANGE",
            HistogramError::InvalidCompartmentCount { .. } => "INVALID_COMPARTMENT_COUNT",
            HistogramError::ImageLoad { .. } => "IMAGE_LOAD_ERROR",
            HistogramError::FileNotFound { .. } => "FILE_NOT_FOUND",
            HistogramError::Settings { .. } => "SETTINGS_ERROR",
            HistogramError::ThreadPool { .. } => "THREAD_POOL_ERROR",
            HistogramError::Io { .. } => "IO_ERROR",
            HistogramError::Json { .. } => "JSON_ERROR",
        }
    }

    pub fn log_and_report(&self) {
        let error_code = self.error_code();
        if self.is_recoverable() {
            log::warn!("Error [{}]: {}", error_code, self);
        } else {
            log::error!("Error [{}]: {}", error_code, self);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes_and_recoverability() {
        let error = HistogramError::invalid_image("zero width");
        assert!(error.is_recoverable());
        assert_eq!(error.error_code(), "INVALID_IMAGE");
        assert!(error.user_message().contains("Select or capture another photo"));

        let error = HistogramError::InvalidCompartmentCount { count: 0, max: 256 };
        assert!(!error.is_recoverable());
        assert_eq!(error.to_string(), "Invalid compartment count 0: expected 1..=256");
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        let error: HistogramError = io.into();
        assert_eq!(error.error_code(), "IO_ERROR");
    }
}
