use std::time::Duration;

use crate::error::{AppError, Result};

/// Policy applied when an individual image fails to fetch or decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageErrorPolicy {
    /// Log a warning, count the failure in the dataset stats, and continue.
    Skip,
    /// Abort the whole dataset load on the first failing image.
    Abort,
}

/// Configuration for the application
#[derive(Debug, Clone)]
pub struct Config {
    /// Base path or URL of the training split (manifest at `<path>.json`)
    pub training_path: String,
    /// Base path or URL of the validation split (manifest at `<path>.json`)
    pub validation_path: String,
    /// Side length images are resized to before embedding
    pub image_size: u32,
    /// Throttling delay between consecutive image loads
    pub load_delay: Duration,
    /// Upper bound on a single image fetch and decode
    pub image_timeout: Duration,
    /// What to do when one image fails to load
    pub on_image_error: ImageErrorPolicy,
    /// Number of neighbors consulted by the reference classifier
    pub k: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            training_path: String::from("data/training"),
            validation_path: String::from("data/validation"),
            image_size: 30,
            load_delay: Duration::from_millis(15),
            image_timeout: Duration::from_secs(30),
            on_image_error: ImageErrorPolicy::Skip,
            k: 3,
        }
    }
}

impl Config {
    /// Builds a configuration from the environment, starting from defaults.
    ///
    /// Recognized variables: `IMAGEKNN_TRAINING_PATH`,
    /// `IMAGEKNN_VALIDATION_PATH`, `IMAGEKNN_IMAGE_SIZE`,
    /// `IMAGEKNN_LOAD_DELAY_MS`, `IMAGEKNN_IMAGE_TIMEOUT_SECS`,
    /// `IMAGEKNN_ON_IMAGE_ERROR` (`skip` or `abort`), `IMAGEKNN_K`.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("IMAGEKNN_TRAINING_PATH") {
            config.training_path = path;
        }
        if let Ok(path) = std::env::var("IMAGEKNN_VALIDATION_PATH") {
            config.validation_path = path;
        }
        if let Ok(size) = std::env::var("IMAGEKNN_IMAGE_SIZE") {
            config.image_size = parse_var("IMAGEKNN_IMAGE_SIZE", &size)?;
        }
        if let Ok(ms) = std::env::var("IMAGEKNN_LOAD_DELAY_MS") {
            config.load_delay = Duration::from_millis(parse_var("IMAGEKNN_LOAD_DELAY_MS", &ms)?);
        }
        if let Ok(secs) = std::env::var("IMAGEKNN_IMAGE_TIMEOUT_SECS") {
            config.image_timeout =
                Duration::from_secs(parse_var("IMAGEKNN_IMAGE_TIMEOUT_SECS", &secs)?);
        }
        if let Ok(policy) = std::env::var("IMAGEKNN_ON_IMAGE_ERROR") {
            config.on_image_error = match policy.to_ascii_lowercase().as_str() {
                "skip" => ImageErrorPolicy::Skip,
                "abort" => ImageErrorPolicy::Abort,
                other => {
                    return Err(AppError::Config(format!(
                        "IMAGEKNN_ON_IMAGE_ERROR must be 'skip' or 'abort', got {:?}",
                        other
                    )))
                }
            };
        }
        if let Ok(k) = std::env::var("IMAGEKNN_K") {
            config.k = parse_var("IMAGEKNN_K", &k)?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Checks that the configuration values are usable.
    pub fn validate(&self) -> Result<()> {
        if self.image_size == 0 {
            return Err(AppError::Config(
                "image_size must be greater than zero".to_string(),
            ));
        }
        if self.k == 0 {
            return Err(AppError::Config("k must be greater than zero".to_string()));
        }
        Ok(())
    }
}

fn parse_var<T: std::str::FromStr>(name: &str, value: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    value
        .parse()
        .map_err(|e| AppError::Config(format!("invalid value for {}: {}", name, e)))
}
