use image::imageops::FilterType;
use image::DynamicImage;
use tokio_util::sync::CancellationToken;

use crate::error::{AppError, Result};
use crate::models::dataset::{Dataset, Sample};
use crate::models::manifest::Manifest;
use crate::state::{Config, ImageErrorPolicy};
use crate::utils::{is_remote, join_segments, manifest_path};

/// Loads a fully materialized [`Dataset`] from a JSON manifest.
///
/// A dataset lives at a base path (or URL) `<base>`: the manifest at
/// `<base>.json` maps labels to filename arrays, and the images at
/// `<base>/<label>/<filename>`. Images are fetched strictly in manifest
/// order, decoded, and resized to the configured thumbnail size before the
/// sample is appended, so no partially loaded image ever reaches the
/// pipeline. Consecutive loads are separated by the configured throttle
/// delay.
#[derive(Debug, Clone)]
pub struct DatasetLoader {
    config: Config,
    cancel: CancellationToken,
}

impl DatasetLoader {
    /// Creates a loader with the given configuration and a fresh
    /// cancellation token.
    pub fn new(config: Config) -> Self {
        Self {
            config,
            cancel: CancellationToken::new(),
        }
    }

    /// Creates a loader whose iterations observe an external cancellation
    /// token.
    pub fn with_cancellation(config: Config, cancel: CancellationToken) -> Self {
        Self { config, cancel }
    }

    /// Loads the dataset rooted at `base_path`.
    ///
    /// # Errors
    ///
    /// `ManifestUnreachable` if the manifest cannot be fetched,
    /// `ManifestParse` if its body is not a label-to-filenames mapping,
    /// `ImageLoad` if an image fails under the `Abort` policy, and
    /// `Cancelled` if the cancellation token fires between iterations.
    /// Under the `Skip` policy, failing images are logged, counted in
    /// `Dataset::stats`, and left out of the sample sequence.
    pub async fn load(&self, base_path: &str) -> Result<Dataset> {
        let manifest_url = manifest_path(base_path);
        let body = self.fetch_text(&manifest_url).await?;
        let manifest = Manifest::from_json(&manifest_url, &body)?;

        log::debug!(
            "Loaded manifest {} ({} labels, {} files)",
            manifest_url,
            manifest.entries().len(),
            manifest.total_files()
        );

        let mut dataset = Dataset::default();
        for (index, (label, file)) in manifest.iter_files().enumerate() {
            if self.cancel.is_cancelled() {
                return Err(AppError::Cancelled);
            }
            if index > 0 && !self.config.load_delay.is_zero() {
                tokio::time::sleep(self.config.load_delay).await;
            }

            let image_path = join_segments(base_path, label, file);
            match self.load_image(&image_path).await {
                Ok(image) => {
                    dataset.samples.push(Sample {
                        image,
                        label: label.to_string(),
                    });
                    dataset.stats.loaded += 1;
                }
                Err(err) => match self.config.on_image_error {
                    ImageErrorPolicy::Abort => return Err(err),
                    ImageErrorPolicy::Skip => {
                        log::warn!("Skipping image {}: {}", image_path, err);
                        dataset.stats.skipped += 1;
                    }
                },
            }
        }

        log::info!(
            "Dataset {}: {} samples loaded, {} skipped",
            base_path,
            dataset.stats.loaded,
            dataset.stats.skipped
        );
        Ok(dataset)
    }

    /// Fetches and decodes one image, bounded by the configured timeout.
    async fn load_image(&self, path: &str) -> Result<DynamicImage> {
        let fetch_and_decode = async {
            let bytes = self.fetch_bytes(path).await?;
            let image =
                image::load_from_memory(&bytes).map_err(|e| AppError::ImageLoad {
                    path: path.to_string(),
                    reason: e.to_string(),
                })?;
            let size = self.config.image_size;
            Ok(image.resize_exact(size, size, FilterType::Triangle))
        };

        tokio::time::timeout(self.config.image_timeout, fetch_and_decode)
            .await
            .map_err(|_| AppError::ImageLoad {
                path: path.to_string(),
                reason: format!("timed out after {:?}", self.config.image_timeout),
            })?
    }

    async fn fetch_text(&self, path: &str) -> Result<String> {
        if is_remote(path) {
            return fetch_remote_text(path).await;
        }
        tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AppError::ManifestUnreachable {
                path: path.to_string(),
                reason: e.to_string(),
            })
    }

    async fn fetch_bytes(&self, path: &str) -> Result<Vec<u8>> {
        if is_remote(path) {
            return fetch_remote_bytes(path).await;
        }
        tokio::fs::read(path).await.map_err(|e| AppError::ImageLoad {
            path: path.to_string(),
            reason: e.to_string(),
        })
    }
}

#[cfg(feature = "remote")]
async fn fetch_remote_text(path: &str) -> Result<String> {
    let response = reqwest::get(path)
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| AppError::ManifestUnreachable {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
    response.text().await.map_err(|e| AppError::ManifestUnreachable {
        path: path.to_string(),
        reason: e.to_string(),
    })
}

#[cfg(feature = "remote")]
async fn fetch_remote_bytes(path: &str) -> Result<Vec<u8>> {
    let response = reqwest::get(path)
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| AppError::ImageLoad {
            path: path.to_string(),
            reason: e.to_string(),
        })?;
    let bytes = response.bytes().await.map_err(|e| AppError::ImageLoad {
        path: path.to_string(),
        reason: e.to_string(),
    })?;
    Ok(bytes.to_vec())
}

#[cfg(not(feature = "remote"))]
async fn fetch_remote_text(path: &str) -> Result<String> {
    Err(AppError::ManifestUnreachable {
        path: path.to_string(),
        reason: "built without the 'remote' feature".to_string(),
    })
}

#[cfg(not(feature = "remote"))]
async fn fetch_remote_bytes(path: &str) -> Result<Vec<u8>> {
    Err(AppError::ImageLoad {
        path: path.to_string(),
        reason: "built without the 'remote' feature".to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn quick_config() -> Config {
        Config {
            load_delay: Duration::ZERO,
            ..Config::default()
        }
    }

    #[tokio::test]
    async fn test_unreachable_manifest() {
        let loader = DatasetLoader::new(quick_config());
        let err = loader.load("/nonexistent/base/path").await.unwrap_err();
        assert!(matches!(err, AppError::ManifestUnreachable { .. }));
    }

    #[tokio::test]
    async fn test_cancelled_before_first_image() {
        let dir = tempfile::tempdir().unwrap();
        let base = dir.path().join("data");
        std::fs::create_dir_all(base.join("cat")).unwrap();
        std::fs::write(
            dir.path().join("data.json"),
            r#"{"cat": ["1.png"]}"#,
        )
        .unwrap();

        let cancel = CancellationToken::new();
        cancel.cancel();
        let loader = DatasetLoader::with_cancellation(quick_config(), cancel);
        let err = loader
            .load(base.to_str().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Cancelled));
    }
}
