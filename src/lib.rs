#![doc(html_root_url = "https://docs.rs/imageknn/0.1.0")]
#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    missing_debug_implementations,
    rust_2018_idioms,
    unreachable_pub
)]

//! # ImageKnn
//!
//! A small library and CLI for evaluating nearest-neighbor image
//! classification: load labeled image datasets described by JSON manifests,
//! feed the training split through an embedding model into a classifier,
//! score the validation split, and report accuracy.
//!
//! The embedding model and the classifier are black-box collaborators behind
//! two narrow traits ([`ImageEmbedder`] and [`Classifier`]); the crate's own
//! logic is the manifest-driven loader and the strictly sequential
//! load → train → evaluate → report pipeline.
//!
//! ## Manifest format
//!
//! A dataset lives at a base path `<base>`: the manifest at `<base>.json` is
//! a JSON object mapping labels to filename arrays, and the images live at
//! `<base>/<label>/<filename>`:
//!
//! ```json
//! {"cat": ["1.jpg", "2.jpg"], "dog": ["a.jpg"]}
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use imageknn::{Config, EvaluationPipeline, HistogramEmbedder, KnnClassifier, Result};
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     imageknn::init()?;
//!
//!     let config = Config::default();
//!     let mut classifier = KnnClassifier::new(config.k);
//!     let pipeline = EvaluationPipeline::new(config);
//!
//!     let result = pipeline.run(&HistogramEmbedder::default(), &mut classifier).await?;
//!     println!("accuracy: {:.4}", result.accuracy);
//!     Ok(())
//! }
//! ```

// Internal modules
pub mod core;
/// Defines the application's error types and result aliases.
pub mod error;
pub mod models;
mod state;
mod utils;

// Public API exports
pub use crate::{
    core::embeddings::{cosine_similarity, Embedding, HistogramEmbedder, ImageEmbedder},
    core::knn::{Classifier, KnnClassifier, Prediction},
    core::loader::DatasetLoader,
    core::pipeline::{EvaluationPipeline, EvaluationResult},
    error::{AppError, Result, ResultExt, Stage},
    models::dataset::{Dataset, DatasetStats, Sample},
    models::manifest::{Manifest, ManifestEntry},
    state::{Config, ImageErrorPolicy},
};

/// Initialize the application with default settings
///
/// This function sets up logging. It should be called early in the
/// application startup process, before the pipeline emits any records.
///
/// # Errors
///
/// Returns an error if logging initialization fails.
///
/// # Example
///
/// ```no_run
/// use imageknn::init;
///
/// fn main() -> Result<(), Box<dyn std::error::Error>> {
///     init()?;
///     // Application code here
///     Ok(())
/// }
/// ```
pub fn init() -> Result<()> {
    // Initialize logging with sensible defaults
    let env = env_logger::Env::default()
        .default_filter_or("info")
        .default_write_style_or("auto");

    env_logger::Builder::from_env(env)
        .format_timestamp_millis()
        .format_module_path(false)
        .format_target(false)
        .init();

    log::debug!("ImageKnn initialized");
    Ok(())
}
