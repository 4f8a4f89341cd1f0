//! Data types shared across the loading and evaluation stages

/// Datasets of labeled, decoded images and their load statistics.
pub mod dataset;
/// The label-to-filenames manifest format.
pub mod manifest;
