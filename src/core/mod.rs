//! Core functionality: dataset loading, embedding and classifier seams, and
//! the evaluation pipeline

/// The image-embedding collaborator seam and a reference embedder.
pub mod embeddings;
/// The classifier collaborator seam and a reference k-NN implementation.
pub mod knn;
/// Manifest-driven dataset loading.
pub mod loader;
/// The load → train → evaluate → report pipeline.
pub mod pipeline;
