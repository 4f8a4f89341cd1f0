use image::DynamicImage;
use ndarray::Array1;

use crate::error::Result;

/// A fixed-length feature vector produced by an embedder for one image.
pub type Embedding = Array1<f32>;

/// The embedding-model collaborator seam.
///
/// The pipeline treats the model as a black box: anything that turns a decoded
/// image into a fixed-length vector is substitutable, from the bundled
/// [`HistogramEmbedder`] to a full deep-learning backbone.
pub trait ImageEmbedder {
    /// Computes an embedding for a fully decoded image.
    fn infer(&self, image: &DynamicImage) -> Result<Embedding>;
}

/// A lightweight deterministic embedder based on per-channel intensity
/// histograms.
///
/// Each RGB channel contributes `bins` buckets; bucket counts are normalized
/// by the pixel count so images of different sizes are comparable. This is
/// not a learned representation, but it is deterministic, dependency-free,
/// and separates images with distinct color distributions well enough for
/// the demo datasets and the test suite.
#[derive(Debug, Clone)]
pub struct HistogramEmbedder {
    bins: usize,
}

impl Default for HistogramEmbedder {
    fn default() -> Self {
        Self::new(16)
    }
}

impl HistogramEmbedder {
    /// Creates an embedder with `bins` buckets per color channel.
    pub fn new(bins: usize) -> Self {
        Self { bins: bins.max(1) }
    }

    /// Output vector length: three channels of `bins` buckets each.
    pub fn dimensions(&self) -> usize {
        self.bins * 3
    }
}

impl ImageEmbedder for HistogramEmbedder {
    fn infer(&self, image: &DynamicImage) -> Result<Embedding> {
        let rgb = image.to_rgb8();
        let (width, height) = rgb.dimensions();
        let pixel_count = (width as usize * height as usize).max(1);

        let mut counts = vec![0f32; self.dimensions()];
        let bucket_width = (256 + self.bins - 1) / self.bins;

        for pixel in rgb.pixels() {
            for (channel, &value) in pixel.0.iter().enumerate() {
                let bucket = value as usize / bucket_width;
                counts[channel * self.bins + bucket] += 1.0;
            }
        }

        for count in &mut counts {
            *count /= pixel_count as f32;
        }

        Ok(Array1::from(counts))
    }
}

/// Compute cosine similarity between two embeddings
pub fn cosine_similarity(a: &Embedding, b: &Embedding) -> f32 {
    let dot_product = a.dot(b);
    let norm_a = a.dot(a).sqrt();
    let norm_b = b.dot(b).sqrt();

    if norm_a > 0.0 && norm_b > 0.0 {
        (dot_product / (norm_a * norm_b)).clamp(-1.0, 1.0)
    } else {
        0.0
    }
}
