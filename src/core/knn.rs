use std::collections::HashMap;

use serde::Serialize;

use crate::core::embeddings::{cosine_similarity, Embedding};
use crate::error::{AppError, Result};

/// A predicted label and the classifier's confidence in it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    /// The predicted class label.
    pub label: String,
    /// Confidence in `[0, 1]`; for k-NN, the fraction of neighbors voting
    /// for the winning label.
    pub confidence: f32,
}

/// The classifier collaborator seam.
///
/// The pipeline only requires storing labeled embeddings and predicting a
/// label for a query; any nearest-neighbor (or other) classifier satisfying
/// this contract is substitutable.
pub trait Classifier {
    /// Stores one training example.
    fn add_example(&mut self, embedding: Embedding, label: &str);

    /// Predicts a label for a query embedding.
    fn predict(&self, embedding: &Embedding) -> Result<Prediction>;

    /// Number of stored training examples.
    fn num_examples(&self) -> usize;

    /// Releases the classifier's internal storage. Called by the pipeline
    /// when a run ends, whether it succeeded or failed.
    fn dispose(&mut self);
}

/// A cosine-similarity k-nearest-neighbor classifier.
///
/// Examples are kept in insertion order. Prediction finds the `k` stored
/// embeddings most similar to the query and takes a majority vote; ties go to
/// the label whose best neighbor is more similar.
#[derive(Debug, Default)]
pub struct KnnClassifier {
    k: usize,
    examples: Vec<(Embedding, String)>,
}

impl KnnClassifier {
    /// Creates a classifier consulting `k` neighbors per prediction.
    pub fn new(k: usize) -> Self {
        Self {
            k: k.max(1),
            examples: Vec::new(),
        }
    }
}

impl Classifier for KnnClassifier {
    fn add_example(&mut self, embedding: Embedding, label: &str) {
        self.examples.push((embedding, label.to_string()));
    }

    fn predict(&self, embedding: &Embedding) -> Result<Prediction> {
        if self.examples.is_empty() {
            return Err(AppError::Config(
                "cannot predict: classifier holds no training examples".to_string(),
            ));
        }

        let mut scored: Vec<(f32, &str)> = self
            .examples
            .iter()
            .map(|(stored, label)| (cosine_similarity(stored, embedding), label.as_str()))
            .collect();
        // Sort is stable, so equal similarities keep insertion order.
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));

        let neighbors = &scored[..self.k.min(scored.len())];

        let mut votes: HashMap<&str, (usize, f32)> = HashMap::new();
        for &(similarity, label) in neighbors {
            let entry = votes.entry(label).or_insert((0, similarity));
            entry.0 += 1;
            if similarity > entry.1 {
                entry.1 = similarity;
            }
        }

        // Ties break on vote count, then best similarity, then label, so
        // predictions are reproducible across runs.
        let (label, (count, _)) = votes
            .into_iter()
            .max_by(|a, b| {
                a.1 .0
                    .cmp(&b.1 .0)
                    .then(a.1 .1.partial_cmp(&b.1 .1).unwrap_or(std::cmp::Ordering::Equal))
                    .then_with(|| b.0.cmp(a.0))
            })
            .ok_or_else(|| AppError::Config("empty neighbor set".to_string()))?;

        Ok(Prediction {
            label: label.to_string(),
            confidence: count as f32 / neighbors.len() as f32,
        })
    }

    fn num_examples(&self) -> usize {
        self.examples.len()
    }

    fn dispose(&mut self) {
        self.examples.clear();
        self.examples.shrink_to_fit();
    }
}
