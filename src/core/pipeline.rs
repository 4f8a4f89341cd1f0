use serde::Serialize;

use crate::core::embeddings::ImageEmbedder;
use crate::core::knn::Classifier;
use crate::core::loader::DatasetLoader;
use crate::error::{AppError, Result, Stage};
use crate::models::dataset::Dataset;
use crate::state::Config;

/// The outcome of one evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationResult {
    /// Validation samples whose predicted label matched the ground truth.
    pub correct: usize,
    /// Total validation samples scored.
    pub total: usize,
    /// `correct / total`; the empty-set guard means this is never NaN.
    pub accuracy: f64,
    /// Training images dropped under the skip-and-continue policy.
    pub train_skipped: usize,
    /// Validation images dropped under the skip-and-continue policy.
    pub validation_skipped: usize,
    /// When the run finished (RFC 3339).
    pub finished_at: String,
}

/// Orchestrates the strict linear sequence
/// load training → load validation → train → evaluate → report.
///
/// The embedding model and the classifier are black-box collaborators passed
/// in by the caller; the pipeline only sequences calls to them. There is no
/// retry and no stage overlap: any stage failure aborts the run. The
/// classifier's storage is released when [`run`](Self::run) ends, whether
/// the run succeeded or failed.
#[derive(Debug)]
pub struct EvaluationPipeline {
    config: Config,
    loader: DatasetLoader,
}

impl EvaluationPipeline {
    /// Creates a pipeline with its own loader built from `config`.
    pub fn new(config: Config) -> Self {
        let loader = DatasetLoader::new(config.clone());
        Self { config, loader }
    }

    /// Creates a pipeline around an existing loader (e.g. one carrying an
    /// external cancellation token).
    pub fn with_loader(config: Config, loader: DatasetLoader) -> Self {
        Self { config, loader }
    }

    /// Loads the training split from the configured path.
    pub async fn load_training(&self) -> Result<Dataset> {
        self.loader.load(&self.config.training_path).await
    }

    /// Loads the validation split from the configured path.
    pub async fn load_validation(&self) -> Result<Dataset> {
        self.loader.load(&self.config.validation_path).await
    }

    /// Runs the full pipeline: load both splits, train, evaluate, report.
    ///
    /// `classifier.dispose()` is invoked before this returns, on every path.
    pub async fn run<M, C>(&self, model: &M, classifier: &mut C) -> Result<EvaluationResult>
    where
        M: ImageEmbedder,
        C: Classifier,
    {
        let outcome = self.run_inner(model, classifier).await;
        classifier.dispose();
        outcome
    }

    async fn run_inner<M, C>(&self, model: &M, classifier: &mut C) -> Result<EvaluationResult>
    where
        M: ImageEmbedder,
        C: Classifier,
    {
        let training = self.load_training().await?;
        let validation = self.load_validation().await?;
        log::info!("[training] {} samples", training.len());
        log::info!("[validation] {} samples", validation.len());

        self.run_with_datasets(&training, &validation, model, classifier)
    }

    /// Trains and evaluates over already-loaded datasets.
    ///
    /// Matches the run contract for callers that materialize their own
    /// datasets; unlike [`run`](Self::run), disposal of the classifier is
    /// left to the caller.
    pub fn run_with_datasets<M, C>(
        &self,
        training: &Dataset,
        validation: &Dataset,
        model: &M,
        classifier: &mut C,
    ) -> Result<EvaluationResult>
    where
        M: ImageEmbedder,
        C: Classifier,
    {
        self.train(training, model, classifier)?;
        let mut result = self.evaluate(validation, model, classifier)?;
        result.train_skipped = training.stats.skipped;

        log::info!(
            "[accuracy] {:.4} ({}/{} correct)",
            result.accuracy,
            result.correct,
            result.total
        );
        Ok(result)
    }

    /// Feeds every training sample through the embedder into the classifier,
    /// strictly in dataset order.
    pub fn train<M, C>(&self, dataset: &Dataset, model: &M, classifier: &mut C) -> Result<()>
    where
        M: ImageEmbedder,
        C: Classifier,
    {
        for (index, sample) in dataset.iter().enumerate() {
            let embedding =
                model
                    .infer(&sample.image)
                    .map_err(|e| inference_error(Stage::Train, index, &sample.label, e))?;
            classifier.add_example(embedding, &sample.label);
        }
        log::debug!(
            "Trained classifier on {} examples",
            classifier.num_examples()
        );
        Ok(())
    }

    /// Scores every validation sample against the trained classifier,
    /// strictly in dataset order.
    ///
    /// # Errors
    ///
    /// `EmptyValidationSet` if the dataset holds no samples; `Inference`
    /// carrying the sample index and label if the embedder or classifier
    /// fails.
    pub fn evaluate<M, C>(
        &self,
        dataset: &Dataset,
        model: &M,
        classifier: &C,
    ) -> Result<EvaluationResult>
    where
        M: ImageEmbedder,
        C: Classifier,
    {
        if dataset.is_empty() {
            return Err(AppError::EmptyValidationSet);
        }

        let mut correct = 0usize;
        let mut total = 0usize;
        for (index, sample) in dataset.iter().enumerate() {
            let embedding =
                model
                    .infer(&sample.image)
                    .map_err(|e| inference_error(Stage::Evaluate, index, &sample.label, e))?;
            let prediction = classifier
                .predict(&embedding)
                .map_err(|e| inference_error(Stage::Evaluate, index, &sample.label, e))?;

            if prediction.label == sample.label {
                correct += 1;
            }
            total += 1;
            log::info!(
                "[prediction] label: {} predicted: {} confidence: {:.3}",
                sample.label,
                prediction.label,
                prediction.confidence
            );
        }

        Ok(EvaluationResult {
            correct,
            total,
            accuracy: correct as f64 / total as f64,
            train_skipped: 0,
            validation_skipped: dataset.stats.skipped,
            finished_at: chrono::Utc::now().to_rfc3339(),
        })
    }
}

fn inference_error(stage: Stage, index: usize, label: &str, err: AppError) -> AppError {
    AppError::Inference {
        stage,
        index,
        label: label.to_string(),
        reason: err.to_string(),
    }
}
