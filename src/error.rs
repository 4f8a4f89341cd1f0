use serde::Serialize;

/// Pipeline stage in which a failure occurred, attached to errors for
/// diagnosability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Stage {
    /// Loading a dataset from a manifest
    Load,
    /// Feeding training samples into the classifier
    Train,
    /// Scoring the validation set
    Evaluate,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Load => write!(f, "load"),
            Stage::Train => write!(f, "train"),
            Stage::Evaluate => write!(f, "evaluate"),
        }
    }
}

/// Main error type for the application
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// I/O errors (file operations, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Image decoding/processing errors
    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The manifest file could not be fetched at all
    #[error("Manifest unreachable at {path}: {reason}")]
    ManifestUnreachable {
        /// Path or URL of the manifest that failed to resolve.
        path: String,
        /// Underlying fetch failure.
        reason: String,
    },

    /// The manifest body is not a valid label-to-filenames mapping
    #[error("Manifest parse error at {path}: {reason}")]
    ManifestParse {
        /// Path or URL of the offending manifest.
        path: String,
        /// What was wrong with the document.
        reason: String,
    },

    /// An individual image failed to fetch or decode
    #[error("Image load error at {path}: {reason}")]
    ImageLoad {
        /// Path or URL of the offending image.
        path: String,
        /// Underlying fetch/decode failure.
        reason: String,
    },

    /// The embedder or classifier failed on a specific sample
    #[error("Inference error in {stage} stage at sample {index} (label {label}): {reason}")]
    Inference {
        /// Stage in which the collaborator failed.
        stage: Stage,
        /// Zero-based index of the offending sample within its dataset.
        index: usize,
        /// Ground-truth label of the offending sample.
        label: String,
        /// Underlying collaborator failure.
        reason: String,
    },

    /// Accuracy was requested over zero validation samples
    #[error("Validation set is empty; cannot compute accuracy")]
    EmptyValidationSet,

    /// The run was cancelled between loader iterations
    #[error("Operation cancelled")]
    Cancelled,

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<tokio::task::JoinError> for AppError {
    fn from(err: tokio::task::JoinError) -> Self {
        AppError::Config(format!("Task join error: {}", err))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Config(err.to_string())
    }
}

/// Result type alias for the application
pub type Result<T> = std::result::Result<T, AppError>;

/// Extension trait for working with Results
pub trait ResultExt<T> {
    /// Add context to an error
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static;

    /// Add context to an error, computing it lazily
    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C;
}

impl<T, E> ResultExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn context<C>(self, context: C) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
    {
        self.map_err(|e| AppError::Config(format!("{}: {}", context, e)))
    }

    fn with_context<C, F>(self, f: F) -> Result<T>
    where
        C: std::fmt::Display + Send + Sync + 'static,
        F: FnOnce() -> C,
    {
        self.map_err(|e| {
            let context = f();
            AppError::Config(format!("{}: {}", context, e))
        })
    }
}
