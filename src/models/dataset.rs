use image::DynamicImage;

/// One labeled image, fully decoded and resized before it exists.
#[derive(Debug, Clone)]
pub struct Sample {
    /// Decoded pixel data at the configured thumbnail size.
    pub image: DynamicImage,
    /// Ground-truth class name from the manifest.
    pub label: String,
}

/// Counters surfaced by the loader for one dataset split.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DatasetStats {
    /// Images successfully decoded into samples.
    pub loaded: usize,
    /// Images dropped under the skip-and-continue policy.
    pub skipped: usize,
}

/// An ordered sequence of samples assembled from one manifest.
///
/// Sample order follows manifest iteration order (label, then filename within
/// label). Order is not semantically required downstream but is kept
/// deterministic for reproducible runs.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    /// The samples, in manifest order.
    pub samples: Vec<Sample>,
    /// Load statistics for this split.
    pub stats: DatasetStats,
}

impl Dataset {
    /// Number of samples in the dataset.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Whether the dataset holds no samples.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Iterates samples in dataset order.
    pub fn iter(&self) -> std::slice::Iter<'_, Sample> {
        self.samples.iter()
    }
}
