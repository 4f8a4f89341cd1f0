use std::path::Path;
use std::time::Duration;

use image::{DynamicImage, RgbImage};
use tempfile::TempDir;

use imageknn::{
    AppError, Classifier, Config, DatasetLoader, EvaluationPipeline, HistogramEmbedder,
    ImageErrorPolicy, KnnClassifier,
};

fn write_solid_png(path: &Path, rgb: [u8; 3]) {
    let mut imgbuf = RgbImage::new(8, 8);
    for pixel in imgbuf.pixels_mut() {
        *pixel = image::Rgb(rgb);
    }
    DynamicImage::ImageRgb8(imgbuf).save(path).unwrap();
}

/// Builds `<dir>/<name>.json` plus the image tree it describes.
fn write_split(dir: &Path, name: &str, manifest: &str, images: &[(&str, &str, [u8; 3])]) -> String {
    let base = dir.join(name);
    std::fs::write(dir.join(format!("{}.json", name)), manifest).unwrap();
    for (label, file, rgb) in images {
        let label_dir = base.join(label);
        std::fs::create_dir_all(&label_dir).unwrap();
        write_solid_png(&label_dir.join(file), *rgb);
    }
    base.to_str().unwrap().to_string()
}

fn quick_config() -> Config {
    Config {
        load_delay: Duration::ZERO,
        ..Config::default()
    }
}

#[tokio::test]
async fn test_load_preserves_manifest_order() {
    let dir = TempDir::new().unwrap();
    let base = write_split(
        dir.path(),
        "x",
        r#"{"a": ["1.png"], "b": ["2.png", "3.png"]}"#,
        &[
            ("a", "1.png", [200, 10, 10]),
            ("b", "2.png", [10, 200, 10]),
            ("b", "3.png", [10, 10, 200]),
        ],
    );

    let loader = DatasetLoader::new(quick_config());
    let dataset = loader.load(&base).await.unwrap();

    assert_eq!(dataset.len(), 3);
    assert_eq!(dataset.stats.loaded, 3);
    assert_eq!(dataset.stats.skipped, 0);
    let labels: Vec<_> = dataset.iter().map(|s| s.label.as_str()).collect();
    assert_eq!(labels, vec!["a", "b", "b"]);

    // Every sample is decoded and resized to the configured thumbnail size
    // before it enters the dataset.
    for sample in dataset.iter() {
        assert_eq!(sample.image.width(), 30);
        assert_eq!(sample.image.height(), 30);
    }
}

#[tokio::test]
async fn test_skip_policy_counts_corrupt_images() {
    let dir = TempDir::new().unwrap();
    let base = write_split(
        dir.path(),
        "x",
        r#"{"cat": ["good.png", "bad.png", "also_good.png"]}"#,
        &[
            ("cat", "good.png", [200, 10, 10]),
            ("cat", "also_good.png", [10, 200, 10]),
        ],
    );
    std::fs::write(
        Path::new(&base).join("cat").join("bad.png"),
        b"this is not an image",
    )
    .unwrap();

    let loader = DatasetLoader::new(quick_config());
    let dataset = loader.load(&base).await.unwrap();

    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.stats.loaded, 2);
    assert_eq!(dataset.stats.skipped, 1);
}

#[tokio::test]
async fn test_abort_policy_fails_on_corrupt_image() {
    let dir = TempDir::new().unwrap();
    let base = write_split(dir.path(), "x", r#"{"cat": ["bad.png"]}"#, &[]);
    let cat_dir = Path::new(&base).join("cat");
    std::fs::create_dir_all(&cat_dir).unwrap();
    std::fs::write(cat_dir.join("bad.png"), b"this is not an image").unwrap();

    let config = Config {
        on_image_error: ImageErrorPolicy::Abort,
        ..quick_config()
    };
    let loader = DatasetLoader::new(config);
    let err = loader.load(&base).await.unwrap_err();
    assert!(matches!(err, AppError::ImageLoad { .. }));
}

#[tokio::test]
async fn test_missing_manifest_is_unreachable() {
    let dir = TempDir::new().unwrap();
    let base = dir.path().join("nope");

    let loader = DatasetLoader::new(quick_config());
    let err = loader.load(base.to_str().unwrap()).await.unwrap_err();
    assert!(matches!(err, AppError::ManifestUnreachable { .. }));
}

#[tokio::test]
async fn test_malformed_manifest_is_parse_error() {
    let dir = TempDir::new().unwrap();
    std::fs::write(dir.path().join("x.json"), r#"{"cat": "not-an-array"}"#).unwrap();
    let base = dir.path().join("x");

    let loader = DatasetLoader::new(quick_config());
    let err = loader.load(base.to_str().unwrap()).await.unwrap_err();
    assert!(matches!(err, AppError::ManifestParse { .. }));
}

#[tokio::test]
async fn test_full_pipeline_end_to_end() {
    let dir = TempDir::new().unwrap();
    let training = write_split(
        dir.path(),
        "training",
        r#"{"red": ["1.png"], "blue": ["1.png", "2.png"]}"#,
        &[
            ("red", "1.png", [240, 10, 10]),
            ("blue", "1.png", [10, 10, 240]),
            ("blue", "2.png", [20, 20, 230]),
        ],
    );
    let validation = write_split(
        dir.path(),
        "validation",
        r#"{"red": ["v.png"], "blue": ["v.png"]}"#,
        &[
            ("red", "v.png", [230, 20, 15]),
            ("blue", "v.png", [15, 20, 230]),
        ],
    );

    let config = Config {
        training_path: training,
        validation_path: validation,
        k: 1,
        ..quick_config()
    };
    let mut classifier = KnnClassifier::new(config.k);
    let pipeline = EvaluationPipeline::new(config);

    let result = pipeline
        .run(&HistogramEmbedder::new(4), &mut classifier)
        .await
        .unwrap();

    assert_eq!(result.total, 2);
    assert_eq!(result.correct, 2);
    assert_eq!(result.accuracy, 1.0);
    assert_eq!(result.train_skipped, 0);
    assert_eq!(result.validation_skipped, 0);
    // The pipeline releases the classifier's storage after the run.
    assert_eq!(classifier.num_examples(), 0);
}

#[tokio::test]
async fn test_empty_validation_set_is_fatal() {
    let dir = TempDir::new().unwrap();
    let training = write_split(
        dir.path(),
        "training",
        r#"{"red": ["1.png"]}"#,
        &[("red", "1.png", [240, 10, 10])],
    );
    let validation = write_split(dir.path(), "validation", "{}", &[]);

    let config = Config {
        training_path: training,
        validation_path: validation,
        ..quick_config()
    };
    let mut classifier = KnnClassifier::new(1);
    let pipeline = EvaluationPipeline::new(config);

    let err = pipeline
        .run(&HistogramEmbedder::default(), &mut classifier)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::EmptyValidationSet));
    // Disposal happens on the failure path too.
    assert_eq!(classifier.num_examples(), 0);
}

#[tokio::test]
async fn test_pipeline_is_idempotent_across_runs() {
    let dir = TempDir::new().unwrap();
    let training = write_split(
        dir.path(),
        "training",
        r#"{"red": ["1.png"], "blue": ["1.png"]}"#,
        &[
            ("red", "1.png", [240, 10, 10]),
            ("blue", "1.png", [10, 10, 240]),
        ],
    );
    let validation = write_split(
        dir.path(),
        "validation",
        r#"{"red": ["v.png"], "blue": ["v.png"]}"#,
        &[
            ("red", "v.png", [235, 15, 10]),
            ("blue", "v.png", [10, 15, 235]),
        ],
    );

    let config = Config {
        training_path: training,
        validation_path: validation,
        k: 1,
        ..quick_config()
    };
    let pipeline = EvaluationPipeline::new(config);
    let embedder = HistogramEmbedder::new(4);

    let mut c1 = KnnClassifier::new(1);
    let r1 = pipeline.run(&embedder, &mut c1).await.unwrap();
    let mut c2 = KnnClassifier::new(1);
    let r2 = pipeline.run(&embedder, &mut c2).await.unwrap();

    assert_eq!(r1.correct, r2.correct);
    assert_eq!(r1.total, r2.total);
    assert_eq!(r1.accuracy, r2.accuracy);
}
