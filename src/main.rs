use imageknn::{init, Config, EvaluationPipeline, HistogramEmbedder, KnnClassifier, Result};

#[tokio::main]
async fn main() -> Result<()> {
    // Pick up a .env file if present, then build config from the environment
    dotenv::dotenv().ok();
    init()?;

    let config = Config::from_env()?;
    log::info!(
        "Evaluating {} against {} (image size {}, k={})",
        config.training_path,
        config.validation_path,
        config.image_size,
        config.k
    );

    let mut classifier = KnnClassifier::new(config.k);
    let embedder = HistogramEmbedder::default();
    let pipeline = EvaluationPipeline::new(config);

    let result = pipeline.run(&embedder, &mut classifier).await?;

    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}
