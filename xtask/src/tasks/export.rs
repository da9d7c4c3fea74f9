use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use burn::{prelude::*, record::CompactRecorder};
use clap::Args;

use super::{ModelArgs, TaskBackend};

#[derive(Args, Debug)]
pub struct ExportArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    #[arg(short, long, default_value = "artifacts")]
    pub artifact_dir: PathBuf,

    #[arg(long, default_value_t = 42)]
    pub seed: u64,
}

pub fn run(args: &ExportArgs) -> Result<()> {
    let config = args.model.config()?;

    std::fs::create_dir_all(&args.artifact_dir).with_context(|| {
        format!(
            "Failed to create artifact directory {}",
            args.artifact_dir.display()
        )
    })?;

    tracing::info!("Initializing device...");
    let device = Default::default();

    TaskBackend::seed(args.seed);

    tracing::info!(
        "Creating U-Net model with {} base channels...",
        config.base_channels
    );
    let model = config.init::<TaskBackend>(&device);
    tracing::info!("Model has {} parameters", model.num_params());

    let config_path = args.artifact_dir.join("config.json");
    config
        .save(&config_path)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    let model_path = args.artifact_dir.join("model");
    tracing::info!("Saving model record to {}...", model_path.display());
    model
        .save_file(model_path.clone(), &CompactRecorder::new())
        .map_err(|err| anyhow!("Failed to save model: {err:?}"))?;

    tracing::info!("Export completed successfully!");
    Ok(())
}
