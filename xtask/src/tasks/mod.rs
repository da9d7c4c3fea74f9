pub mod export;
pub mod inspect;

use std::path::PathBuf;

use anyhow::{Result, anyhow};
use burn::config::Config;
use clap::Args;
use unet_seg::UNetConfig;

#[cfg(not(feature = "wgpu"))]
pub type TaskBackend = burn::backend::NdArray;

#[cfg(feature = "wgpu")]
pub type TaskBackend = burn::backend::Wgpu<f32, i32>;

/// Network hyperparameters, either from flags or from a saved config.
#[derive(Args, Debug)]
pub struct ModelArgs {
    /// JSON config written by `export`; overrides the other model flags
    #[arg(long)]
    pub config: Option<PathBuf>,

    #[arg(long, default_value_t = 3)]
    pub in_channels: usize,

    #[arg(long, default_value_t = 2)]
    pub num_classes: usize,

    #[arg(long, default_value_t = 64)]
    pub base_channels: usize,
}

impl ModelArgs {
    pub fn config(&self) -> Result<UNetConfig> {
        let config = match &self.config {
            Some(path) => {
                tracing::info!("Loading model config from {}", path.display());
                UNetConfig::load(path)
                    .map_err(|err| anyhow!("Failed to load {}: {err:?}", path.display()))?
            }
            None => UNetConfig::new(self.in_channels, self.num_classes)
                .with_base_channels(self.base_channels),
        };

        config.validate()?;
        Ok(config)
    }
}
