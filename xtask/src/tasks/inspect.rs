use anyhow::{Result, ensure};
use burn::{prelude::*, tensor::Distribution};
use clap::Args;
use unet_seg::ShapePlan;

use super::{ModelArgs, TaskBackend};

#[derive(Args, Debug)]
pub struct InspectArgs {
    #[command(flatten)]
    pub model: ModelArgs,

    #[arg(short, long, default_value_t = 1)]
    pub batch_size: usize,

    #[arg(long, default_value_t = 256)]
    pub height: usize,

    #[arg(long, default_value_t = 256)]
    pub width: usize,

    /// Also run a forward pass on random input and compare the shapes
    #[arg(long, action)]
    pub forward: bool,
}

pub fn run(args: &InspectArgs) -> Result<()> {
    let config = args.model.config()?;
    let input = [
        args.batch_size,
        config.in_channels,
        args.height,
        args.width,
    ];

    let plan = ShapePlan::new(&config, input)?;
    println!("{plan}");

    if !args.forward {
        return Ok(());
    }

    tracing::info!("Initializing device...");
    let device = Default::default();

    tracing::info!(
        "Creating U-Net model with {} base channels...",
        config.base_channels
    );
    let model = config.init::<TaskBackend>(&device);
    ensure!(
        model.num_params() == plan.num_params(),
        "model has {} parameters, expected {}",
        model.num_params(),
        plan.num_params()
    );

    let images = Tensor::<TaskBackend, 4>::random(input, Distribution::Normal(0.0, 1.0), &device);
    let output = model.try_forward(images)?;
    ensure!(
        output.dims() == plan.output(),
        "forward produced {:?}, expected {:?}",
        output.dims(),
        plan.output()
    );

    tracing::info!("Forward pass produced {:?}", output.dims());
    Ok(())
}
