use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod tasks;

#[derive(Parser)]
#[command(
    name = "unet-seg",
    about = "U-Net segmentation network toolkit",
    author,
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the stage shapes and parameter count of a network
    Inspect(tasks::inspect::InspectArgs),
    /// Initialize a network and write its weights and config
    Export(tasks::export::ExportArgs),
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("unet_seg=info,xtask=info")),
        )
        .init();

    let cli = Cli::parse();
    tracing::debug!("unet-seg {}", unet_seg::VERSION);

    match &cli.command {
        Commands::Inspect(args) => tasks::inspect::run(args),
        Commands::Export(args) => tasks::export::run(args),
    }
}
