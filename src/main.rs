use clap::Parser;
use statarb::cli::{Cli, Commands, RunCliConfig, SweepCliConfig};
use statarb::commands::{run_pipeline, run_threshold_sweep};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // RUST_LOG takes precedence over --verbose
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.verbose));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Run { args } => {
            let config = RunCliConfig::from_args(&args)?;
            run_pipeline(config)?;
        }
        Commands::Sweep {
            args,
            entries,
            exits,
        } => {
            let config = SweepCliConfig::from_args(&args, &entries, &exits)?;
            run_threshold_sweep(config)?;
        }
    }

    Ok(())
}
