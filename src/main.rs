use anyhow::{Context, Result};
use clap::Parser;
use tokio::runtime::Runtime;

use signal_sniper::{Cli, run_app};

fn main() -> Result<()> {
    // A. Init Logging
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("Application panicked: {:?}", panic_info);
    }));
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    // B. Parse Args
    let args = Cli::parse();
    #[cfg(debug_assertions)]
    log::info!("Parsed arguments: {:?}", args);

    // C. Run until the command completes or Ctrl+C
    let rt = Runtime::new().context("Failed to create Tokio runtime")?;
    rt.block_on(run_app(args))
}
