use anyhow::Result;
use clap::Parser;

use equity_analyzer::{Cli, run_cli};

fn main() -> Result<()> {
    // A. Parse Args
    let args = Cli::parse();

    // B. Init Logging
    let level = if args.debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();

    #[cfg(debug_assertions)]
    log::debug!("Parsed arguments: {:?}", args);

    // C. Run
    run_cli(&args)?;
    Ok(())
}
