//! fuzzcorpus CLI: scan seed directories, replay them into a dynamic corpus, and validate
//! dictionary/blacklist files.

use anyhow::Result;
use clap::Parser;
use fuzzcorpus::cli::arg_parser::Cli;
use fuzzcorpus::cli::dispatch;
use fuzzcorpus::utils::setup_logging;
use std::time::Instant;

fn main() -> Result<()> {
    let start_time = Instant::now();
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    dispatch(&cli)?;

    log::debug!("Total time: {:?}", start_time.elapsed());
    Ok(())
}
