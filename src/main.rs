use anyhow::{Context, Result};
use clap::Parser;
use mailing_list::*;
use std::io::{stdout, BufWriter};
use tracing::info;

mod cli;

use cli::Cli;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    cli.index_config()
        .validate()
        .context("invalid index settings")?;
    cli.read_config()
        .validate()
        .context("invalid read settings")?;

    let processed = process_input(
        cli.input.clone(),
        cli.mode(),
        cli.read_config(),
        cli.index_config(),
        BufWriter::new(stdout()),
    )
    .await;

    // The stdin reader may still be parked on a read; exit without waiting on it
    match processed {
        Ok(processed) => {
            let report = processed.report;
            info!(
                "read {}, stored {}, duplicates {}, found {}",
                report.read, report.stored, report.duplicates, report.found
            );
            if processed.interrupted {
                eprintln!("Interrupted");
                std::process::exit(130);
            }
            Ok(())
        }
        Err(err) => {
            eprintln!("Error: {}", err);
            std::process::exit(1);
        }
    }
}
