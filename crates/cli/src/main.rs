mod args;
mod input;
mod output;
mod runner;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, EnvFilter};

use args::{Cli, Commands};
use runner::run_check;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Check {
            input,
            concurrency,
            timeout,
            max_block_size,
            output_format,
        } => {
            run_check(&input, concurrency, timeout, max_block_size, &output_format).await?;
        }
    }

    Ok(())
}

fn init_logging(verbose: u8) {
    let log_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level));

    // stdout carries the result lines
    fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
