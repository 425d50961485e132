use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "reachscan")]
#[command(version)]
#[command(about = "Bulk TCP reachability checker", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Probe every target/port pair listed in a CSV file
    Check {
        /// CSV file with a header row, then `target,ports` rows.
        /// Targets: 10.0.0.5, 10.0.0.0/24, fd00::/120 or example.com.
        /// Ports: empty (443), 22, or 80-8080 (the two ports 80 and 8080)
        #[arg(short, long, default_value = "data.csv")]
        input: PathBuf,

        /// Max probes in flight (default: no limit)
        #[arg(short, long)]
        concurrency: Option<usize>,

        /// Connect timeout in milliseconds
        #[arg(long, default_value = "3000")]
        timeout: u64,

        /// Largest address block a single row may expand to
        #[arg(long, default_value = "65536")]
        max_block_size: u128,

        /// Output format: text, json, csv
        #[arg(short, long, default_value = "text", value_parser = ["text", "json", "csv"])]
        output_format: String,
    },
}
