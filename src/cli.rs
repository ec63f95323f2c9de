use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "vineguard",
    version,
    about = "Vineyard pest population and spray scheduling simulator"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Path to config.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Weather CSV (day,temperature,precipitation), overrides the config
    #[arg(short, long, global = true)]
    pub weather: Option<PathBuf>,

    /// Product table, overrides the config path
    #[arg(short, long, global = true)]
    pub products: Option<PathBuf>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Simulate the season and schedule treatments (default)
    Run {
        /// Write the schedule here (.csv or .json)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the run summary JSON here
        #[arg(short, long)]
        summary: Option<PathBuf>,
    },
    /// Validate config, weather and product table
    Check,
    /// List the product table in priority order
    Products,
    /// Run interactive setup
    Init,
}
