use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "toll-etl")]
#[command(about = "Extract, consolidate and transform toll plaza traffic data")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[arg(short, long, global = true, help = "Enable verbose logging")]
    pub verbose: bool,

    #[arg(
        short,
        long,
        global = true,
        conflicts_with = "verbose",
        help = "Only log warnings and hide progress output"
    )]
    pub quiet: bool,

    #[arg(
        long,
        global = true,
        help = "Directory holding the unpacked sources and all stage outputs"
    )]
    pub staging_dir: Option<PathBuf>,

    #[arg(long, global = true, help = "Configuration file [default: ./toll-etl.toml]")]
    pub config: Option<PathBuf>,

    #[arg(
        long,
        global = true,
        help = "Fail consolidation when the extracts differ in length instead of truncating"
    )]
    pub strict_alignment: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Extract the first four columns of the vehicle CSV
    ExtractCsv,

    /// Extract axles, plaza id and plaza code from the toll plaza TSV
    ExtractTsv,

    /// Extract payment code and vehicle code from the fixed-width payment file
    ExtractFixedWidth,

    /// Merge the three extracts row by row
    Consolidate,

    /// Upper-case the vehicle type of the consolidated data
    Transform,

    /// Run every stage in dependency order
    Run {
        #[arg(long, help = "Run the extract stages one after another")]
        sequential: bool,

        #[arg(long, help = "Write the run report as JSON to this path")]
        report: Option<PathBuf>,
    },

    /// Show which artifacts exist in the staging directory
    Status,
}
