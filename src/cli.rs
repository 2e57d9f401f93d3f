use clap::{ArgAction, Parser, Subcommand};
use pileup_stats::export::OutputFormat;
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Compute per-position statistics from an indexed BAM/CRAM file
    Stat {
        /// Statistics type (see `types`)
        stat_type: String,

        /// Indexed BAM or CRAM file
        alignments: PathBuf,

        /// Indexed reference FASTA; required by variation, baseq_ext and coverage_gc
        #[arg(short = 'f', long)]
        fasta: Option<PathBuf>,

        /// Region as chrom, chrom:start or chrom:start-end (all contigs if omitted)
        #[arg(short = 'r', long)]
        region: Option<String>,

        /// Region coordinates and output positions are one-based
        #[arg(long)]
        one_based: bool,

        /// Drop positions outside the region
        #[arg(long)]
        truncate: bool,

        /// Emit records for positions without coverage
        #[arg(long)]
        pad: bool,

        /// Maximum reads per position (default: 8000, or from config)
        #[arg(short = 'd', long)]
        max_depth: Option<u32>,

        /// GC window size for coverage_gc (default: 300, or from config)
        #[arg(long)]
        window_size: Option<i64>,

        /// GC window offset for coverage_gc (default: half the window size)
        #[arg(long, allow_hyphen_values = true)]
        window_offset: Option<i64>,

        /// Comma-separated subset of fields to write
        #[arg(long, value_delimiter = ',')]
        fields: Option<Vec<String>>,

        /// Output format (default: tsv, or from config)
        #[arg(long, value_enum)]
        format: Option<OutputFormat>,

        /// Output file, gzip compressed when it ends in .gz (stdout if omitted)
        #[arg(short = 'o', long = "output")]
        output: Option<PathBuf>,

        /// Do not show a progress spinner
        #[arg(long)]
        no_progress: bool,
    },

    /// List the statistics types and their fields
    Types,
}
