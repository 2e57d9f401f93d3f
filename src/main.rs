mod cli;
mod commands;

use clap::Parser;
use log::{error, LevelFilter};

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .format_timestamp(None)
        .format_target(false)
        .init();
}

fn main() {
    let args = cli::Args::parse();
    init_logging(args.verbose);

    let result = match args.command {
        cli::Commands::Stat {
            stat_type,
            alignments,
            fasta,
            region,
            one_based,
            truncate,
            pad,
            max_depth,
            window_size,
            window_offset,
            fields,
            format,
            output,
            no_progress,
        } => commands::stat::run(commands::stat::StatArgs {
            stat_type,
            alignments,
            fasta,
            region,
            one_based,
            truncate,
            pad,
            max_depth,
            window_size,
            window_offset,
            fields,
            format,
            output,
            no_progress,
        }),
        cli::Commands::Types => commands::types::run(),
    };

    if let Err(e) = result {
        error!("{:#}", e);
        std::process::exit(1);
    }
}
