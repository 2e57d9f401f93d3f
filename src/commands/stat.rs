use anyhow::{Context, Result};
use log::info;
use pileup_stats::config::Config;
use pileup_stats::export::{create_output, OutputFormat, RecordWriter};
use pileup_stats::utils::progress_manager::ProgressManager;
use pileup_stats::{stat_pileup, BamSource, FastaReference, PileupOptions, ReferenceSource, Region};
use std::path::PathBuf;

pub struct StatArgs {
    pub stat_type: String,
    pub alignments: PathBuf,
    pub fasta: Option<PathBuf>,
    pub region: Option<String>,
    pub one_based: bool,
    pub truncate: bool,
    pub pad: bool,
    pub max_depth: Option<u32>,
    pub window_size: Option<i64>,
    pub window_offset: Option<i64>,
    pub fields: Option<Vec<String>>,
    pub format: Option<OutputFormat>,
    pub output: Option<PathBuf>,
    pub no_progress: bool,
}

impl StatArgs {
    fn options(&self, config: &Config) -> Result<PileupOptions> {
        let mut options = PileupOptions::default()
            .with_one_based(self.one_based)
            .with_truncate(self.truncate)
            .with_pad(self.pad)
            .with_max_depth(self.max_depth.unwrap_or(config.max_depth))
            .with_window(self.window_size.unwrap_or(config.window_size), self.window_offset);
        if let Some(region) = &self.region {
            let region: Region = region
                .parse()
                .with_context(|| format!("Failed to parse region '{}'", region))?;
            options = options.with_region(region);
        }
        Ok(options)
    }
}

pub fn run(args: StatArgs) -> Result<()> {
    let config = Config::load();
    let options = args.options(&config)?;
    let format = args.format.unwrap_or(config.format);

    let mut alignments = BamSource::from_path(&args.alignments, args.fasta.as_deref())
        .with_context(|| format!("Failed to open alignments {}", args.alignments.display()))?;
    let mut fasta = match &args.fasta {
        Some(path) => Some(
            FastaReference::from_path(path)
                .with_context(|| format!("Failed to open reference {}", path.display()))?,
        ),
        None => None,
    };
    let reference = fasta.as_mut().map(|f| f as &mut dyn ReferenceSource);

    let records = stat_pileup(&args.stat_type, &mut alignments, reference, &options)?;
    let out = create_output(args.output.as_deref())?;
    let mut writer = RecordWriter::new(
        out,
        format,
        &args.stat_type,
        records.fields(),
        args.fields.as_deref(),
    )?;

    let progress = if args.no_progress {
        ProgressManager::hidden()
    } else {
        ProgressManager::new()
    };
    let spinner = progress.add_spinner(&args.stat_type);

    for record in records {
        let record = record.context("Failed to compute statistics")?;
        writer.write(&record)?;
        spinner.inc(1);
    }
    let written = writer.finish()?;
    spinner.finish_and_clear();

    info!("{}: wrote {} records", args.stat_type, written);
    Ok(())
}
