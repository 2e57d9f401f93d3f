use anyhow::Result;
use pileup_stats::stats::resolve_schema;
use pileup_stats::{PileupOptions, StatType};

pub fn run() -> Result<()> {
    let options = PileupOptions::default();
    for stat in StatType::ALL {
        let schema = resolve_schema(stat.name(), &options)?;
        let reference = if stat.requires_reference() {
            " (requires --fasta)"
        } else {
            ""
        };
        println!("{}{}", stat, reference);
        println!("    {}", schema.fields().join(", "));
    }
    Ok(())
}
