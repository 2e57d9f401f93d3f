// src/utils/bam_reader.rs
use crate::error::Result;
use log::warn;
use rust_htslib::bam;
use std::path::Path;

pub struct BamReaderFactory;

impl BamReaderFactory {
    /// Open an indexed BAM or CRAM file. Without `reference_path`, CRAM
    /// decoding falls back to htslib's `REF_PATH`/`REF_CACHE` lookup.
    pub fn open_indexed(
        bam_path: &Path,
        reference_path: Option<&Path>,
    ) -> Result<bam::IndexedReader> {
        let mut reader = bam::IndexedReader::from_path(bam_path)?;
        match reference_path {
            Some(ref_path) => reader.set_reference(ref_path)?,
            None if is_cram(bam_path) => warn!(
                "{}: no reference given for CRAM input, relying on REF_PATH",
                bam_path.display()
            ),
            None => {}
        }
        Ok(reader)
    }
}

fn is_cram(path: &Path) -> bool {
    path.extension()
        .map_or(false, |ext| ext.eq_ignore_ascii_case("cram"))
}
