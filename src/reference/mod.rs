//! Reference-sequence collaborators used by the `variation*`, `baseq_ext*`
//! and `coverage_gc` statistics.

mod fasta;

use crate::error::Result;
use std::collections::HashMap;

pub use fasta::FastaReference;

/// Random access to reference bases. Coordinates are zero-based.
pub trait ReferenceSource {
    fn contig_len(&self, chrom: &str) -> Option<u64>;

    /// Bases in `[start, end)`, clamped to the contig. Unknown contigs and
    /// windows entirely outside it yield an empty sequence.
    fn fetch(&mut self, chrom: &str, start: u64, end: u64) -> Result<Vec<u8>>;

    /// Upper-cased base at `pos`, `N` when out of bounds.
    fn base(&mut self, chrom: &str, pos: u64) -> Result<u8> {
        Ok(self
            .fetch(chrom, pos, pos + 1)?
            .first()
            .map_or(b'N', |b| b.to_ascii_uppercase()))
    }
}

/// Clamp `[start, end)` to a contig of `len` bases.
pub(crate) fn clamp(start: u64, end: u64, len: u64) -> (u64, u64) {
    let end = end.min(len);
    (start.min(end), end)
}

/// Reference sequences held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryReference {
    sequences: HashMap<String, Vec<u8>>,
}

impl MemoryReference {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_sequence(mut self, chrom: &str, seq: &[u8]) -> Self {
        self.sequences.insert(chrom.to_string(), seq.to_vec());
        self
    }
}

impl ReferenceSource for MemoryReference {
    fn contig_len(&self, chrom: &str) -> Option<u64> {
        self.sequences.get(chrom).map(|s| s.len() as u64)
    }

    fn fetch(&mut self, chrom: &str, start: u64, end: u64) -> Result<Vec<u8>> {
        let Some(seq) = self.sequences.get(chrom) else {
            return Ok(Vec::new());
        };
        let (start, end) = clamp(start, end, seq.len() as u64);
        Ok(seq[start as usize..end as usize].to_vec())
    }
}
