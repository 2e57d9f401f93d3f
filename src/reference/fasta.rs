use super::{clamp, ReferenceSource};
use crate::error::Result;
use bio::io::fasta::IndexedReader;
use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::Path;

const BLOCK_SIZE: u64 = 1 << 16;

/// Indexed FASTA reference (`.fai` next to the file).
///
/// Pileup statistics request bases in increasing position order, so the
/// reader keeps the last fetched block and serves neighbouring requests
/// from it.
pub struct FastaReference {
    reader: IndexedReader<File>,
    lengths: HashMap<String, u64>,
    block: Option<Block>,
}

struct Block {
    chrom: String,
    start: u64,
    seq: Vec<u8>,
}

impl Block {
    fn covers(&self, chrom: &str, start: u64, end: u64) -> bool {
        self.chrom == chrom && start >= self.start && end <= self.start + self.seq.len() as u64
    }
}

impl FastaReference {
    pub fn from_path(path: &Path) -> Result<Self> {
        let reader = IndexedReader::from_file(&path)?;
        let lengths = reader
            .index
            .sequences()
            .into_iter()
            .map(|s| (s.name, s.len))
            .collect();
        Ok(Self {
            reader,
            lengths,
            block: None,
        })
    }

    fn read(&mut self, chrom: &str, start: u64, end: u64) -> Result<Vec<u8>> {
        let mut seq = Vec::with_capacity((end - start) as usize);
        self.reader.fetch(chrom, start, end)?;
        self.reader.read(&mut seq)?;
        if (seq.len() as u64) < end - start {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!(
                    "{}:{}-{}: FASTA holds {} of {} bases listed in its index",
                    chrom,
                    start,
                    end,
                    seq.len(),
                    end - start
                ),
            )
            .into());
        }
        Ok(seq)
    }
}

impl ReferenceSource for FastaReference {
    fn contig_len(&self, chrom: &str) -> Option<u64> {
        self.lengths.get(chrom).copied()
    }

    fn fetch(&mut self, chrom: &str, start: u64, end: u64) -> Result<Vec<u8>> {
        let Some(len) = self.contig_len(chrom) else {
            return Ok(Vec::new());
        };
        let (start, end) = clamp(start, end, len);
        if start == end {
            return Ok(Vec::new());
        }

        if let Some(block) = self.block.as_ref().filter(|b| b.covers(chrom, start, end)) {
            let offset = (start - block.start) as usize;
            return Ok(block.seq[offset..offset + (end - start) as usize].to_vec());
        }
        if end - start > BLOCK_SIZE {
            return self.read(chrom, start, end);
        }

        let block_end = (start + BLOCK_SIZE).min(len);
        let seq = self.read(chrom, start, block_end)?;
        let out = seq[..(end - start) as usize].to_vec();
        self.block = Some(Block {
            chrom: chrom.to_string(),
            start,
            seq,
        });
        Ok(out)
    }
}
