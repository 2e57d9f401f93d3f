//! Alignment-side collaborators: pileup columns, the source trait and its
//! adapters, and the position iterator that drives record schemas.

pub mod bam;
pub mod iter;
pub mod memory;

use crate::error::Result;
use crate::types::Interval;
use rust_htslib::htslib::{
    BAM_FDUP, BAM_FMREVERSE, BAM_FMUNMAP, BAM_FPAIRED, BAM_FPROPER_PAIR, BAM_FREVERSE,
};
use std::sync::Arc;

pub use bam::BamSource;
pub use iter::PositionIter;
pub use memory::{AlignedRead, MemoryAlignments};

/// Name and length of a reference contig, as reported by an alignment source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Contig {
    pub tid: u32,
    pub name: Arc<str>,
    pub len: u64,
}

/// One read's contribution to a pileup column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Segment {
    pub flags: u16,
    pub mapq: u8,
    pub tlen: i64,
    /// Upper-cased base call; `None` for deletions and reference skips.
    pub base: Option<u8>,
    pub qual: Option<u8>,
    pub is_del: bool,
    pub is_refskip: bool,
    /// An insertion starts right after this position.
    pub insertion: bool,
    pub soft_clipped: bool,
    pub mate_other_chr: bool,
}

impl Segment {
    fn has_flag(&self, flag: u32) -> bool {
        self.flags as u32 & flag != 0
    }

    pub fn is_reverse(&self) -> bool {
        self.has_flag(BAM_FREVERSE)
    }

    pub fn is_paired(&self) -> bool {
        self.has_flag(BAM_FPAIRED)
    }

    pub fn is_proper_pair(&self) -> bool {
        self.has_flag(BAM_FPROPER_PAIR)
    }

    pub fn is_mate_unmapped(&self) -> bool {
        self.has_flag(BAM_FMUNMAP)
    }

    pub fn is_mate_reverse(&self) -> bool {
        self.has_flag(BAM_FMREVERSE)
    }

    pub fn is_duplicate(&self) -> bool {
        self.has_flag(BAM_FDUP)
    }
}

/// The segments overlapping one reference position.
#[derive(Debug, Clone, PartialEq)]
pub struct PileupColumn {
    pub tid: u32,
    pub pos: u64,
    pub segments: Vec<Segment>,
}

pub type Columns<'a> = Box<dyn Iterator<Item = Result<PileupColumn>> + 'a>;

/// A provider of pileup columns in forward reference order.
pub trait AlignmentSource {
    /// All contigs, in tid order.
    fn contigs(&self) -> Vec<Contig>;

    /// Columns for reads overlapping `target` (every contig when `None`),
    /// holding at most `max_depth` segments each. Columns of those reads
    /// that fall outside `target` may still be produced.
    fn pileup(&mut self, target: Option<&Interval>, max_depth: u32) -> Result<Columns<'_>>;

    fn contig(&self, name: &str) -> Option<Contig> {
        self.contigs().into_iter().find(|c| &*c.name == name)
    }
}
