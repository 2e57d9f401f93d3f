use super::{AlignmentSource, Columns, Contig, PileupColumn, Segment};
use crate::error::Result;
use crate::types::Interval;
use rust_htslib::bam::record::Cigar;
use rust_htslib::htslib::BAM_FPAIRED;
use std::collections::BTreeMap;
use std::sync::Arc;

/// A read held in memory, described the way a BAM record would be.
#[derive(Debug, Clone, PartialEq)]
pub struct AlignedRead {
    pub tid: u32,
    /// Zero-based leftmost reference position.
    pub pos: u64,
    pub cigar: Vec<Cigar>,
    pub seq: Vec<u8>,
    pub qual: Vec<u8>,
    pub flags: u16,
    pub mapq: u8,
    pub tlen: i64,
    pub mate_tid: Option<u32>,
}

impl AlignedRead {
    /// A fully matching read with base quality 30 and mapping quality 60.
    pub fn new(tid: u32, pos: u64, seq: &[u8]) -> Self {
        Self {
            tid,
            pos,
            cigar: vec![Cigar::Match(seq.len() as u32)],
            seq: seq.to_vec(),
            qual: vec![30; seq.len()],
            flags: 0,
            mapq: 60,
            tlen: 0,
            mate_tid: None,
        }
    }

    pub fn with_cigar(mut self, cigar: Vec<Cigar>) -> Self {
        self.cigar = cigar;
        self
    }

    pub fn with_qual(mut self, qual: Vec<u8>) -> Self {
        self.qual = qual;
        self
    }

    pub fn with_flags(mut self, flags: u16) -> Self {
        self.flags = flags;
        self
    }

    pub fn with_mapq(mut self, mapq: u8) -> Self {
        self.mapq = mapq;
        self
    }

    pub fn with_tlen(mut self, tlen: i64) -> Self {
        self.tlen = tlen;
        self
    }

    pub fn with_mate_tid(mut self, mate_tid: u32) -> Self {
        self.mate_tid = Some(mate_tid);
        self
    }

    /// Exclusive end of the alignment on the reference.
    pub fn ref_end(&self) -> u64 {
        self.pos
            + self
                .cigar
                .iter()
                .map(|op| match *op {
                    Cigar::Match(l)
                    | Cigar::Equal(l)
                    | Cigar::Diff(l)
                    | Cigar::Del(l)
                    | Cigar::RefSkip(l) => l as u64,
                    _ => 0,
                })
                .sum::<u64>()
    }

    fn overlaps(&self, iv: &Interval) -> bool {
        self.tid == iv.tid && self.pos < iv.end && self.ref_end() > iv.start
    }

    /// Per-position segments of this read, in reference order.
    fn segments(&self) -> Vec<(u64, Segment)> {
        let template = Segment {
            flags: self.flags,
            mapq: self.mapq,
            tlen: self.tlen,
            soft_clipped: self.cigar.iter().any(|op| matches!(op, Cigar::SoftClip(_))),
            mate_other_chr: self.flags as u32 & BAM_FPAIRED != 0
                && self.mate_tid.map_or(false, |mate| mate != self.tid),
            ..Segment::default()
        };

        let mut out = Vec::new();
        let mut ref_pos = self.pos;
        let mut qpos = 0usize;
        for (i, op) in self.cigar.iter().enumerate() {
            match *op {
                Cigar::Match(len) | Cigar::Equal(len) | Cigar::Diff(len) => {
                    let ins_follows = matches!(self.cigar.get(i + 1), Some(Cigar::Ins(_)));
                    for k in 0..len {
                        out.push((
                            ref_pos,
                            Segment {
                                base: self.seq.get(qpos).map(|b| b.to_ascii_uppercase()),
                                qual: self.qual.get(qpos).copied(),
                                insertion: ins_follows && k + 1 == len,
                                ..template.clone()
                            },
                        ));
                        ref_pos += 1;
                        qpos += 1;
                    }
                }
                Cigar::Del(len) | Cigar::RefSkip(len) => {
                    let is_refskip = matches!(op, Cigar::RefSkip(_));
                    for _ in 0..len {
                        out.push((
                            ref_pos,
                            Segment {
                                is_del: !is_refskip,
                                is_refskip,
                                ..template.clone()
                            },
                        ));
                        ref_pos += 1;
                    }
                }
                Cigar::Ins(len) | Cigar::SoftClip(len) => qpos += len as usize,
                Cigar::HardClip(_) | Cigar::Pad(_) => {}
            }
        }
        out
    }
}

/// Alignment source over reads held in memory.
///
/// Columns are assembled per call; reads contribute to a column in the
/// order of their leftmost position, as an htslib pileup would.
#[derive(Debug, Clone, Default)]
pub struct MemoryAlignments {
    contigs: Vec<Contig>,
    reads: Vec<AlignedRead>,
}

impl MemoryAlignments {
    pub fn new(contigs: &[(&str, u64)]) -> Self {
        Self {
            contigs: contigs
                .iter()
                .enumerate()
                .map(|(tid, (name, len))| Contig {
                    tid: tid as u32,
                    name: Arc::from(*name),
                    len: *len,
                })
                .collect(),
            reads: Vec::new(),
        }
    }

    pub fn push(&mut self, read: AlignedRead) {
        self.reads.push(read);
    }

    pub fn with_read(mut self, read: AlignedRead) -> Self {
        self.push(read);
        self
    }
}

impl AlignmentSource for MemoryAlignments {
    fn contigs(&self) -> Vec<Contig> {
        self.contigs.clone()
    }

    fn pileup(&mut self, target: Option<&Interval>, max_depth: u32) -> Result<Columns<'_>> {
        let mut reads: Vec<&AlignedRead> = self
            .reads
            .iter()
            .filter(|read| target.map_or(true, |iv| read.overlaps(iv)))
            .collect();
        reads.sort_by_key(|read| (read.tid, read.pos));

        let mut columns: BTreeMap<(u32, u64), Vec<Segment>> = BTreeMap::new();
        for read in reads {
            for (pos, segment) in read.segments() {
                let column = columns.entry((read.tid, pos)).or_default();
                if column.len() < max_depth as usize {
                    column.push(segment);
                }
            }
        }

        Ok(Box::new(columns.into_iter().map(
            |((tid, pos), segments)| -> Result<PileupColumn> {
                Ok(PileupColumn { tid, pos, segments })
            },
        )))
    }
}
