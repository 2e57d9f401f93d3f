use super::record::ColumnKind::{self, Int};
use super::record::Value;
use super::tally::{PairCount, Tally};
use crate::pileup::Segment;

/// `coverage`: depth and properly paired depth.
#[derive(Debug, Default)]
pub(crate) struct CoverageTally {
    reads: PairCount,
}

impl Tally for CoverageTally {
    const COLUMNS: &'static [(&'static str, ColumnKind)] = &[("reads_all", Int), ("reads_pp", Int)];

    fn add(&mut self, segment: &Segment, _ref_base: u8) {
        self.reads.add(segment.is_proper_pair());
    }

    fn values(&self, out: &mut Vec<Value>) {
        self.reads.push(out);
    }
}

/// `coverage_ext`: coverage plus mate-placement and read-level flags.
///
/// Mate placement is counted for paired reads only, first matching class
/// wins: mate unmapped, mate on another contig, mate on the same strand,
/// pair facing away from each other.
#[derive(Debug, Default)]
pub(crate) struct CoverageExtTally {
    coverage: CoverageTally,
    mate_unmapped: u64,
    mate_other_chr: u64,
    mate_same_strand: u64,
    faceaway: u64,
    softclipped: u64,
    duplicate: u64,
}

impl Tally for CoverageExtTally {
    const COLUMNS: &'static [(&'static str, ColumnKind)] = &[
        ("reads_all", Int),
        ("reads_pp", Int),
        ("reads_mate_unmapped", Int),
        ("reads_mate_other_chr", Int),
        ("reads_mate_same_strand", Int),
        ("reads_faceaway", Int),
        ("reads_softclipped", Int),
        ("reads_duplicate", Int),
    ];

    fn add(&mut self, segment: &Segment, ref_base: u8) {
        self.coverage.add(segment, ref_base);

        if segment.is_paired() {
            let reverse = segment.is_reverse();
            if segment.is_mate_unmapped() {
                self.mate_unmapped += 1;
            } else if segment.mate_other_chr {
                self.mate_other_chr += 1;
            } else if reverse == segment.is_mate_reverse() {
                self.mate_same_strand += 1;
            } else if (reverse && segment.tlen > 0) || (!reverse && segment.tlen < 0) {
                self.faceaway += 1;
            }
        }
        if segment.soft_clipped {
            self.softclipped += 1;
        }
        if segment.is_duplicate() {
            self.duplicate += 1;
        }
    }

    fn values(&self, out: &mut Vec<Value>) {
        self.coverage.values(out);
        out.extend(
            [
                self.mate_unmapped,
                self.mate_other_chr,
                self.mate_same_strand,
                self.faceaway,
                self.softclipped,
                self.duplicate,
            ]
            .map(|v| Value::Int(v as i64)),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_htslib::htslib::{
        BAM_FDUP, BAM_FMREVERSE, BAM_FMUNMAP, BAM_FPAIRED, BAM_FPROPER_PAIR, BAM_FREVERSE,
    };

    fn seg(flags: u32, tlen: i64) -> Segment {
        Segment {
            flags: flags as u16,
            tlen,
            base: Some(b'A'),
            ..Segment::default()
        }
    }

    fn tally<T: Tally>(segments: &[Segment]) -> Vec<Value> {
        let mut t = T::default();
        segments.iter().for_each(|s| t.add(s, b'N'));
        let mut out = Vec::new();
        t.values(&mut out);
        out
    }

    #[test]
    fn counts_proper_pairs() {
        let values = tally::<CoverageTally>(&[
            seg(BAM_FPAIRED | BAM_FPROPER_PAIR, 300),
            seg(BAM_FPAIRED, 300),
            seg(0, 0),
        ]);
        assert_eq!(values, vec![Value::Int(3), Value::Int(1)]);
    }

    #[test]
    fn classifies_mate_placement() {
        let mut other_chr = seg(BAM_FPAIRED | BAM_FMREVERSE, 0);
        other_chr.mate_other_chr = true;
        let mut clipped_dup = seg(BAM_FDUP, 0);
        clipped_dup.soft_clipped = true;

        let values = tally::<CoverageExtTally>(&[
            seg(BAM_FPAIRED | BAM_FMUNMAP, 0),
            other_chr,
            seg(BAM_FPAIRED | BAM_FREVERSE | BAM_FMREVERSE, -200),
            seg(BAM_FPAIRED | BAM_FMREVERSE, -200),
            seg(BAM_FPAIRED | BAM_FREVERSE, 200),
            seg(BAM_FPAIRED | BAM_FMREVERSE | BAM_FPROPER_PAIR, 200),
            clipped_dup,
        ]);
        let ints: Vec<i64> = values.iter().filter_map(Value::as_i64).collect();
        assert_eq!(ints, vec![7, 1, 1, 1, 1, 2, 1, 1]);
    }
}
