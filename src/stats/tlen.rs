use super::record::ColumnKind::{self, Float, Int};
use super::record::Value;
use super::tally::{PairCount, PairMoments, Tally};
use crate::pileup::Segment;

/// `tlen`: template length of paired reads whose mate is mapped.
#[derive(Debug, Default)]
pub(crate) struct TlenTally {
    reads: PairCount,
    paired: u64,
    tlen: PairMoments,
}

impl Tally for TlenTally {
    const COLUMNS: &'static [(&'static str, ColumnKind)] = &[
        ("reads_all", Int),
        ("reads_paired", Int),
        ("reads_pp", Int),
        ("mean_tlen", Float),
        ("mean_tlen_pp", Float),
        ("rms_tlen", Float),
        ("rms_tlen_pp", Float),
        ("std_tlen", Float),
        ("std_tlen_pp", Float),
    ];

    fn add(&mut self, segment: &Segment, _ref_base: u8) {
        let pp = segment.is_proper_pair();
        self.reads.add(pp);
        if segment.is_paired() && !segment.is_mate_unmapped() {
            self.paired += 1;
            self.tlen.add(segment.tlen, pp);
        }
    }

    fn values(&self, out: &mut Vec<Value>) {
        out.push(Value::Int(self.reads.all() as i64));
        out.push(Value::Int(self.paired as i64));
        out.push(Value::Int(self.reads.pp() as i64));

        self.tlen.push_with(out, |m| m.mean());
        self.tlen.push_with(out, |m| m.rms());
        self.tlen.push_with(out, |m| m.std());
    }
}
