use super::record::ColumnKind::{self, Float, Int};
use super::record::Value;
use super::tally::{PairCount, PairMoments, Tally};
use crate::pileup::Segment;

/// `mapq`: mapping quality over every segment in the column.
#[derive(Debug, Default)]
pub(crate) struct MapqTally {
    reads: PairCount,
    mapq0: PairCount,
    mapq: PairMoments,
}

impl Tally for MapqTally {
    const COLUMNS: &'static [(&'static str, ColumnKind)] = &[
        ("reads_all", Int),
        ("reads_pp", Int),
        ("reads_mapq0", Int),
        ("reads_mapq0_pp", Int),
        ("mean_mapq", Float),
        ("mean_mapq_pp", Float),
        ("rms_mapq", Float),
        ("rms_mapq_pp", Float),
        ("std_mapq", Float),
        ("std_mapq_pp", Float),
        ("max_mapq", Int),
        ("max_mapq_pp", Int),
    ];

    fn add(&mut self, segment: &Segment, _ref_base: u8) {
        let pp = segment.is_proper_pair();
        self.reads.add(pp);
        if segment.mapq == 0 {
            self.mapq0.add(pp);
        }
        self.mapq.add(segment.mapq as i64, pp);
    }

    fn values(&self, out: &mut Vec<Value>) {
        self.reads.push(out);
        self.mapq0.push(out);
        self.mapq.push_with(out, |m| m.mean());
        self.mapq.push_with(out, |m| m.rms());
        self.mapq.push_with(out, |m| m.std());
        out.push(Value::Int(self.mapq.all.max()));
        out.push(Value::Int(self.mapq.pp.max()));
    }
}
