use super::record::ColumnKind::{self, Float, Int};
use super::record::Value;
use super::tally::{PairCount, PairMoments, Tally};
use crate::pileup::Segment;

/// `baseq`: base quality of segments with a base call at this position.
#[derive(Debug, Default)]
pub(crate) struct BaseqTally {
    reads: PairCount,
    baseq: PairMoments,
}

impl BaseqTally {
    /// Base call and its quality, when the segment has both.
    fn called(segment: &Segment) -> Option<(u8, i64)> {
        match (segment.base, segment.qual) {
            (Some(base), Some(qual)) => Some((base, qual as i64)),
            _ => None,
        }
    }
}

impl Tally for BaseqTally {
    const COLUMNS: &'static [(&'static str, ColumnKind)] = &[
        ("reads_all", Int),
        ("reads_pp", Int),
        ("mean_baseq", Float),
        ("mean_baseq_pp", Float),
        ("rms_baseq", Float),
        ("rms_baseq_pp", Float),
        ("std_baseq", Float),
        ("std_baseq_pp", Float),
    ];

    fn add(&mut self, segment: &Segment, _ref_base: u8) {
        let pp = segment.is_proper_pair();
        self.reads.add(pp);
        if let Some((_, qual)) = Self::called(segment) {
            self.baseq.add(qual, pp);
        }
    }

    fn values(&self, out: &mut Vec<Value>) {
        self.reads.push(out);
        self.baseq.push_with(out, |m| m.mean());
        self.baseq.push_with(out, |m| m.rms());
        self.baseq.push_with(out, |m| m.std());
    }
}

/// `baseq_ext`: `baseq` plus a match/mismatch split against the reference.
#[derive(Debug, Default)]
pub(crate) struct BaseqExtTally {
    baseq: BaseqTally,
    matches: PairCount,
    mismatches: PairCount,
    baseq_matches: PairMoments,
    baseq_mismatches: PairMoments,
}

impl Tally for BaseqExtTally {
    const COLUMNS: &'static [(&'static str, ColumnKind)] = &[
        ("reads_all", Int),
        ("reads_pp", Int),
        ("mean_baseq", Float),
        ("mean_baseq_pp", Float),
        ("rms_baseq", Float),
        ("rms_baseq_pp", Float),
        ("std_baseq", Float),
        ("std_baseq_pp", Float),
        ("matches", Int),
        ("matches_pp", Int),
        ("mismatches", Int),
        ("mismatches_pp", Int),
        ("rms_baseq_matches", Float),
        ("rms_baseq_matches_pp", Float),
        ("rms_baseq_mismatches", Float),
        ("rms_baseq_mismatches_pp", Float),
    ];

    const NEEDS_REF: bool = true;

    fn add(&mut self, segment: &Segment, ref_base: u8) {
        self.baseq.add(segment, ref_base);
        let pp = segment.is_proper_pair();
        if let Some((base, qual)) = BaseqTally::called(segment) {
            if base == ref_base {
                self.matches.add(pp);
                self.baseq_matches.add(qual, pp);
            } else {
                self.mismatches.add(pp);
                self.baseq_mismatches.add(qual, pp);
            }
        }
    }

    fn values(&self, out: &mut Vec<Value>) {
        self.baseq.values(out);
        self.matches.push(out);
        self.mismatches.push(out);
        self.baseq_matches.push_with(out, |m| m.rms());
        self.baseq_mismatches.push_with(out, |m| m.rms());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn called(base: u8, qual: u8) -> Segment {
        Segment {
            base: Some(base),
            qual: Some(qual),
            ..Segment::default()
        }
    }

    #[test]
    fn deletions_do_not_contribute_quality() {
        let mut tally = BaseqTally::default();
        tally.add(&called(b'A', 30), b'N');
        tally.add(&called(b'C', 10), b'N');
        tally.add(
            &Segment {
                is_del: true,
                ..Segment::default()
            },
            b'N',
        );
        let mut out = Vec::new();
        tally.values(&mut out);
        assert_eq!(out[0], Value::Int(3));
        assert_eq!(out[2], Value::Float(20.0));
        assert_eq!(out[6], Value::Float(10.0));
    }

    #[test]
    fn ext_extends_baseq_fields() {
        let base_names: Vec<&str> = BaseqTally::COLUMNS.iter().map(|c| c.0).collect();
        let ext_names: Vec<&str> = BaseqExtTally::COLUMNS.iter().map(|c| c.0).collect();
        assert_eq!(&ext_names[..base_names.len()], base_names.as_slice());

        let mut tally = BaseqExtTally::default();
        tally.add(&called(b'A', 40), b'A');
        tally.add(&called(b'A', 30), b'A');
        tally.add(&called(b'T', 10), b'A');
        let mut out = Vec::new();
        tally.values(&mut out);

        assert_eq!(out.len(), BaseqExtTally::COLUMNS.len());
        assert_eq!(&out[8..12], &[Value::Int(2), Value::Int(0), Value::Int(1), Value::Int(0)]);
        assert_eq!(out[12], Value::Float((2500.0f64 / 2.0).sqrt()));
        assert_eq!(out[14], Value::Float(10.0));
        assert_eq!(out[15], Value::Float(0.0));
    }
}
