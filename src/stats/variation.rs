use super::coverage::CoverageTally;
use super::record::ColumnKind::{self, Int};
use super::record::Value;
use super::tally::{PairCount, Tally};
use crate::pileup::Segment;

/// `variation`: base calls and indels relative to the reference base.
///
/// Reference skips only contribute to depth. Any base other than A, C, G
/// or T is tallied as N.
#[derive(Debug, Default)]
pub(crate) struct VariationTally {
    coverage: CoverageTally,
    matches: PairCount,
    mismatches: PairCount,
    deletions: PairCount,
    insertions: PairCount,
    a: PairCount,
    c: PairCount,
    t: PairCount,
    g: PairCount,
    n: PairCount,
}

impl Tally for VariationTally {
    const COLUMNS: &'static [(&'static str, ColumnKind)] = &[
        ("reads_all", Int),
        ("reads_pp", Int),
        ("matches", Int),
        ("matches_pp", Int),
        ("mismatches", Int),
        ("mismatches_pp", Int),
        ("deletions", Int),
        ("deletions_pp", Int),
        ("insertions", Int),
        ("insertions_pp", Int),
        ("A", Int),
        ("A_pp", Int),
        ("C", Int),
        ("C_pp", Int),
        ("T", Int),
        ("T_pp", Int),
        ("G", Int),
        ("G_pp", Int),
        ("N", Int),
        ("N_pp", Int),
    ];

    const NEEDS_REF: bool = true;

    fn add(&mut self, segment: &Segment, ref_base: u8) {
        self.coverage.add(segment, ref_base);
        let pp = segment.is_proper_pair();

        if segment.is_del {
            self.deletions.add(pp);
        } else if let Some(base) = segment.base {
            if base == ref_base {
                self.matches.add(pp);
            } else {
                self.mismatches.add(pp);
            }
            match base {
                b'A' => self.a.add(pp),
                b'C' => self.c.add(pp),
                b'T' => self.t.add(pp),
                b'G' => self.g.add(pp),
                _ => self.n.add(pp),
            }
        }
        if segment.insertion {
            self.insertions.add(pp);
        }
    }

    fn values(&self, out: &mut Vec<Value>) {
        self.coverage.values(out);
        for count in [
            &self.matches,
            &self.mismatches,
            &self.deletions,
            &self.insertions,
            &self.a,
            &self.c,
            &self.t,
            &self.g,
            &self.n,
        ] {
            count.push(out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_htslib::htslib::BAM_FPROPER_PAIR;

    fn base(b: u8, pp: bool) -> Segment {
        Segment {
            flags: if pp { BAM_FPROPER_PAIR as u16 } else { 0 },
            base: Some(b),
            qual: Some(30),
            ..Segment::default()
        }
    }

    #[test]
    fn counts_bases_against_reference() {
        let mut del = Segment {
            is_del: true,
            ..Segment::default()
        };
        del.flags = BAM_FPROPER_PAIR as u16;
        let mut ins = base(b'A', false);
        ins.insertion = true;
        let skip = Segment {
            is_refskip: true,
            ..Segment::default()
        };

        let mut tally = VariationTally::default();
        for s in [base(b'A', true), base(b'G', true), base(b'N', false), del, ins, skip] {
            tally.add(&s, b'A');
        }
        let mut out = Vec::new();
        tally.values(&mut out);
        let ints: Vec<i64> = out.iter().filter_map(Value::as_i64).collect();

        assert_eq!(ints.len(), VariationTally::COLUMNS.len());
        assert_eq!(
            ints,
            vec![
                6, 3, // reads
                2, 1, // matches
                2, 1, // mismatches
                1, 1, // deletions
                1, 0, // insertions
                2, 1, // A
                0, 0, // C
                0, 0, // T
                1, 1, // G
                1, 0, // N
            ]
        );
    }
}
