//! Shared accumulators and the plain/strand-split schema wrappers.

use super::record::{ColumnKind, Site, Value};
use super::RecordSchema;
use crate::error::{Result, StatsError};
use crate::pileup::Segment;
use crate::reference::ReferenceSource;
use std::marker::PhantomData;

/// Per-column accumulator for one statistic family.
pub(crate) trait Tally: Default {
    const COLUMNS: &'static [(&'static str, ColumnKind)];

    /// Whether a `ref` column precedes the metrics.
    const NEEDS_REF: bool = false;

    fn add(&mut self, segment: &Segment, ref_base: u8);

    /// One value per entry of `COLUMNS`, same order.
    fn values(&self, out: &mut Vec<Value>);
}

/// A count split into all reads and properly paired reads.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct PairCount {
    all: u64,
    pp: u64,
}

impl PairCount {
    pub(crate) fn add(&mut self, proper_pair: bool) {
        self.all += 1;
        if proper_pair {
            self.pp += 1;
        }
    }

    pub(crate) fn all(&self) -> u64 {
        self.all
    }

    pub(crate) fn pp(&self) -> u64 {
        self.pp
    }

    pub(crate) fn push(&self, out: &mut Vec<Value>) {
        out.push(Value::Int(self.all as i64));
        out.push(Value::Int(self.pp as i64));
    }
}

/// Running moments of a per-segment value. Empty sets report 0.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct Moments {
    n: u64,
    sum: f64,
    sum_sq: f64,
    max: i64,
}

impl Moments {
    pub(crate) fn add(&mut self, x: i64) {
        let xf = x as f64;
        if self.n == 0 || x > self.max {
            self.max = x;
        }
        self.n += 1;
        self.sum += xf;
        self.sum_sq += xf * xf;
    }

    pub(crate) fn mean(&self) -> f64 {
        if self.n == 0 {
            0.0
        } else {
            self.sum / self.n as f64
        }
    }

    pub(crate) fn rms(&self) -> f64 {
        if self.n == 0 {
            0.0
        } else {
            (self.sum_sq / self.n as f64).sqrt()
        }
    }

    /// Population standard deviation.
    pub(crate) fn std(&self) -> f64 {
        if self.n == 0 {
            return 0.0;
        }
        let mean = self.mean();
        (self.sum_sq / self.n as f64 - mean * mean).max(0.0).sqrt()
    }

    pub(crate) fn max(&self) -> i64 {
        self.max
    }
}

/// `Moments` for all reads and for properly paired reads.
#[derive(Debug, Default, Clone, Copy)]
pub(crate) struct PairMoments {
    pub(crate) all: Moments,
    pub(crate) pp: Moments,
}

impl PairMoments {
    pub(crate) fn add(&mut self, x: i64, proper_pair: bool) {
        self.all.add(x);
        if proper_pair {
            self.pp.add(x);
        }
    }

    pub(crate) fn push_with(&self, out: &mut Vec<Value>, stat: impl Fn(&Moments) -> f64) {
        out.push(Value::Float(stat(&self.all)));
        out.push(Value::Float(stat(&self.pp)));
    }
}

fn reference_base(
    name: &str,
    needs_ref: bool,
    site: &Site<'_>,
    reference: Option<&mut dyn ReferenceSource>,
    out: &mut Vec<Value>,
) -> Result<u8> {
    if !needs_ref {
        return Ok(b'N');
    }
    let reference = reference.ok_or_else(|| StatsError::MissingReference(name.to_string()))?;
    let base = reference.base(site.chrom, site.pos)?;
    out.push(Value::Base(base as char));
    Ok(base)
}

fn ref_column(needs_ref: bool) -> Option<(String, ColumnKind)> {
    needs_ref.then(|| ("ref".to_string(), ColumnKind::Char))
}

/// Schema reporting a tally over all segments.
pub(crate) struct Unstranded<T> {
    name: &'static str,
    _tally: PhantomData<T>,
}

impl<T: Tally> Unstranded<T> {
    pub(crate) fn new(name: &'static str) -> Self {
        Self {
            name,
            _tally: PhantomData,
        }
    }
}

impl<T: Tally> RecordSchema for Unstranded<T> {
    fn columns(&self) -> Vec<(String, ColumnKind)> {
        ref_column(T::NEEDS_REF)
            .into_iter()
            .chain(T::COLUMNS.iter().map(|(name, kind)| (name.to_string(), *kind)))
            .collect()
    }

    fn needs_reference(&self) -> bool {
        T::NEEDS_REF
    }

    fn build_record(
        &self,
        site: &Site<'_>,
        segments: &[Segment],
        reference: Option<&mut dyn ReferenceSource>,
        out: &mut Vec<Value>,
    ) -> Result<()> {
        let ref_base = reference_base(self.name, T::NEEDS_REF, site, reference, out)?;
        let mut tally = T::default();
        for segment in segments {
            tally.add(segment, ref_base);
        }
        tally.values(out);
        Ok(())
    }
}

/// Schema reporting each metric `f` as `f`, `f_fwd`, `f_rev`.
pub(crate) struct Stranded<T> {
    name: &'static str,
    _tally: PhantomData<T>,
}

impl<T: Tally> Stranded<T> {
    pub(crate) fn new(name: &'static str) -> Self {
        Self {
            name,
            _tally: PhantomData,
        }
    }
}

impl<T: Tally> RecordSchema for Stranded<T> {
    fn columns(&self) -> Vec<(String, ColumnKind)> {
        let metrics = T::COLUMNS.iter().flat_map(|(name, kind)| {
            [
                (name.to_string(), *kind),
                (format!("{}_fwd", name), *kind),
                (format!("{}_rev", name), *kind),
            ]
        });
        ref_column(T::NEEDS_REF).into_iter().chain(metrics).collect()
    }

    fn needs_reference(&self) -> bool {
        T::NEEDS_REF
    }

    fn build_record(
        &self,
        site: &Site<'_>,
        segments: &[Segment],
        reference: Option<&mut dyn ReferenceSource>,
        out: &mut Vec<Value>,
    ) -> Result<()> {
        let ref_base = reference_base(self.name, T::NEEDS_REF, site, reference, out)?;
        let (mut all, mut fwd, mut rev) = (T::default(), T::default(), T::default());
        for segment in segments {
            all.add(segment, ref_base);
            if segment.is_reverse() {
                rev.add(segment, ref_base);
            } else {
                fwd.add(segment, ref_base);
            }
        }

        let n = T::COLUMNS.len();
        let (mut va, mut vf, mut vr) = (
            Vec::with_capacity(n),
            Vec::with_capacity(n),
            Vec::with_capacity(n),
        );
        all.values(&mut va);
        fwd.values(&mut vf);
        rev.values(&mut vr);
        for ((a, f), r) in va.into_iter().zip(vf).zip(vr) {
            out.extend([a, f, r]);
        }
        Ok(())
    }
}
