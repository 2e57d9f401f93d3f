//! Per-position statistics: the record schemas, the type registry and the
//! entry points that start a walk over an alignment source.

mod baseq;
mod coverage;
pub mod gc;
mod mapq;
pub mod record;
pub mod registry;
mod tally;
mod tlen;
mod variation;

use crate::error::{Result, StatsError};
use crate::pileup::iter::WalkSettings;
use crate::pileup::{AlignmentSource, Columns, PositionIter, Segment};
use crate::reference::ReferenceSource;
use crate::types::{Interval, Region};
use log::info;
use record::{ColumnKind, Site, Value};
use registry::{Schema, StatType};

pub use gc::GcWindow;

/// The build/pad pair every statistic type provides.
pub trait RecordSchema {
    /// Columns after `chrom` and `pos`, in record order.
    fn columns(&self) -> Vec<(String, ColumnKind)>;

    fn needs_reference(&self) -> bool {
        false
    }

    /// Append the values for an observed column to `out`.
    fn build_record(
        &self,
        site: &Site<'_>,
        segments: &[Segment],
        reference: Option<&mut dyn ReferenceSource>,
        out: &mut Vec<Value>,
    ) -> Result<()>;

    /// Append the values for a position no read covers.
    fn build_pad_record(
        &self,
        site: &Site<'_>,
        reference: Option<&mut dyn ReferenceSource>,
        out: &mut Vec<Value>,
    ) -> Result<()> {
        self.build_record(site, &[], reference, out)
    }
}

/// Options accepted by every statistic entry point.
#[derive(Debug, Clone, PartialEq)]
pub struct PileupOptions {
    /// Region to walk. `None` walks every contig of the alignment source.
    pub region: Option<Region>,
    pub one_based: bool,
    pub truncate: bool,
    pub pad: bool,
    pub max_depth: u32,
    pub window_size: i64,
    pub window_offset: Option<i64>,
}

impl Default for PileupOptions {
    fn default() -> Self {
        Self {
            region: None,
            one_based: false,
            truncate: false,
            pad: false,
            max_depth: 8000,
            window_size: GcWindow::DEFAULT_SIZE,
            window_offset: None,
        }
    }
}

impl PileupOptions {
    pub fn with_region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    /// Applies to both the region coordinates and the reported positions.
    pub fn with_one_based(mut self, one_based: bool) -> Self {
        self.one_based = one_based;
        self
    }

    pub fn with_truncate(mut self, truncate: bool) -> Self {
        self.truncate = truncate;
        self
    }

    pub fn with_pad(mut self, pad: bool) -> Self {
        self.pad = pad;
        self
    }

    pub fn with_max_depth(mut self, max_depth: u32) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn with_window(mut self, size: i64, offset: Option<i64>) -> Self {
        self.window_size = size;
        self.window_offset = offset;
        self
    }
}

/// Resolve `type_name` to its schema, building the GC window when asked for.
pub fn resolve_schema(type_name: &str, options: &PileupOptions) -> Result<Schema> {
    match type_name.parse::<StatType>()? {
        StatType::CoverageGc => {
            GcWindow::new(options.window_size, options.window_offset).map(Schema::from)
        }
        _ => registry::lookup(type_name),
    }
}

/// Start computing `type_name` statistics over `alignments`.
///
/// Every argument is validated before the first column is read: the type
/// name, then the GC window, then the reference, then the region. Types
/// that read the reference also require it to hold every walked contig.
pub fn stat_pileup<'a, S>(
    type_name: &str,
    alignments: &'a mut S,
    reference: Option<&'a mut dyn ReferenceSource>,
    options: &PileupOptions,
) -> Result<PositionIter<'a>>
where
    S: AlignmentSource + ?Sized,
{
    let schema = resolve_schema(type_name, options)?;
    if schema.needs_reference() && reference.is_none() {
        return Err(StatsError::MissingReference(type_name.to_string()));
    }

    let intervals = resolve_intervals(&*alignments, options)?;
    if schema.needs_reference() {
        if let Some(reference) = reference.as_deref() {
            check_reference_contigs(reference, &intervals)?;
        }
    }
    let settings = WalkSettings {
        truncate: options.truncate,
        pad: options.pad,
        max_depth: options.max_depth as usize,
        one_based: options.one_based,
    };

    let columns: Columns<'a> = match (&options.region, intervals.as_slice()) {
        (_, []) => Box::new(std::iter::empty()),
        (_, [iv]) if iv.is_empty() => Box::new(std::iter::empty()),
        (Some(_), [iv]) => alignments.pileup(Some(iv), options.max_depth)?,
        _ => alignments.pileup(None, options.max_depth)?,
    };

    info!(
        "{}: {} interval(s), pad={} truncate={} max_depth={}",
        schema.stat_type(),
        intervals.len(),
        options.pad,
        options.truncate,
        options.max_depth
    );
    Ok(PositionIter::new(schema, columns, reference, intervals, settings))
}

fn resolve_intervals<S>(alignments: &S, options: &PileupOptions) -> Result<Vec<Interval>>
where
    S: AlignmentSource + ?Sized,
{
    match &options.region {
        Some(region) => {
            let contig = alignments.contig(&region.chrom).ok_or_else(|| {
                StatsError::InvalidRegion(format!("unknown contig '{}'", region.chrom))
            })?;
            Ok(vec![region.resolve(contig.tid, contig.len, options.one_based)?])
        }
        None => Ok(alignments
            .contigs()
            .into_iter()
            .map(|c| Interval {
                tid: c.tid,
                chrom: c.name,
                start: 0,
                end: c.len,
            })
            .collect()),
    }
}

/// Every walked contig must exist in the reference, or each base would be
/// compared against `N`.
fn check_reference_contigs(reference: &dyn ReferenceSource, intervals: &[Interval]) -> Result<()> {
    match intervals
        .iter()
        .find(|iv| reference.contig_len(&iv.chrom).is_none())
    {
        Some(iv) => Err(StatsError::InvalidRegion(format!(
            "contig '{}' is not in the reference",
            iv.chrom
        ))),
        None => Ok(()),
    }
}

macro_rules! stat_entry_points {
    ($($fn_name:ident => $type_name:literal),* $(,)?) => {
        $(
            #[doc = concat!("`", $type_name, "` statistics; see [`stat_pileup`].")]
            pub fn $fn_name<'a, S>(
                alignments: &'a mut S,
                reference: Option<&'a mut dyn ReferenceSource>,
                options: &PileupOptions,
            ) -> Result<PositionIter<'a>>
            where
                S: AlignmentSource + ?Sized,
            {
                stat_pileup($type_name, alignments, reference, options)
            }
        )*
    };
}

stat_entry_points! {
    stat_coverage => "coverage",
    stat_coverage_strand => "coverage_strand",
    stat_coverage_ext => "coverage_ext",
    stat_coverage_ext_strand => "coverage_ext_strand",
    stat_variation => "variation",
    stat_variation_strand => "variation_strand",
    stat_tlen => "tlen",
    stat_tlen_strand => "tlen_strand",
    stat_mapq => "mapq",
    stat_mapq_strand => "mapq_strand",
    stat_baseq => "baseq",
    stat_baseq_strand => "baseq_strand",
    stat_baseq_ext => "baseq_ext",
    stat_baseq_ext_strand => "baseq_ext_strand",
    stat_coverage_gc => "coverage_gc",
}
