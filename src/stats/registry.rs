use super::baseq::{BaseqExtTally, BaseqTally};
use super::coverage::{CoverageExtTally, CoverageTally};
use super::gc::GcWindow;
use super::mapq::MapqTally;
use super::record::{ColumnKind, FieldSet, Site, Value};
use super::tally::{Stranded, Unstranded};
use super::tlen::TlenTally;
use super::variation::VariationTally;
use super::RecordSchema;
use crate::error::{Result, StatsError};
use crate::pileup::Segment;
use crate::reference::ReferenceSource;
use std::fmt;
use std::str::FromStr;

/// Every statistic type that can be requested by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatType {
    Coverage,
    CoverageStrand,
    CoverageExt,
    CoverageExtStrand,
    Variation,
    VariationStrand,
    Tlen,
    TlenStrand,
    Mapq,
    MapqStrand,
    Baseq,
    BaseqStrand,
    BaseqExt,
    BaseqExtStrand,
    CoverageGc,
}

impl StatType {
    pub const ALL: [StatType; 15] = [
        StatType::Coverage,
        StatType::CoverageStrand,
        StatType::CoverageExt,
        StatType::CoverageExtStrand,
        StatType::Variation,
        StatType::VariationStrand,
        StatType::Tlen,
        StatType::TlenStrand,
        StatType::Mapq,
        StatType::MapqStrand,
        StatType::Baseq,
        StatType::BaseqStrand,
        StatType::BaseqExt,
        StatType::BaseqExtStrand,
        StatType::CoverageGc,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            StatType::Coverage => "coverage",
            StatType::CoverageStrand => "coverage_strand",
            StatType::CoverageExt => "coverage_ext",
            StatType::CoverageExtStrand => "coverage_ext_strand",
            StatType::Variation => "variation",
            StatType::VariationStrand => "variation_strand",
            StatType::Tlen => "tlen",
            StatType::TlenStrand => "tlen_strand",
            StatType::Mapq => "mapq",
            StatType::MapqStrand => "mapq_strand",
            StatType::Baseq => "baseq",
            StatType::BaseqStrand => "baseq_strand",
            StatType::BaseqExt => "baseq_ext",
            StatType::BaseqExtStrand => "baseq_ext_strand",
            StatType::CoverageGc => "coverage_gc",
        }
    }

    pub fn requires_reference(&self) -> bool {
        matches!(
            self,
            StatType::Variation
                | StatType::VariationStrand
                | StatType::BaseqExt
                | StatType::BaseqExtStrand
                | StatType::CoverageGc
        )
    }

    /// Registry entry for this type; `None` for `coverage_gc`, whose schema
    /// is built from window parameters.
    pub fn registered(&self) -> Option<Schema> {
        let schema = match self {
            StatType::Coverage => Schema::Coverage,
            StatType::CoverageStrand => Schema::CoverageStrand,
            StatType::CoverageExt => Schema::CoverageExt,
            StatType::CoverageExtStrand => Schema::CoverageExtStrand,
            StatType::Variation => Schema::Variation,
            StatType::VariationStrand => Schema::VariationStrand,
            StatType::Tlen => Schema::Tlen,
            StatType::TlenStrand => Schema::TlenStrand,
            StatType::Mapq => Schema::Mapq,
            StatType::MapqStrand => Schema::MapqStrand,
            StatType::Baseq => Schema::Baseq,
            StatType::BaseqStrand => Schema::BaseqStrand,
            StatType::BaseqExt => Schema::BaseqExt,
            StatType::BaseqExtStrand => Schema::BaseqExtStrand,
            StatType::CoverageGc => return None,
        };
        Some(schema)
    }
}

impl fmt::Display for StatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for StatType {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self> {
        StatType::ALL
            .iter()
            .copied()
            .find(|t| t.name() == s)
            .ok_or_else(|| StatsError::UnsupportedType(s.to_string()))
    }
}

/// Look up the schema registered under `type_name`.
pub fn lookup(type_name: &str) -> Result<Schema> {
    type_name
        .parse::<StatType>()?
        .registered()
        .ok_or_else(|| StatsError::UnsupportedType(type_name.to_string()))
}

/// Resolved record schema for one statistic type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Schema {
    Coverage,
    CoverageStrand,
    CoverageExt,
    CoverageExtStrand,
    Variation,
    VariationStrand,
    Tlen,
    TlenStrand,
    Mapq,
    MapqStrand,
    Baseq,
    BaseqStrand,
    BaseqExt,
    BaseqExtStrand,
    CoverageGc(GcWindow),
}

impl From<GcWindow> for Schema {
    fn from(window: GcWindow) -> Self {
        Schema::CoverageGc(window)
    }
}

macro_rules! with_schema {
    ($schema:expr, $s:ident => $body:expr) => {
        match $schema {
            Schema::Coverage => {
                let $s = Unstranded::<CoverageTally>::new("coverage");
                $body
            }
            Schema::CoverageStrand => {
                let $s = Stranded::<CoverageTally>::new("coverage_strand");
                $body
            }
            Schema::CoverageExt => {
                let $s = Unstranded::<CoverageExtTally>::new("coverage_ext");
                $body
            }
            Schema::CoverageExtStrand => {
                let $s = Stranded::<CoverageExtTally>::new("coverage_ext_strand");
                $body
            }
            Schema::Variation => {
                let $s = Unstranded::<VariationTally>::new("variation");
                $body
            }
            Schema::VariationStrand => {
                let $s = Stranded::<VariationTally>::new("variation_strand");
                $body
            }
            Schema::Tlen => {
                let $s = Unstranded::<TlenTally>::new("tlen");
                $body
            }
            Schema::TlenStrand => {
                let $s = Stranded::<TlenTally>::new("tlen_strand");
                $body
            }
            Schema::Mapq => {
                let $s = Unstranded::<MapqTally>::new("mapq");
                $body
            }
            Schema::MapqStrand => {
                let $s = Stranded::<MapqTally>::new("mapq_strand");
                $body
            }
            Schema::Baseq => {
                let $s = Unstranded::<BaseqTally>::new("baseq");
                $body
            }
            Schema::BaseqStrand => {
                let $s = Stranded::<BaseqTally>::new("baseq_strand");
                $body
            }
            Schema::BaseqExt => {
                let $s = Unstranded::<BaseqExtTally>::new("baseq_ext");
                $body
            }
            Schema::BaseqExtStrand => {
                let $s = Stranded::<BaseqExtTally>::new("baseq_ext_strand");
                $body
            }
            Schema::CoverageGc(window) => {
                let $s = window;
                $body
            }
        }
    };
}

impl Schema {
    pub fn stat_type(&self) -> StatType {
        match self {
            Schema::Coverage => StatType::Coverage,
            Schema::CoverageStrand => StatType::CoverageStrand,
            Schema::CoverageExt => StatType::CoverageExt,
            Schema::CoverageExtStrand => StatType::CoverageExtStrand,
            Schema::Variation => StatType::Variation,
            Schema::VariationStrand => StatType::VariationStrand,
            Schema::Tlen => StatType::Tlen,
            Schema::TlenStrand => StatType::TlenStrand,
            Schema::Mapq => StatType::Mapq,
            Schema::MapqStrand => StatType::MapqStrand,
            Schema::Baseq => StatType::Baseq,
            Schema::BaseqStrand => StatType::BaseqStrand,
            Schema::BaseqExt => StatType::BaseqExt,
            Schema::BaseqExtStrand => StatType::BaseqExtStrand,
            Schema::CoverageGc(_) => StatType::CoverageGc,
        }
    }

    /// Every column of a record, `chrom` and `pos` first.
    pub fn record_columns(&self) -> Vec<(String, ColumnKind)> {
        let mut columns = vec![
            ("chrom".to_string(), ColumnKind::Text),
            ("pos".to_string(), ColumnKind::Int),
        ];
        columns.extend(self.columns());
        columns
    }

    pub fn fields(&self) -> FieldSet {
        self.record_columns().into_iter().map(|(name, _)| name).collect()
    }
}

impl RecordSchema for Schema {
    fn columns(&self) -> Vec<(String, ColumnKind)> {
        with_schema!(self, s => s.columns())
    }

    fn needs_reference(&self) -> bool {
        with_schema!(self, s => s.needs_reference())
    }

    fn build_record(
        &self,
        site: &Site<'_>,
        segments: &[Segment],
        reference: Option<&mut dyn ReferenceSource>,
        out: &mut Vec<Value>,
    ) -> Result<()> {
        with_schema!(self, s => s.build_record(site, segments, reference, out))
    }

    fn build_pad_record(
        &self,
        site: &Site<'_>,
        reference: Option<&mut dyn ReferenceSource>,
        out: &mut Vec<Value>,
    ) -> Result<()> {
        with_schema!(self, s => s.build_pad_record(site, reference, out))
    }
}
