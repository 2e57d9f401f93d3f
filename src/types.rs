use crate::error::{Result, StatsError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// A genomic region as supplied by the caller.
///
/// A missing start means the beginning of the contig, a missing end means
/// its length. Whether the coordinates are one-based is decided by the
/// options the region is walked with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Region {
    pub chrom: String,
    pub start: Option<i64>,
    pub end: Option<i64>,
}

impl Region {
    pub fn new(chrom: impl Into<String>, start: Option<i64>, end: Option<i64>) -> Self {
        Self {
            chrom: chrom.into(),
            start,
            end,
        }
    }

    pub fn whole(chrom: impl Into<String>) -> Self {
        Self::new(chrom, None, None)
    }

    /// Translate to zero-based half-open bounds on a contig of `contig_len`.
    /// With `one_based` the start is shifted down by one; the end is
    /// inclusive in that case and needs no shift.
    ///
    /// Bounds past the end of the contig are clamped to it.
    pub fn resolve(&self, tid: u32, contig_len: u64, one_based: bool) -> Result<Interval> {
        let start = match self.start {
            Some(s) if one_based => s - 1,
            Some(s) => s,
            None => 0,
        };
        let end = self.end.unwrap_or(contig_len as i64);

        if start < 0 || end < 0 {
            return Err(StatsError::InvalidRegion(format!(
                "{}: negative coordinates ({}..{})",
                self, start, end
            )));
        }
        if start > end {
            return Err(StatsError::InvalidRegion(format!(
                "{}: start {} is after end {}",
                self, start, end
            )));
        }

        let end = (end as u64).min(contig_len);
        let start = (start as u64).min(end);
        Ok(Interval {
            tid,
            chrom: Arc::from(self.chrom.as_str()),
            start,
            end,
        })
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.chrom)?;
        match (self.start, self.end) {
            (Some(s), Some(e)) => write!(f, ":{}-{}", s, e),
            (Some(s), None) => write!(f, ":{}-", s),
            (None, Some(e)) => write!(f, ":-{}", e),
            (None, None) => Ok(()),
        }
    }
}

/// Parses `chrom`, `chrom:start`, `chrom:start-end` and `chrom:-end`.
/// Thousands separators (`,`) are accepted in coordinates.
impl FromStr for Region {
    type Err = StatsError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || StatsError::InvalidRegion(format!("cannot parse {:?}", s));
        let (chrom, range) = match s.rsplit_once(':') {
            Some((chrom, range)) => (chrom, Some(range)),
            None => (s, None),
        };
        if chrom.is_empty() {
            return Err(invalid());
        }

        let coord = |c: &str| -> Result<Option<i64>> {
            let c = c.replace(',', "");
            if c.is_empty() {
                Ok(None)
            } else {
                c.parse::<i64>().map(Some).map_err(|_| invalid())
            }
        };

        let (start, end) = match range {
            None => (None, None),
            Some(range) => match range.split_once('-') {
                Some((s, e)) => (coord(s)?, coord(e)?),
                None => (coord(range)?, None),
            },
        };
        Ok(Region::new(chrom, start, end))
    }
}

/// Zero-based half-open interval on a single contig.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval {
    pub tid: u32,
    pub chrom: Arc<str>,
    pub start: u64,
    pub end: u64,
}

impl Interval {
    pub fn len(&self) -> u64 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    pub fn contains(&self, pos: u64) -> bool {
        pos >= self.start && pos < self.end
    }
}
