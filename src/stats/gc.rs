use super::coverage::CoverageTally;
use super::record::{ColumnKind, Site, Value};
use super::tally::Tally;
use super::RecordSchema;
use crate::error::{Result, StatsError};
use crate::pileup::Segment;
use crate::reference::ReferenceSource;

/// Window parameters of the `coverage_gc` statistic.
///
/// The window for position `p` is `[p - offset, p - offset + size)`,
/// clamped to the contig.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GcWindow {
    size: u64,
    offset: i64,
}

impl GcWindow {
    pub const DEFAULT_SIZE: i64 = 300;

    /// `offset` defaults to half the window size.
    pub fn new(size: i64, offset: Option<i64>) -> Result<Self> {
        if size <= 0 {
            return Err(StatsError::InvalidWindowConfig(format!(
                "window size must be positive, got {}",
                size
            )));
        }
        Ok(Self {
            size: size as u64,
            offset: offset.unwrap_or(size / 2),
        })
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    /// Window bounds for `pos`, floored at 0. The reference clamps the end.
    pub fn bounds(&self, pos: u64) -> (u64, u64) {
        let start = (pos as i64).saturating_sub(self.offset);
        let end = start.saturating_add(self.size as i64);
        (start.max(0) as u64, end.max(0) as u64)
    }

    fn gc_percent(&self, reference: &mut dyn ReferenceSource, site: &Site<'_>) -> Result<i64> {
        let (start, end) = self.bounds(site.pos);
        let seq = reference.fetch(site.chrom, start, end)?;
        Ok(gc_percent(&seq))
    }
}

/// Rounded percentage of G/C among `seq`; 0 for an empty window.
pub fn gc_percent(seq: &[u8]) -> i64 {
    if seq.is_empty() {
        return 0;
    }
    let gc = seq
        .iter()
        .filter(|b| matches!(b, b'G' | b'C' | b'g' | b'c'))
        .count();
    (gc as f64 * 100.0 / seq.len() as f64).round() as i64
}

impl RecordSchema for GcWindow {
    fn columns(&self) -> Vec<(String, ColumnKind)> {
        std::iter::once(("gc", ColumnKind::Int))
            .chain(CoverageTally::COLUMNS.iter().copied())
            .map(|(name, kind)| (name.to_string(), kind))
            .collect()
    }

    fn needs_reference(&self) -> bool {
        true
    }

    fn build_record(
        &self,
        site: &Site<'_>,
        segments: &[Segment],
        reference: Option<&mut dyn ReferenceSource>,
        out: &mut Vec<Value>,
    ) -> Result<()> {
        let reference =
            reference.ok_or_else(|| StatsError::MissingReference("coverage_gc".to_string()))?;
        out.push(Value::Int(self.gc_percent(reference, site)?));

        let mut coverage = CoverageTally::default();
        for segment in segments {
            coverage.add(segment, b'N');
        }
        coverage.values(out);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::MemoryReference;

    #[test]
    fn rejects_non_positive_window() {
        assert!(matches!(
            GcWindow::new(0, None),
            Err(StatsError::InvalidWindowConfig(_))
        ));
        assert!(GcWindow::new(-5, Some(1)).is_err());
    }

    #[test]
    fn offset_defaults_to_half_window() {
        let w = GcWindow::new(301, None).unwrap();
        assert_eq!(w.offset(), 150);
        assert_eq!(w.bounds(1000), (850, 1151));
        assert_eq!(w.bounds(10), (0, 161));
    }

    #[test]
    fn extreme_windows_saturate() {
        let w = GcWindow::new(i64::MAX, Some(0)).unwrap();
        assert_eq!(w.bounds(10), (10, i64::MAX as u64));

        let w = GcWindow::new(10, Some(i64::MIN)).unwrap();
        assert_eq!(w.bounds(5), (i64::MAX as u64, i64::MAX as u64));

        let mut reference = MemoryReference::new().with_sequence("chr1", b"GGAA");
        let site = Site { chrom: "chr1", pos: 1 };
        let w = GcWindow::new(i64::MAX, None).unwrap();
        assert_eq!(w.gc_percent(&mut reference, &site).unwrap(), 50);
    }

    #[test]
    fn percent_is_rounded() {
        assert_eq!(gc_percent(b""), 0);
        assert_eq!(gc_percent(b"GCAT"), 50);
        assert_eq!(gc_percent(b"gcA"), 67);
        assert_eq!(gc_percent(b"NNNN"), 0);
    }

    #[test]
    fn pad_record_carries_gc() {
        let mut reference = MemoryReference::new().with_sequence("chr1", b"AACCGGTTAACC");
        let window = GcWindow::new(4, Some(2)).unwrap();
        let site = Site {
            chrom: "chr1",
            pos: 4,
        };
        let mut out = Vec::new();
        window
            .build_pad_record(&site, Some(&mut reference), &mut out)
            .unwrap();
        // window [2, 6) = CCGG
        assert_eq!(out, vec![Value::Int(100), Value::Int(0), Value::Int(0)]);
    }
}
