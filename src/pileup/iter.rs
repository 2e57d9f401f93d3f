use super::{Columns, PileupColumn, Segment};
use crate::error::{Result, StatsError};
use crate::reference::ReferenceSource;
use crate::stats::record::{FieldSet, Site, StatRecord, Value};
use crate::stats::registry::Schema;
use crate::stats::RecordSchema;
use crate::types::Interval;
use log::debug;
use std::collections::VecDeque;
use std::sync::Arc;

/// Iteration switches shared by every interval of one walk.
#[derive(Debug, Clone, Copy)]
pub struct WalkSettings {
    pub truncate: bool,
    pub pad: bool,
    pub max_depth: usize,
    pub one_based: bool,
}

/// Lazy walk over pileup columns that turns each position into a record.
///
/// Holds at most one column ahead of the record it returns. Columns must
/// arrive in reference order; intervals are visited in the order given.
pub struct PositionIter<'a> {
    schema: Schema,
    fields: FieldSet,
    columns: Columns<'a>,
    reference: Option<&'a mut dyn ReferenceSource>,
    intervals: VecDeque<Interval>,
    current: Option<Interval>,
    next_pos: u64,
    pending: Option<PileupColumn>,
    source_done: bool,
    settings: WalkSettings,
    emitted: u64,
    fused: bool,
}

impl<'a> PositionIter<'a> {
    pub fn new(
        schema: Schema,
        columns: Columns<'a>,
        reference: Option<&'a mut dyn ReferenceSource>,
        intervals: Vec<Interval>,
        settings: WalkSettings,
    ) -> Self {
        let mut intervals: VecDeque<Interval> =
            intervals.into_iter().filter(|iv| !iv.is_empty()).collect();
        let current = intervals.pop_front();
        if let Some(iv) = &current {
            debug!("{}: walking {}:{}-{}", schema.stat_type(), iv.chrom, iv.start, iv.end);
        }

        Self {
            fields: schema.fields(),
            schema,
            columns,
            reference,
            next_pos: current.as_ref().map_or(0, |iv| iv.start),
            current,
            intervals,
            pending: None,
            source_done: false,
            settings,
            emitted: 0,
            fused: false,
        }
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn fields(&self) -> &FieldSet {
        &self.fields
    }

    fn reference(&mut self) -> Option<&mut dyn ReferenceSource> {
        match self.reference.as_mut() {
            Some(reference) => Some(&mut **reference),
            None => None,
        }
    }

    fn record(
        &mut self,
        chrom: &Arc<str>,
        pos: u64,
        segments: Option<&[Segment]>,
    ) -> Result<StatRecord> {
        let schema = self.schema;
        let fields = Arc::clone(&self.fields);
        let offset = u64::from(self.settings.one_based);

        let mut values = Vec::with_capacity(fields.len());
        values.push(Value::Text(chrom.to_string()));
        values.push(Value::Int((pos + offset) as i64));

        let site = Site { chrom: &**chrom, pos };
        match segments {
            Some(segments) => schema.build_record(&site, segments, self.reference(), &mut values)?,
            None => schema.build_pad_record(&site, self.reference(), &mut values)?,
        }
        self.emitted += 1;
        Ok(StatRecord::new(fields, values))
    }

    /// Pad record for the next uncovered position below `limit`, if any.
    fn pad_until(&mut self, limit: u64) -> Option<Result<StatRecord>> {
        if !self.settings.pad || self.next_pos >= limit {
            return None;
        }
        let chrom = self.current.as_ref().map(|iv| Arc::clone(&iv.chrom))?;
        let pos = self.next_pos;
        self.next_pos += 1;
        Some(self.record(&chrom, pos, None))
    }

    fn advance(&mut self) {
        self.current = self.intervals.pop_front();
        match &self.current {
            Some(iv) => {
                debug!("{}: walking {}:{}-{}", self.schema.stat_type(), iv.chrom, iv.start, iv.end);
                self.next_pos = iv.start;
            }
            None => debug!("{}: {} records", self.schema.stat_type(), self.emitted),
        }
    }

    fn fuse(&mut self, err: StatsError) -> Option<Result<StatRecord>> {
        self.fused = true;
        self.pending = None;
        self.current = None;
        Some(Err(err))
    }
}

impl Iterator for PositionIter<'_> {
    type Item = Result<StatRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.fused {
            let (tid, start, end, chrom) = match &self.current {
                Some(iv) => (iv.tid, iv.start, iv.end, Arc::clone(&iv.chrom)),
                None => return None,
            };

            if self.pending.is_none() && !self.source_done {
                match self.columns.next() {
                    Some(Ok(column)) => self.pending = Some(column),
                    Some(Err(err)) => return self.fuse(err),
                    None => self.source_done = true,
                }
            }

            let Some(mut column) = self.pending.take() else {
                if let Some(record) = self.pad_until(end) {
                    return Some(record);
                }
                self.advance();
                continue;
            };

            if column.tid != tid {
                if self.intervals.iter().any(|iv| iv.tid == column.tid) {
                    self.pending = Some(column);
                    if let Some(record) = self.pad_until(end) {
                        return Some(record);
                    }
                    self.advance();
                }
                continue;
            }

            if self.settings.truncate && (column.pos < start || column.pos >= end) {
                continue;
            }

            let limit = column.pos.min(end);
            if self.settings.pad && self.next_pos < limit {
                self.pending = Some(column);
                return self.pad_until(limit);
            }

            column.segments.truncate(self.settings.max_depth);
            if column.segments.is_empty() {
                continue;
            }
            self.next_pos = self.next_pos.max(column.pos + 1);

            let record = self.record(&chrom, column.pos, Some(&column.segments));
            return match record {
                Ok(record) => Some(Ok(record)),
                Err(err) => self.fuse(err),
            };
        }
        None
    }
}
