//! Column-oriented materialization of a statistics walk.

use crate::error::{Result, StatsError};
use crate::pileup::AlignmentSource;
use crate::reference::ReferenceSource;
use crate::stats::record::{ColumnKind, Value};
use crate::stats::{resolve_schema, stat_pileup, PileupOptions};
use log::debug;
use serde::Serialize;

/// Storage kind per field, in column order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, serde::Deserialize)]
pub struct Dtype(Vec<(String, ColumnKind)>);

impl Dtype {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, kind: ColumnKind) -> Self {
        let field = field.into();
        match self.0.iter_mut().find(|(name, _)| *name == field) {
            Some(entry) => entry.1 = kind,
            None => self.0.push((field, kind)),
        }
        self
    }

    pub fn get(&self, field: &str) -> Option<ColumnKind> {
        self.0.iter().find(|(name, _)| name == field).map(|(_, kind)| *kind)
    }

    pub fn fields(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<(String, ColumnKind)> for Dtype {
    fn from_iter<I: IntoIterator<Item = (String, ColumnKind)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Dtype::new(), |dtype, (field, kind)| dtype.with(field, kind))
    }
}

/// Default storage kinds of every field of `type_name`.
pub fn default_dtype(type_name: &str, options: &PileupOptions) -> Result<Dtype> {
    let schema = resolve_schema(type_name, options)?;
    Ok(schema.record_columns().into_iter().collect())
}

fn convertible(from: ColumnKind, to: ColumnKind) -> bool {
    use ColumnKind::*;
    from == to || to == Text || matches!((from, to), (Int, Float) | (Float, Int))
}

/// One materialized column.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ColumnData {
    Text(Vec<String>),
    Char(Vec<char>),
    Int(Vec<i64>),
    Float(Vec<f64>),
}

impl ColumnData {
    fn with_kind(kind: ColumnKind) -> Self {
        match kind {
            ColumnKind::Text => ColumnData::Text(Vec::new()),
            ColumnKind::Char => ColumnData::Char(Vec::new()),
            ColumnKind::Int => ColumnData::Int(Vec::new()),
            ColumnKind::Float => ColumnData::Float(Vec::new()),
        }
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            ColumnData::Text(_) => ColumnKind::Text,
            ColumnData::Char(_) => ColumnKind::Char,
            ColumnData::Int(_) => ColumnKind::Int,
            ColumnData::Float(_) => ColumnKind::Float,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ColumnData::Text(v) => v.len(),
            ColumnData::Char(v) => v.len(),
            ColumnData::Int(v) => v.len(),
            ColumnData::Float(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn as_int(&self) -> Option<&[i64]> {
        match self {
            ColumnData::Int(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<&[f64]> {
        match self {
            ColumnData::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&[String]> {
        match self {
            ColumnData::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_char(&self) -> Option<&[char]> {
        match self {
            ColumnData::Char(v) => Some(v),
            _ => None,
        }
    }

    fn push(&mut self, value: &Value) -> Result<()> {
        match (self, value) {
            (ColumnData::Int(v), Value::Int(x)) => v.push(*x),
            (ColumnData::Int(v), Value::Float(x)) => v.push(*x as i64),
            (ColumnData::Float(v), Value::Float(x)) => v.push(*x),
            (ColumnData::Float(v), Value::Int(x)) => v.push(*x as f64),
            (ColumnData::Char(v), Value::Base(c)) => v.push(*c),
            (ColumnData::Text(v), value) => v.push(value.to_string()),
            (column, value) => {
                return Err(StatsError::InvalidDtype(format!(
                    "cannot store {:?} value {} in a {:?} column",
                    value.kind(),
                    value,
                    column.kind()
                )))
            }
        }
        Ok(())
    }
}

/// Statistics for a whole walk, one vector per field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StatTable {
    names: Vec<String>,
    columns: Vec<ColumnData>,
    len: usize,
}

impl StatTable {
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn column(&self, name: &str) -> Option<&ColumnData> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| &self.columns[i])
    }

    pub fn dtype(&self) -> Dtype {
        self.names
            .iter()
            .cloned()
            .zip(self.columns.iter().map(ColumnData::kind))
            .collect()
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Compute `type_name` statistics and collect them into a [`StatTable`].
///
/// `dtype` overrides the storage kind of the fields it names; `fields`
/// selects and orders the columns kept. Both are checked against the
/// record layout before any column is read.
pub fn load_pileup<'a, S>(
    type_name: &str,
    alignments: &'a mut S,
    reference: Option<&'a mut dyn ReferenceSource>,
    options: &PileupOptions,
    dtype: Option<&Dtype>,
    fields: Option<&[&str]>,
) -> Result<StatTable>
where
    S: AlignmentSource + ?Sized,
{
    let records = stat_pileup(type_name, alignments, reference, options)?;
    let layout = records.schema().record_columns();

    let unknown = |field: &str| StatsError::UnknownField {
        stat: type_name.to_string(),
        field: field.to_string(),
    };

    // (record index, field name, native kind)
    let selected: Vec<(usize, String, ColumnKind)> = match fields {
        Some(fields) => fields
            .iter()
            .map(|field| {
                layout
                    .iter()
                    .position(|(name, _)| name == field)
                    .map(|i| (i, layout[i].0.clone(), layout[i].1))
                    .ok_or_else(|| unknown(field))
            })
            .collect::<Result<_>>()?,
        None => layout
            .iter()
            .enumerate()
            .map(|(i, (name, kind))| (i, name.clone(), *kind))
            .collect(),
    };

    let mut kinds = Vec::with_capacity(selected.len());
    if let Some(dtype) = dtype {
        if let Some(field) = dtype.fields().find(|f| !layout.iter().any(|(n, _)| n == *f)) {
            return Err(unknown(field));
        }
    }
    for (_, name, native) in &selected {
        let kind = dtype.and_then(|d| d.get(name)).unwrap_or(*native);
        if !convertible(*native, kind) {
            return Err(StatsError::InvalidDtype(format!(
                "field {} is {:?} and cannot be stored as {:?}",
                name, native, kind
            )));
        }
        kinds.push(kind);
    }

    let mut columns: Vec<ColumnData> = kinds.iter().map(|k| ColumnData::with_kind(*k)).collect();
    let mut len = 0;
    for record in records {
        let record = record?;
        let values = record.values();
        for ((index, _, _), column) in selected.iter().zip(columns.iter_mut()) {
            column.push(&values[*index])?;
        }
        len += 1;
    }
    debug!("{}: loaded {} rows into {} columns", type_name, len, columns.len());

    Ok(StatTable {
        names: selected.into_iter().map(|(_, name, _)| name).collect(),
        columns,
        len,
    })
}

macro_rules! load_entry_points {
    ($($fn_name:ident => $type_name:literal),* $(,)?) => {
        $(
            #[doc = concat!("Load `", $type_name, "` statistics; see [`load_pileup`].")]
            pub fn $fn_name<'a, S>(
                alignments: &'a mut S,
                reference: Option<&'a mut dyn ReferenceSource>,
                options: &PileupOptions,
                dtype: Option<&Dtype>,
                fields: Option<&[&str]>,
            ) -> Result<StatTable>
            where
                S: AlignmentSource + ?Sized,
            {
                load_pileup($type_name, alignments, reference, options, dtype, fields)
            }
        )*
    };
}

load_entry_points! {
    load_coverage => "coverage",
    load_coverage_strand => "coverage_strand",
    load_coverage_ext => "coverage_ext",
    load_coverage_ext_strand => "coverage_ext_strand",
    load_variation => "variation",
    load_variation_strand => "variation_strand",
    load_tlen => "tlen",
    load_tlen_strand => "tlen_strand",
    load_mapq => "mapq",
    load_mapq_strand => "mapq_strand",
    load_baseq => "baseq",
    load_baseq_strand => "baseq_strand",
    load_baseq_ext => "baseq_ext",
    load_baseq_ext_strand => "baseq_ext_strand",
    load_coverage_gc => "coverage_gc",
}
