use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;
use std::fmt;
use std::sync::Arc;

/// Field names shared by every record of one iteration.
pub type FieldSet = Arc<[String]>;

/// Scalar value of a single record field.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
#[serde(untagged)]
pub enum Value {
    Text(String),
    Int(i64),
    Float(f64),
    Base(char),
}

impl Value {
    pub fn as_i64(&self) -> Option<i64> {
        match *self {
            Value::Int(v) => Some(v),
            _ => None,
        }
    }

    /// Numeric value, integers widened.
    pub fn as_f64(&self) -> Option<f64> {
        match *self {
            Value::Int(v) => Some(v as f64),
            Value::Float(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            Value::Text(_) => ColumnKind::Text,
            Value::Int(_) => ColumnKind::Int,
            Value::Float(_) => ColumnKind::Float,
            Value::Base(_) => ColumnKind::Char,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Int(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::Base(c) => write!(f, "{}", c),
        }
    }
}

/// Storage kind of a column, used for default and user-supplied dtypes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    Text,
    Char,
    Int,
    Float,
}

/// Zero-based position a record is built for.
#[derive(Debug, Clone, Copy)]
pub struct Site<'a> {
    pub chrom: &'a str,
    pub pos: u64,
}

/// Statistics for one genome position: an ordered field → value mapping.
///
/// `chrom` and `pos` are always the first two fields.
#[derive(Debug, Clone, PartialEq)]
pub struct StatRecord {
    fields: FieldSet,
    values: Vec<Value>,
}

impl StatRecord {
    pub(crate) fn new(fields: FieldSet, values: Vec<Value>) -> Self {
        debug_assert_eq!(fields.len(), values.len(), "record does not match its field set");
        Self { fields, values }
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields
            .iter()
            .position(|f| f == field)
            .map(|i| &self.values[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(String::as_str).zip(self.values.iter())
    }

    pub fn chrom(&self) -> &str {
        self.values[0].as_str().unwrap_or_default()
    }

    /// Position in the coordinate convention requested for the iteration.
    pub fn pos(&self) -> i64 {
        self.values[1].as_i64().unwrap_or_default()
    }

    /// Shorthand for integer count fields such as `reads_all`.
    pub fn count(&self, field: &str) -> Option<i64> {
        self.get(field).and_then(Value::as_i64)
    }
}

impl Serialize for StatRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (field, value) in self.iter() {
            map.serialize_entry(field, value)?;
        }
        map.end()
    }
}
