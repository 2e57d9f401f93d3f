//! Writers for record streams: tab-separated text or JSON Lines, gzip
//! compressed when the output path ends in `.gz`.

use crate::error::{Result, StatsError};
use crate::stats::record::{StatRecord, Value};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Tsv,
    Json,
}

/// Open `path` for writing, or stdout when `None`.
pub fn create_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    let Some(path) = path else {
        return Ok(Box::new(BufWriter::new(io::stdout().lock())));
    };
    let file = BufWriter::new(File::create(path)?);
    if path.extension().is_some_and(|ext| ext == "gz") {
        let writer = niffler::get_writer(
            Box::new(file),
            niffler::compression::Format::Gzip,
            niffler::Level::Six,
        )
        .map_err(anyhow::Error::from)?;
        return Ok(writer);
    }
    Ok(Box::new(file))
}

/// One record restricted to the selected columns, serialized in order.
struct Row<'a> {
    names: &'a [String],
    columns: &'a [usize],
    values: &'a [Value],
}

impl Serialize for Row<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, &i) in self.names.iter().zip(self.columns) {
            map.serialize_entry(name, &self.values[i])?;
        }
        map.end()
    }
}

pub struct RecordWriter<W: Write> {
    out: W,
    format: OutputFormat,
    names: Vec<String>,
    columns: Vec<usize>,
    header_written: bool,
    written: u64,
}

impl<W: Write> RecordWriter<W> {
    /// `fields` is the record layout of the stream; `select` picks and
    /// orders the columns written.
    pub fn new(
        out: W,
        format: OutputFormat,
        stat: &str,
        fields: &[String],
        select: Option<&[String]>,
    ) -> Result<Self> {
        let (names, columns) = match select {
            Some(select) => {
                let mut columns = Vec::with_capacity(select.len());
                for name in select {
                    let i = fields.iter().position(|f| f == name).ok_or_else(|| {
                        StatsError::UnknownField {
                            stat: stat.to_string(),
                            field: name.clone(),
                        }
                    })?;
                    columns.push(i);
                }
                (select.to_vec(), columns)
            }
            None => (fields.to_vec(), (0..fields.len()).collect()),
        };

        Ok(Self {
            out,
            format,
            names,
            columns,
            header_written: false,
            written: 0,
        })
    }

    fn write_header(&mut self) -> Result<()> {
        if self.format == OutputFormat::Tsv {
            writeln!(self.out, "{}", self.names.join("\t"))?;
        }
        self.header_written = true;
        Ok(())
    }

    pub fn write(&mut self, record: &StatRecord) -> Result<()> {
        if !self.header_written {
            self.write_header()?;
        }
        let values = record.values();
        match self.format {
            OutputFormat::Tsv => {
                let line: Vec<String> = self.columns.iter().map(|&i| values[i].to_string()).collect();
                writeln!(self.out, "{}", line.join("\t"))?;
            }
            OutputFormat::Json => {
                let row = Row {
                    names: &self.names,
                    columns: &self.columns,
                    values,
                };
                serde_json::to_writer(&mut self.out, &row)?;
                self.out.write_all(b"\n")?;
            }
        }
        self.written += 1;
        Ok(())
    }

    /// Flush and return the number of records written. A TSV stream with no
    /// records still gets its header.
    pub fn finish(mut self) -> Result<u64> {
        if !self.header_written {
            self.write_header()?;
        }
        self.out.flush()?;
        Ok(self.written)
    }
}
