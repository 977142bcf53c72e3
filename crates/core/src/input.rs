//! Input providers
//!
//! An input provider hands the engine one ordered collection of raw values
//! plus a provenance label. The shipped provider reads one column of a
//! delimited text file.

use crate::config::{ColumnInput, ColumnSelector};
use crate::error::{Error, Result, ResultExt};
use std::path::{Path, PathBuf};

/// One collection of raw values and where it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LabelledColumn {
    /// Provenance, used as the result column header
    pub label: String,
    /// Raw values in file order, duplicates included
    pub values: Vec<String>,
}

/// Supplies a labelled collection of values
pub trait InputProvider {
    /// Read the collection
    fn provide(&self) -> Result<LabelledColumn>;
}

/// Reads a single column of a delimited text file
#[derive(Debug, Clone)]
pub struct CsvColumnSource {
    path: PathBuf,
    column: ColumnSelector,
    header_row: usize,
    delimiter: u8,
    skip_blank: bool,
}

impl CsvColumnSource {
    /// Reader for column 0 of `path`, headers on the first row
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            column: ColumnSelector::default(),
            header_row: 1,
            delimiter: b',',
            skip_blank: true,
        }
    }

    /// Build from a validated `[input.*]` section
    pub fn from_config(config: &ColumnInput) -> Result<Self> {
        let path = config
            .path
            .clone()
            .ok_or_else(|| Error::invalid_config("input path is not set"))?;
        let delimiter = u8::try_from(config.delimiter)
            .map_err(|_| Error::invalid_config("delimiter must be a single ASCII character"))?;

        Ok(Self {
            path,
            column: config.column.clone().unwrap_or_default(),
            header_row: config.header_row,
            delimiter,
            skip_blank: config.skip_blank,
        })
    }

    /// Column to read
    pub fn column(mut self, column: ColumnSelector) -> Self {
        self.column = column;
        self
    }

    /// 1-indexed header row; 0 for none
    pub fn header_row(mut self, header_row: usize) -> Self {
        self.header_row = header_row;
        self
    }

    /// Field delimiter
    pub fn delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Keep or drop blank cells
    pub fn skip_blank(mut self, skip_blank: bool) -> Self {
        self.skip_blank = skip_blank;
        self
    }

    /// File being read
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn resolve_column(&self, headers: Option<&[String]>) -> Result<(usize, String)> {
        match (&self.column, headers) {
            (ColumnSelector::Index(index), Some(headers)) => headers
                .get(*index)
                .map(|name| (*index, name.clone()))
                .ok_or_else(|| Error::column_not_found(&self.column, headers)),
            (ColumnSelector::Index(index), None) => Ok((*index, index.to_string())),
            (ColumnSelector::Name(name), Some(headers)) => headers
                .iter()
                .position(|h| h == name)
                .or_else(|| headers.iter().position(|h| h.trim() == name.trim()))
                .map(|index| (index, headers[index].clone()))
                .ok_or_else(|| Error::column_not_found(&self.column, headers)),
            (ColumnSelector::Name(_), None) => Err(Error::invalid_config(
                "a column can only be selected by name when the file has a header row",
            )),
        }
    }
}

impl InputProvider for CsvColumnSource {
    fn provide(&self) -> Result<LabelledColumn> {
        if !self.path.exists() {
            return Err(Error::file_not_found(&self.path));
        }
        tracing::debug!(path = %self.path.display(), column = %self.column, "Reading input column");

        let mut reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(self.delimiter)
            .from_path(&self.path)
            .map_err(Error::from)
            .context(format!("Opening {}", self.path.display()))?;

        let mut records = reader.records();

        // Rows above the header row are skipped. The reader drops blank
        // lines, so the header is located by physical line number.
        let headers = if self.header_row > 0 {
            let header_line = self.header_row as u64;
            let header = loop {
                let record = records
                    .next()
                    .ok_or_else(|| Error::header_row_missing(&self.path, self.header_row))?
                    .map_err(Error::from)?;
                let line = record.position().map_or(0, |p| p.line());
                if line < header_line {
                    continue;
                }
                if line > header_line {
                    return Err(Error::header_row_missing(&self.path, self.header_row));
                }
                break record;
            };
            Some(header.iter().map(str::to_string).collect::<Vec<_>>())
        } else {
            None
        };

        let (index, column_name) = self.resolve_column(headers.as_deref())?;

        let mut values = Vec::new();
        let mut blank = 0usize;
        for (row, record) in records.enumerate() {
            let record = record
                .map_err(Error::from)
                .context(format!("Reading data row {} of {}", row + 1, self.path.display()))?;
            let cell = record.get(index).unwrap_or("");
            if self.skip_blank && cell.trim().is_empty() {
                blank += 1;
                continue;
            }
            values.push(cell.to_string());
        }

        let label = format!("{},{}", self.path.display(), column_name);
        tracing::debug!(label = %label, values = values.len(), blank, "Input column loaded");

        Ok(LabelledColumn { label, values })
    }
}
