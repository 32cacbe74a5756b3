//! CSV export and import.

use std::sync::LazyLock;

use csv::{QuoteStyle, ReaderBuilder, Terminator, WriterBuilder};
use regex::Regex;

use super::{Row, Table, TableError};

static WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("invalid regex"));

/// First record of a key/value CSV export.
const KEYS_VALUES: [&str; 2] = ["Keys", "Values"];

impl Table {
    /// Serialise the table as CSV.
    ///
    /// The first line holds the column names, quoted only where needed.
    /// Every visible row follows in stored order (call
    /// [`Table::sort_rows`] first for sorted output); every field is quoted,
    /// whitespace runs including line breaks collapse to one space and
    /// quotes are doubled. Rules are skipped.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Csv`] if the writer fails.
    pub fn to_csv(&self) -> Result<String, TableError> {
        let mut out = write_records(QuoteStyle::Necessary, std::iter::once(&self.columns))?;

        let rows: Vec<Vec<String>> = self
            .rows
            .iter()
            .filter(|row| self.row_visible(row))
            .filter_map(Row::cells)
            .map(|cells| {
                cells
                    .iter()
                    .map(|cell| WHITESPACE.replace_all(cell, " ").into_owned())
                    .collect()
            })
            .collect();
        out.push_str(&write_records(QuoteStyle::Always, rows.iter())?);
        Ok(out)
    }

    /// Build a table from CSV text.
    ///
    /// The table uses default options (terminal width, sorted by the first
    /// column). See [`Table::from_records`] for the accepted layouts.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::Csv`] for malformed CSV and
    /// [`TableError::RowLength`] for a record with the wrong number of
    /// fields.
    pub fn from_csv(text: &str) -> Result<Table, TableError> {
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());
        let records = reader
            .records()
            .map(|record| {
                record.map(|record| record.iter().map(String::from).collect::<Vec<String>>())
            })
            .collect::<Result<Vec<Vec<String>>, csv::Error>>()?;
        Table::from_records(records)
    }

    /// Build a table from records.
    ///
    /// Normally the first record names the columns and every further record
    /// is a row. When the first record is exactly `Keys,Values` the data is
    /// stored sideways: each further record is a key followed by its values,
    /// each key becomes a column and row `j` holds the `j`-th value of every
    /// key (empty where a key has fewer values).
    ///
    /// # Errors
    ///
    /// Returns [`TableError::RowLength`] for a row with the wrong number of
    /// fields.
    pub fn from_records<R, S>(records: impl IntoIterator<Item = R>) -> Result<Table, TableError>
    where
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut records = records
            .into_iter()
            .map(|record| record.into_iter().map(Into::into).collect::<Vec<String>>());
        let Some(first) = records.next() else {
            return Table::builder(Vec::<String>::new()).build();
        };

        if first != KEYS_VALUES {
            let mut table = Table::builder(first).build()?;
            for record in records {
                table.add_row(record)?;
            }
            return Ok(table);
        }

        let (keys, values): (Vec<String>, Vec<Vec<String>>) = records
            .filter(|record| !record.is_empty())
            .map(|mut record| {
                let key = record.remove(0);
                (key, record)
            })
            .unzip();
        let height = values.iter().map(Vec::len).max().unwrap_or(0);
        log::debug!("reading {} keys with up to {height} values", keys.len());

        let mut table = Table::builder(keys).build()?;
        for j in 0..height {
            table.add_row(
                values
                    .iter()
                    .map(|column| column.get(j).map_or("", String::as_str)),
            )?;
        }
        Ok(table)
    }
}

fn write_records<'a>(
    quote_style: QuoteStyle,
    records: impl Iterator<Item = &'a Vec<String>>,
) -> Result<String, TableError> {
    let mut writer = WriterBuilder::new()
        .quote_style(quote_style)
        .terminator(Terminator::Any(b'\n'))
        .flexible(true)
        .from_writer(Vec::new());
    for record in records {
        writer.write_record(record)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| TableError::Csv(err.into_error().into()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}
