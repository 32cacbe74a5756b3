//! Word-wrapping text tables.
//!
//! A [`Table`] holds column names and string rows and renders them as
//! fixed-width text that fits a display width by wrapping cells onto
//! several lines. Cells may carry formatting markers (see
//! [`crate::markers`]); markers never count toward widths and colour never
//! bleeds across wrapped lines.
//!
//! ```
//! use wrapped_table::table::Table;
//!
//! let mut table = Table::builder(["Name", "Port"])
//!     .header("Services")
//!     .width(40)
//!     .build()?;
//! table.add_row(["ssh", "22"])?;
//! table.add_row(["http", "80"])?;
//!
//! let out = table.render();
//! assert!(out.starts_with("Services\n========\n\nName  Port\n----  ----\n"));
//! # Ok::<(), wrapped_table::table::TableError>(())
//! ```
//!
//! Building is fallible: invalid column properties, an unusable search
//! pattern or a fixed layout wider than the requested width are reported
//! as [`TableError`]s up front so rendering itself never fails.

mod export;
mod render;

use std::fmt;
use std::sync::Arc;

use crate::cells::WidthMeasurer;
use crate::decorate::{Formatter, Styler};
use crate::markers::{CatalogError, MarkerCatalog};
use crate::sort::{SearchFilter, SortOrder, compare_values, stable_order_by};
use crate::terminal::{FixedWidth, TerminalWidth, Unbounded, WidthSource};

/// Default number of spaces after every column.
pub const DEFAULT_CELL_PAD: usize = 2;

/// Errors raised while building or mutating a table.
#[derive(Debug)]
pub enum TableError {
    /// A row does not have one value per column.
    RowLength {
        /// Number of columns.
        expected: usize,
        /// Number of values supplied.
        actual: usize,
    },
    /// A column name that the table does not have.
    UnknownColumn(String),
    /// The marker catalog is invalid.
    Catalog(CatalogError),
    /// Fixed column widths plus padding exceed the requested width.
    InsufficientWidth {
        /// Indent, padding and fixed widths.
        required: usize,
        /// The requested total width.
        available: usize,
    },
    /// A column was given a fixed width of zero.
    ZeroWidthColumn(String),
    /// A column asked for word wrapping to be disabled.
    WordWrapUnsupported(String),
    /// The search term is not a valid regular expression.
    InvalidSearchPattern(regex::Error),
    /// CSV could not be read or written.
    Csv(csv::Error),
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RowLength { expected, actual } => {
                write!(f, "row has {actual} values but the table has {expected} columns")
            }
            Self::UnknownColumn(name) => write!(f, "invalid column name '{name}'"),
            Self::Catalog(err) => write!(f, "invalid marker catalog: {err}"),
            Self::InsufficientWidth {
                required,
                available,
            } => write!(
                f,
                "fixed layout needs {required} cells but only {available} are available"
            ),
            Self::ZeroWidthColumn(name) => write!(f, "column '{name}' has a fixed width of 0"),
            Self::WordWrapUnsupported(name) => {
                write!(f, "column '{name}': disabling word wrap is not supported")
            }
            Self::InvalidSearchPattern(err) => write!(f, "invalid search pattern: {err}"),
            Self::Csv(err) => write!(f, "csv error: {err}"),
        }
    }
}

impl std::error::Error for TableError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Catalog(err) => Some(err),
            Self::InvalidSearchPattern(err) => Some(err),
            Self::Csv(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CatalogError> for TableError {
    fn from(err: CatalogError) -> Self {
        Self::Catalog(err)
    }
}

impl From<csv::Error> for TableError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

/// A stored table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Row {
    /// One trimmed, formatted value per column.
    Cells(Vec<String>),
    /// A horizontal rule, rendered as a blank line.
    Rule,
}

impl Row {
    /// The row's values, `None` for a rule.
    #[must_use]
    pub fn cells(&self) -> Option<&[String]> {
        match self {
            Self::Cells(cells) => Some(cells.as_slice()),
            Self::Rule => None,
        }
    }

    /// Whether this row is a rule.
    #[must_use]
    pub fn is_rule(&self) -> bool {
        matches!(self, Self::Rule)
    }

    /// Value at `index`; rules have no values.
    #[must_use]
    pub fn value(&self, index: usize) -> Option<&str> {
        self.cells()
            .and_then(|cells| cells.get(index))
            .map(String::as_str)
    }
}

/// Per-column settings.
#[derive(Clone)]
pub struct ColumnProps {
    width: Option<usize>,
    word_wrap: bool,
    formatters: Vec<Arc<dyn Formatter>>,
    stylers: Vec<Arc<dyn Styler>>,
    header_stylers: Vec<Arc<dyn Styler>>,
}

impl Default for ColumnProps {
    fn default() -> Self {
        Self::new()
    }
}

impl ColumnProps {
    /// Flexible width, wrapping, no decorators.
    #[must_use]
    pub fn new() -> Self {
        Self {
            width: None,
            word_wrap: true,
            formatters: Vec::new(),
            stylers: Vec::new(),
            header_stylers: Vec::new(),
        }
    }

    /// Pin the column to `width` cells.
    #[must_use]
    pub fn width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }

    /// Set word wrapping. Only `true` is supported; `false` makes
    /// [`TableOptions::build`] fail.
    #[must_use]
    pub fn word_wrap(mut self, word_wrap: bool) -> Self {
        self.word_wrap = word_wrap;
        self
    }

    /// Append a formatter, run on every value as rows are added.
    #[must_use]
    pub fn formatter(mut self, formatter: impl Formatter + 'static) -> Self {
        self.formatters.push(Arc::new(formatter));
        self
    }

    /// Append a styler, run on every value at render time.
    #[must_use]
    pub fn styler(mut self, styler: impl Styler + 'static) -> Self {
        self.stylers.push(Arc::new(styler));
        self
    }

    /// Append a styler for the column name in the header row.
    #[must_use]
    pub fn header_styler(mut self, styler: impl Styler + 'static) -> Self {
        self.header_stylers.push(Arc::new(styler));
        self
    }

    /// The fixed width, if any.
    #[must_use]
    pub fn fixed_width(&self) -> Option<usize> {
        self.width
    }

    fn format(&self, value: &str) -> String {
        self.formatters
            .iter()
            .fold(value.to_string(), |value, f| f.format(&value))
    }

    fn style(&self, value: &str) -> String {
        apply_stylers(&self.stylers, value)
    }

    fn style_header(&self, name: &str) -> String {
        apply_stylers(&self.header_stylers, name)
    }
}

fn apply_stylers(stylers: &[Arc<dyn Styler>], value: &str) -> String {
    stylers
        .iter()
        .fold(value.to_string(), |value, s| s.style(&value))
}

impl fmt::Debug for ColumnProps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ColumnProps")
            .field("width", &self.width)
            .field("word_wrap", &self.word_wrap)
            .field("formatters", &self.formatters.len())
            .field("stylers", &self.stylers.len())
            .field("header_stylers", &self.header_stylers.len())
            .finish()
    }
}

/// Builder for [`Table`].
pub struct TableOptions {
    columns: Vec<String>,
    header: Option<String>,
    header_indent: usize,
    rows: Vec<Vec<String>>,
    width_source: Box<dyn WidthSource>,
    indent: usize,
    cell_pad: usize,
    prefix: String,
    postfix: String,
    search_term: Option<String>,
    sort_index: Option<usize>,
    sort_order: SortOrder,
    column_props: Vec<(String, ColumnProps)>,
    catalog: Option<Arc<MarkerCatalog>>,
}

impl TableOptions {
    /// Start building a table with the given column names.
    #[must_use]
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            header: None,
            header_indent: 0,
            rows: Vec::new(),
            width_source: Box::new(TerminalWidth),
            indent: 0,
            cell_pad: DEFAULT_CELL_PAD,
            prefix: String::new(),
            postfix: String::new(),
            search_term: None,
            sort_index: Some(0),
            sort_order: SortOrder::Forward,
            column_props: Vec::new(),
            catalog: None,
        }
    }

    /// Title printed above the table and underlined with `=`.
    #[must_use]
    pub fn header(mut self, header: impl Into<String>) -> Self {
        self.header = Some(header.into());
        self
    }

    /// Spaces before the title and its underline.
    #[must_use]
    pub fn header_indent(mut self, indent: usize) -> Self {
        self.header_indent = indent;
        self
    }

    /// Initial rows, added after column properties are applied.
    #[must_use]
    pub fn rows<R, S>(mut self, rows: impl IntoIterator<Item = R>) -> Self
    where
        R: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rows.extend(
            rows.into_iter()
                .map(|row| row.into_iter().map(Into::into).collect()),
        );
        self
    }

    /// Fit the table into `width` cells.
    #[must_use]
    pub fn width(self, width: usize) -> Self {
        self.width_source(FixedWidth(width))
    }

    /// Never wrap; every column takes its natural width.
    #[must_use]
    pub fn unbounded(self) -> Self {
        self.width_source(Unbounded)
    }

    /// Ask `source` for the width at build time.
    ///
    /// Defaults to [`TerminalWidth`].
    #[must_use]
    pub fn width_source(mut self, source: impl WidthSource + 'static) -> Self {
        self.width_source = Box::new(source);
        self
    }

    /// Spaces before the first column of every line.
    #[must_use]
    pub fn indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    /// Spaces after every column.
    #[must_use]
    pub fn cell_pad(mut self, cell_pad: usize) -> Self {
        self.cell_pad = cell_pad;
        self
    }

    /// Text emitted before the table.
    #[must_use]
    pub fn prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Text emitted after the table.
    #[must_use]
    pub fn postfix(mut self, postfix: impl Into<String>) -> Self {
        self.postfix = postfix.into();
        self
    }

    /// Only show rows matching this regular expression.
    #[must_use]
    pub fn search_term(mut self, pattern: impl Into<String>) -> Self {
        self.search_term = Some(pattern.into());
        self
    }

    /// Column to sort by when rendering; `None` keeps insertion order.
    #[must_use]
    pub fn sort_index(mut self, index: Option<usize>) -> Self {
        self.sort_index = index;
        self
    }

    /// Sort direction.
    #[must_use]
    pub fn sort_order(mut self, order: SortOrder) -> Self {
        self.sort_order = order;
        self
    }

    /// Properties for the column called `name`.
    ///
    /// Setting properties for the same name twice replaces the first set.
    #[must_use]
    pub fn column_props(mut self, name: impl Into<String>, props: ColumnProps) -> Self {
        self.column_props.push((name.into(), props));
        self
    }

    /// Marker catalog; defaults to [`MarkerCatalog::standard`].
    #[must_use]
    pub fn catalog(mut self, catalog: Arc<MarkerCatalog>) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Build the table.
    ///
    /// # Errors
    ///
    /// Properties naming a column the table lacks are ignored.
    ///
    /// * [`TableError::WordWrapUnsupported`] or
    ///   [`TableError::ZeroWidthColumn`] for unusable column properties.
    /// * [`TableError::InsufficientWidth`] when fixed widths cannot fit.
    /// * [`TableError::InvalidSearchPattern`] for a bad search term.
    /// * [`TableError::RowLength`] for an initial row of the wrong length.
    pub fn build(self) -> Result<Table, TableError> {
        let mut props = vec![ColumnProps::new(); self.columns.len()];
        for (name, column_props) in self.column_props {
            match self.columns.iter().position(|column| *column == name) {
                Some(index) => props[index] = column_props,
                None => log::debug!("ignoring properties for unknown column '{name}'"),
            }
        }

        for (name, column_props) in self.columns.iter().zip(&props) {
            if !column_props.word_wrap {
                return Err(TableError::WordWrapUnsupported(name.clone()));
            }
            if column_props.width == Some(0) {
                return Err(TableError::ZeroWidthColumn(name.clone()));
            }
        }

        let width = self.width_source.columns();
        check_fixed_layout(&props, width, self.indent, self.cell_pad)?;

        let search = self
            .search_term
            .as_deref()
            .map(SearchFilter::new)
            .transpose()
            .map_err(TableError::InvalidSearchPattern)?;

        let catalog = self
            .catalog
            .unwrap_or_else(|| Arc::new(MarkerCatalog::standard()));

        let mut table = Table {
            header: self.header,
            header_indent: self.header_indent,
            columns: self.columns,
            props,
            rows: Vec::with_capacity(self.rows.len()),
            width,
            indent: self.indent,
            cell_pad: self.cell_pad,
            prefix: self.prefix,
            postfix: self.postfix,
            search,
            sort_index: self.sort_index,
            sort_order: self.sort_order,
            measurer: WidthMeasurer::new(catalog),
        };
        for row in self.rows {
            table.add_row(row)?;
        }
        log::debug!(
            "built table with {} columns and {} rows, width {:?}",
            table.columns.len(),
            table.rows.len(),
            table.width
        );
        Ok(table)
    }
}

impl fmt::Debug for TableOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableOptions")
            .field("columns", &self.columns)
            .field("header", &self.header)
            .field("rows", &self.rows.len())
            .field("indent", &self.indent)
            .field("cell_pad", &self.cell_pad)
            .field("search_term", &self.search_term)
            .field("sort_index", &self.sort_index)
            .field("sort_order", &self.sort_order)
            .finish_non_exhaustive()
    }
}

fn column_index(columns: &[String], name: &str) -> Result<usize, TableError> {
    columns
        .iter()
        .position(|column| column == name)
        .ok_or_else(|| TableError::UnknownColumn(name.to_string()))
}

/// Fixed widths must leave the requested width intact.
fn check_fixed_layout(
    props: &[ColumnProps],
    width: Option<usize>,
    indent: usize,
    cell_pad: usize,
) -> Result<(), TableError> {
    let Some(available) = width else {
        return Ok(());
    };
    if props.iter().all(|p| p.width.is_none()) {
        return Ok(());
    }
    let fixed: usize = props.iter().filter_map(|p| p.width).sum();
    let required = indent + props.len() * cell_pad + fixed;
    if required > available {
        return Err(TableError::InsufficientWidth {
            required,
            available,
        });
    }
    Ok(())
}

/// A text table that wraps to a display width.
///
/// Build one with [`Table::builder`].
#[derive(Debug, Clone)]
pub struct Table {
    header: Option<String>,
    header_indent: usize,
    columns: Vec<String>,
    props: Vec<ColumnProps>,
    rows: Vec<Row>,
    width: Option<usize>,
    indent: usize,
    cell_pad: usize,
    prefix: String,
    postfix: String,
    search: Option<SearchFilter>,
    sort_index: Option<usize>,
    sort_order: SortOrder,
    measurer: WidthMeasurer,
}

impl Table {
    /// Start building a table.
    #[must_use]
    pub fn builder<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> TableOptions {
        TableOptions::new(columns)
    }

    /// Column names.
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Stored rows, in their current order.
    #[must_use]
    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// The title, if any.
    #[must_use]
    pub fn header(&self) -> Option<&str> {
        self.header.as_deref()
    }

    /// Total width, `None` when unbounded.
    #[must_use]
    pub fn width(&self) -> Option<usize> {
        self.width
    }

    /// Change the total width.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::InsufficientWidth`] if the fixed column widths
    /// do not fit; the width is left unchanged in that case.
    pub fn set_width(&mut self, width: Option<usize>) -> Result<(), TableError> {
        check_fixed_layout(&self.props, width, self.indent, self.cell_pad)?;
        self.width = width;
        Ok(())
    }

    /// Spaces before the first column.
    #[must_use]
    pub fn indent(&self) -> usize {
        self.indent
    }

    /// Spaces after every column.
    #[must_use]
    pub fn cell_pad(&self) -> usize {
        self.cell_pad
    }

    /// Render-time sort column.
    #[must_use]
    pub fn sort_index(&self) -> Option<usize> {
        self.sort_index
    }

    /// Render-time sort direction.
    #[must_use]
    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    /// The marker catalog.
    #[must_use]
    pub fn catalog(&self) -> &MarkerCatalog {
        self.measurer.catalog()
    }

    /// Add a row of values, one per column.
    ///
    /// Values are trimmed of surrounding whitespace and passed through the
    /// column's formatters in order.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::RowLength`] if the number of values differs
    /// from the number of columns; the table is unchanged.
    pub fn add_row<S: AsRef<str>>(
        &mut self,
        fields: impl IntoIterator<Item = S>,
    ) -> Result<(), TableError> {
        let fields: Vec<S> = fields.into_iter().collect();
        if fields.len() != self.columns.len() {
            return Err(TableError::RowLength {
                expected: self.columns.len(),
                actual: fields.len(),
            });
        }
        let cells = fields
            .iter()
            .zip(&self.props)
            .map(|(field, props)| props.format(field.as_ref().trim()))
            .collect();
        self.rows.push(Row::Cells(cells));
        Ok(())
    }

    /// Add a row of raw bytes; invalid UTF-8 becomes U+FFFD.
    ///
    /// # Errors
    ///
    /// Same as [`Table::add_row`].
    pub fn add_row_lossy<B: AsRef<[u8]>>(
        &mut self,
        fields: impl IntoIterator<Item = B>,
    ) -> Result<(), TableError> {
        let fields: Vec<String> = fields
            .into_iter()
            .map(|field| String::from_utf8_lossy(field.as_ref()).into_owned())
            .collect();
        self.add_row(fields)
    }

    /// Add a horizontal rule.
    pub fn add_rule(&mut self) {
        self.rows.push(Row::Rule);
    }

    /// Sort the stored rows in place.
    ///
    /// The sort is stable. `None` leaves the rows as they are; an index past
    /// the last column compares every row as equal.
    pub fn sort_rows(&mut self, index: Option<usize>, order: SortOrder) {
        let Some(index) = index else {
            return;
        };
        let permutation = self.order_by(index, order);
        let mut slots: Vec<Option<Row>> = std::mem::take(&mut self.rows)
            .into_iter()
            .map(Some)
            .collect();
        self.rows = permutation
            .into_iter()
            .filter_map(|i| slots[i].take())
            .collect();
        log::trace!("sorted {} rows by column {index} ({order:?})", self.rows.len());
    }

    /// Row indices in render order, without touching the stored rows.
    fn sorted_order(&self) -> Vec<usize> {
        match self.sort_index {
            Some(index) => self.order_by(index, self.sort_order),
            None => (0..self.rows.len()).collect(),
        }
    }

    fn order_by(&self, index: usize, order: SortOrder) -> Vec<usize> {
        stable_order_by(self.rows.len(), |a, b| {
            order.apply(compare_values(
                self.rows[a].value(index),
                self.rows[b].value(index),
            ))
        })
    }

    /// Whether `row` passes the search filter. Rules always do.
    #[must_use]
    pub fn row_visible(&self, row: &Row) -> bool {
        match (row, &self.search) {
            (Row::Rule, _) | (Row::Cells(_), None) => true,
            (Row::Cells(cells), Some(filter)) => filter.matches(cells),
        }
    }

    /// A table with the same title, indent and width holding a subset of
    /// columns in the given order.
    ///
    /// Column properties and the search filter are not carried over.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::UnknownColumn`] for a name this table lacks.
    pub fn select<S: AsRef<str>>(&self, names: &[S]) -> Result<Table, TableError> {
        let indexes = names
            .iter()
            .map(|name| column_index(&self.columns, name.as_ref()))
            .collect::<Result<Vec<usize>, TableError>>()?;

        let mut table = self.derived(names.iter().map(|n| n.as_ref().to_string()).collect());
        for row in &self.rows {
            match row {
                Row::Rule => table.add_rule(),
                Row::Cells(cells) => {
                    table.add_row(indexes.iter().map(|&i| cells[i].as_str()))?;
                }
            }
        }
        Ok(table)
    }

    /// Turn the table on its side.
    ///
    /// Every column becomes a row holding the column name followed by that
    /// column's values; the first value is marked with `"| "` so the names
    /// read as a left-hand header. Rules are dropped and the result is not
    /// sorted.
    #[must_use]
    pub fn drop_left(&self) -> Table {
        let data: Vec<&[String]> = self.rows.iter().filter_map(Row::cells).collect();
        let mut table = self.derived(vec!["  ".to_string(); data.len() + 1]);
        table.sort_index = None;

        for (index, name) in self.columns.iter().enumerate() {
            let mut row = Vec::with_capacity(data.len() + 1);
            row.push(name.clone());
            row.extend(data.iter().map(|cells| cells[index].clone()));
            if row.len() > 1 && !row.iter().all(String::is_empty) {
                row[1].insert_str(0, "| ");
            }
            table.rows.push(Row::Cells(row));
        }
        table
    }

    /// An empty table sharing this table's layout settings.
    fn derived(&self, columns: Vec<String>) -> Table {
        Table {
            header: self.header.clone(),
            header_indent: self.header_indent,
            props: vec![ColumnProps::new(); columns.len()],
            columns,
            rows: Vec::new(),
            width: self.width,
            indent: self.indent,
            cell_pad: self.cell_pad,
            prefix: String::new(),
            postfix: String::new(),
            search: None,
            sort_index: Some(0),
            sort_order: SortOrder::Forward,
            measurer: self.measurer.clone(),
        }
    }
}
