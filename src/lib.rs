//! # wrapped_table
//!
//! Word-wrapping text tables for terminal output.
//!
//! Tables fit any number of columns into a display width by wrapping cell
//! text onto several lines. Cells may embed formatting markers such as
//! `%red` or `%bld`; markers take no space, are never split, and style that
//! is still open at the end of a wrapped line is closed there and re-opened
//! on the next line.
//!
//! ## Quick Start
//!
//! ```rust
//! use wrapped_table::prelude::*;
//!
//! let mut table = Table::builder(["Host", "Port", "Info"])
//!     .header("Services")
//!     .width(40)
//!     .column_props("Host", ColumnProps::new().styler(Colorize::new("%grn")))
//!     .build()?;
//! table.add_row(["10.0.0.2", "22", "OpenSSH 9.6 with a banner long enough to wrap"])?;
//! table.add_row(["10.0.0.10", "80", "nginx"])?;
//!
//! let text = table.render();
//! let ansi = table.catalog().to_ansi(&text, false);
//! assert!(ansi.contains("\x1b[32m10.0.0.2\x1b[0m"));
//! # Ok::<(), TableError>(())
//! ```
//!
//! ## Core Concepts
//!
//! - **Table**: columns, rows and layout settings; see [`table`]
//! - **Markers**: the catalog of inline formatting tokens; see [`markers`]
//! - **Layout**: how column widths are chosen; see [`layout`]
//! - **Wrapping**: marker-aware chunking of cells; see [`wrap`]
//! - **Sorting**: numeric, IP-aware and lexical row order; see [`sort`]

#![forbid(unsafe_code)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod cells;
pub mod decorate;
pub mod layout;
pub mod markers;
pub mod sort;
pub mod sync;
pub mod table;
pub mod terminal;
pub mod wrap;

/// Re-exports for convenient usage
pub mod prelude {
    pub use crate::cells::{WidthMeasurer, display_width};
    pub use crate::decorate::{
        Colorize, EmptyPlaceholder, Formatter, HighlightMatches, Styler, ValueColors,
    };
    pub use crate::markers::{CatalogError, Marker, MarkerCatalog, MarkerGroup};
    pub use crate::sort::{SearchFilter, SortOrder, compare_values};
    pub use crate::table::{ColumnProps, Row, Table, TableError, TableOptions};
    pub use crate::terminal::{FixedWidth, TerminalWidth, Unbounded, WidthSource};
}

// Re-export key types at crate root
pub use markers::{Marker, MarkerCatalog, MarkerGroup};
pub use sort::SortOrder;
pub use table::{ColumnProps, Row, Table, TableError, TableOptions};
