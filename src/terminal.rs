//! Terminal width detection.
//!
//! A table asks a [`WidthSource`] for its budget once, when it is built.
//! The default source is the terminal attached to stdout; when there is no
//! terminal the table is unbounded and never wraps.

use std::io::IsTerminal;

/// Supplies the total display width a table may occupy.
pub trait WidthSource: Send + Sync {
    /// Width in cells, or `None` for unbounded.
    fn columns(&self) -> Option<usize>;
}

/// Get the terminal size (width, height) in cells.
///
/// Returns `None` if the terminal size cannot be determined.
#[must_use]
pub fn get_terminal_size() -> Option<(usize, usize)> {
    crossterm::terminal::size()
        .ok()
        .map(|(w, h)| (usize::from(w), usize::from(h)))
}

/// Check if stdout is connected to a terminal.
#[must_use]
pub fn is_terminal() -> bool {
    std::io::stdout().is_terminal()
}

/// Width of the terminal on stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct TerminalWidth;

impl WidthSource for TerminalWidth {
    fn columns(&self) -> Option<usize> {
        if !is_terminal() {
            log::debug!("stdout is not a terminal; table width is unbounded");
            return None;
        }
        terminal_columns(get_terminal_size())
    }
}

/// A zero-sized terminal reports no usable width.
fn terminal_columns(size: Option<(usize, usize)>) -> Option<usize> {
    size.map(|(w, _)| w).filter(|&w| w > 0)
}

/// A constant width.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedWidth(pub usize);

impl WidthSource for FixedWidth {
    fn columns(&self) -> Option<usize> {
        Some(self.0)
    }
}

/// No width limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Unbounded;

impl WidthSource for Unbounded {
    fn columns(&self) -> Option<usize> {
        None
    }
}
