//! Column width allocation.
//!
//! Given each column's natural (unwrapped) width and an optional fixed
//! width, [`allocate_widths`] decides how wide every column renders within a
//! total budget. The algorithm is a greedy, column-order pass followed by a
//! surplus redistribution pass; it is intentionally not a proportional split,
//! so earlier columns that need less than their fair share hand the rest to
//! later columns in the same pass.
//!
//! # Examples
//!
//! ```
//! use wrapped_table::layout::{Budget, ColumnMeasure, allocate_widths};
//!
//! let columns = [
//!     ColumnMeasure::natural(2),
//!     ColumnMeasure::natural(56),
//!     ColumnMeasure::natural(55),
//! ];
//! let widths = allocate_widths(&columns, &Budget::new(Some(80), 0, 2));
//! assert_eq!(widths, vec![2, 36, 36]);
//! ```

/// Width requirements of one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnMeasure {
    /// Width the user pinned the column to.
    pub fixed: Option<usize>,
    /// Widest styled cell or header, markers excluded.
    pub natural: usize,
}

impl ColumnMeasure {
    /// A flexible column with the given natural width.
    #[must_use]
    pub const fn natural(natural: usize) -> Self {
        Self {
            fixed: None,
            natural,
        }
    }

    /// A column pinned to `width`.
    #[must_use]
    pub const fn fixed(width: usize, natural: usize) -> Self {
        Self {
            fixed: Some(width),
            natural,
        }
    }
}

/// The space a table may occupy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Budget {
    /// Total width, `None` when unbounded.
    pub total: Option<usize>,
    /// Spaces before the first column.
    pub indent: usize,
    /// Spaces after every column.
    pub cell_pad: usize,
}

impl Budget {
    /// Create a budget.
    #[must_use]
    pub const fn new(total: Option<usize>, indent: usize, cell_pad: usize) -> Self {
        Self {
            total,
            indent,
            cell_pad,
        }
    }

    /// Padding every line needs regardless of content: the indent plus one
    /// cell pad per column.
    #[must_use]
    pub const fn required_padding(&self, columns: usize) -> usize {
        self.indent + columns * self.cell_pad
    }
}

/// Outcome of the first pass for a single column.
#[derive(Debug, Clone, Copy)]
struct Provisional {
    width: i64,
    wrapped: bool,
}

/// Compute the render width of every column.
///
/// Every returned width is at least 1. When the budget is too small for
/// that, the widths still come back as 1 and the rendered table is wider
/// than requested.
#[must_use]
pub fn allocate_widths(columns: &[ColumnMeasure], budget: &Budget) -> Vec<usize> {
    let Some(total) = budget.total else {
        return columns
            .iter()
            .map(|col| col.fixed.unwrap_or(col.natural).max(1))
            .collect();
    };

    let total = to_signed(total);
    let required = to_signed(budget.required_padding(columns.len()));
    let fixed_sum: i64 = columns.iter().filter_map(|c| c.fixed).map(to_signed).sum();

    // Pass 1: hand out fair shares in column order.
    let mut available = total - required - fixed_sum;
    let mut remaining = to_signed(columns.iter().filter(|c| c.fixed.is_none()).count());
    let provisional: Vec<Provisional> = columns
        .iter()
        .map(|col| {
            let share = available.div_euclid(remaining.max(1));
            remaining -= 1;

            let natural = to_signed(col.natural);
            if let Some(fixed) = col.fixed {
                Provisional {
                    width: to_signed(fixed),
                    wrapped: false,
                }
            } else if natural < share {
                available -= natural;
                Provisional {
                    width: natural,
                    wrapped: false,
                }
            } else {
                available -= share;
                Provisional {
                    width: share,
                    wrapped: true,
                }
            }
        })
        .collect();

    // Pass 2: give whatever is left to the wrapped columns.
    let used: i64 = provisional.iter().map(|p| p.width).sum();
    let mut surplus = total - used - required;
    let mut remaining = to_signed(provisional.iter().filter(|p| p.wrapped).count());
    let widths: Vec<usize> = provisional
        .iter()
        .zip(columns)
        .map(|(p, col)| {
            let extra = surplus.div_euclid(remaining.max(1));
            remaining -= 1;

            let width = if p.wrapped {
                let natural = to_signed(col.natural);
                if natural < p.width + extra {
                    surplus -= natural - p.width;
                    natural
                } else {
                    surplus -= extra;
                    p.width + extra
                }
            } else {
                p.width
            };
            usize::try_from(width).unwrap_or(0).max(1)
        })
        .collect();

    let content_budget = total - required;
    if content_budget < to_signed(columns.len()) {
        log::debug!(
            "width {total} leaves {content_budget} cells for {} columns; clamping to 1",
            columns.len()
        );
    }
    log::debug!("allocated column widths {widths:?} within {total}");

    widths
}

fn to_signed(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}
