//! Per-column cell decorators.
//!
//! A [`Formatter`] rewrites a cell value once, when the row is added; the
//! stored value is the formatted one and it feeds sorting, searching and CSV
//! export. A [`Styler`] runs every time the table renders and usually adds
//! formatting markers; its output is what gets measured and wrapped.
//!
//! Any `Fn(&str) -> String` closure implements both traits:
//!
//! ```
//! use wrapped_table::decorate::{Formatter, Styler};
//!
//! let upper = |s: &str| s.to_uppercase();
//! assert_eq!(Formatter::format(&upper, "ok"), "OK");
//! assert_eq!(Styler::style(&upper, "ok"), "OK");
//! ```

use std::collections::HashMap;

use regex::{Regex, RegexBuilder};

/// Rewrites a cell value at insertion time.
pub trait Formatter: Send + Sync {
    /// Return the value to store.
    fn format(&self, value: &str) -> String;
}

/// Decorates a cell value at render time.
pub trait Styler: Send + Sync {
    /// Return the text to render.
    fn style(&self, value: &str) -> String;
}

impl<F> Formatter for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn format(&self, value: &str) -> String {
        self(value)
    }
}

impl<F> Styler for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn style(&self, value: &str) -> String {
        self(value)
    }
}

/// Wraps every non-empty cell in a marker and the clear marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Colorize {
    open: String,
    clear: String,
}

impl Colorize {
    /// Colour cells with the marker token `open` (e.g. `%grn`).
    #[must_use]
    pub fn new(open: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            clear: "%clr".to_string(),
        }
    }

    /// Use a different clear token, for custom catalogs.
    #[must_use]
    pub fn clear_with(mut self, clear: impl Into<String>) -> Self {
        self.clear = clear.into();
        self
    }
}

impl Styler for Colorize {
    fn style(&self, value: &str) -> String {
        if value.is_empty() {
            return String::new();
        }
        format!("{}{value}{}", self.open, self.clear)
    }
}

/// Colours a cell according to its exact value.
///
/// Useful for status columns: `open` in green, `closed` in red, everything
/// else untouched.
#[derive(Debug, Clone)]
pub struct ValueColors {
    colors: HashMap<String, String>,
    clear: String,
}

impl Default for ValueColors {
    fn default() -> Self {
        Self::new()
    }
}

impl ValueColors {
    /// Create an empty mapping.
    #[must_use]
    pub fn new() -> Self {
        Self {
            colors: HashMap::new(),
            clear: "%clr".to_string(),
        }
    }

    /// Colour cells equal to `value` with `marker`.
    #[must_use]
    pub fn color(mut self, value: impl Into<String>, marker: impl Into<String>) -> Self {
        self.colors.insert(value.into(), marker.into());
        self
    }
}

impl Styler for ValueColors {
    fn style(&self, value: &str) -> String {
        match self.colors.get(value) {
            Some(marker) => format!("{marker}{value}{}", self.clear),
            None => value.to_string(),
        }
    }
}

/// Highlights every match of a pattern inside a cell.
#[derive(Debug, Clone)]
pub struct HighlightMatches {
    pattern: Regex,
    open: String,
    clear: String,
}

impl HighlightMatches {
    /// Highlight case-insensitive matches of `pattern` with `marker`.
    ///
    /// # Errors
    ///
    /// Returns the [`regex::Error`] for an invalid pattern.
    pub fn new(pattern: &str, marker: impl Into<String>) -> Result<Self, regex::Error> {
        let pattern = RegexBuilder::new(pattern).case_insensitive(true).build()?;
        Ok(Self {
            pattern,
            open: marker.into(),
            clear: "%clr".to_string(),
        })
    }
}

impl Styler for HighlightMatches {
    fn style(&self, value: &str) -> String {
        let mut out = String::with_capacity(value.len());
        let mut last = 0;
        for m in self.pattern.find_iter(value) {
            if m.is_empty() {
                continue;
            }
            out.push_str(&value[last..m.start()]);
            out.push_str(&self.open);
            out.push_str(m.as_str());
            out.push_str(&self.clear);
            last = m.end();
        }
        out.push_str(&value[last..]);
        out
    }
}

/// Replaces empty values with a placeholder such as `-`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyPlaceholder(pub String);

impl Formatter for EmptyPlaceholder {
    fn format(&self, value: &str) -> String {
        if value.is_empty() {
            self.0.clone()
        } else {
            value.to_string()
        }
    }
}
