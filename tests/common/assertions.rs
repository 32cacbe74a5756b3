//! Logged assertion helpers for table tests.
//!
//! These functions wrap standard assertions with tracing logs,
//! providing detailed context when assertions fail.

#![allow(dead_code)]

use std::fmt::Debug;

use wrapped_table::markers::MarkerCatalog;

/// Assert equality with detailed logging.
#[track_caller]
pub fn assert_eq_logged<T: PartialEq + Debug>(context: &str, actual: T, expected: T) {
    tracing::debug!(
        context = context,
        expected = ?expected,
        actual = ?actual,
        "asserting equality"
    );

    if actual != expected {
        tracing::error!(
            context = context,
            expected = ?expected,
            actual = ?actual,
            "assertion failed: values not equal"
        );
    }

    assert_eq!(
        actual, expected,
        "{context}: expected {expected:?}, got {actual:?}"
    );
}

/// Assert that rendered table text matches, ignoring leading and trailing
/// whitespace of the whole block.
#[track_caller]
pub fn assert_table_matches(actual: &str, expected: &str) {
    let actual = actual.trim();
    let expected = expected.trim();
    if actual != expected {
        tracing::error!(%actual, %expected, "rendered table differs");
    }
    assert_eq!(
        actual, expected,
        "rendered table differs\n--- actual ---\n{actual}\n--- expected ---\n{expected}"
    );
}

/// Assert that no line is wider than `width` display cells.
#[track_caller]
pub fn assert_max_line_width(catalog: &MarkerCatalog, rendered: &str, width: usize) {
    for (number, line) in rendered.lines().enumerate() {
        let line_width = wrapped_table::cells::display_width(catalog, line);
        tracing::trace!(number, line_width, "checking line width");
        assert!(
            line_width <= width,
            "line {number} is {line_width} cells wide, limit {width}: {line:?}"
        );
    }
}
