//! End-to-end performance regression tests for wrapped_table.
//!
//! Wrapping and rendering must stay linear in the size of the input, so a
//! single very long cell or a few thousand rows has to finish quickly even
//! in a debug build.
//! Run with: cargo test --test e2e_performance -- --nocapture
//!
//! # Environment Variables
//!
//! - `PERF_REGRESSION_THRESHOLD=100` - Override default regression threshold (default: 50%)
//! - `RUST_LOG=debug` - Enable detailed logging

mod common;

use common::init_test_logging;
use std::time::Instant;
use wrapped_table::markers::MarkerCatalog;
use wrapped_table::prelude::*;
use wrapped_table::wrap::Chunker;

// =============================================================================
// Configuration
// =============================================================================

/// Default regression threshold percentage (50% slower than baseline = failure)
const DEFAULT_REGRESSION_THRESHOLD: f64 = 50.0;

/// Debug-build baselines in milliseconds.
const BASELINES_MS: &[(&str, u64)] = &[
    ("chunk_1mb_cell_ms", 2_000),
    ("chunk_styled_200k_ms", 2_000),
    ("render_large_cell_ms", 3_000),
    ("render_5000_rows_ms", 3_000),
    ("sorted_search_5000_rows_ms", 4_000),
    ("csv_export_5000_rows_ms", 2_000),
];

fn get_baseline_ms(name: &str) -> Option<u64> {
    BASELINES_MS
        .iter()
        .find(|(metric, _)| *metric == name)
        .map(|(_, ms)| *ms)
}

/// Get regression threshold percentage
fn get_regression_threshold() -> f64 {
    std::env::var("PERF_REGRESSION_THRESHOLD")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(DEFAULT_REGRESSION_THRESHOLD)
}

/// Assert performance is within threshold of baseline
fn assert_perf_within_threshold(name: &str, elapsed_ms: u128) {
    let Some(baseline) = get_baseline_ms(name) else {
        tracing::warn!(metric = name, "No baseline found, skipping assertion");
        return;
    };

    let threshold = get_regression_threshold();
    let max_allowed = (baseline as f64 * (1.0 + threshold / 100.0)) as u128;

    tracing::info!(
        metric = name,
        elapsed_ms = elapsed_ms,
        baseline_ms = baseline,
        threshold = format!("{threshold}%"),
        "Performance measurement"
    );

    assert!(
        elapsed_ms <= max_allowed,
        "Performance regression detected for '{name}': {elapsed_ms}ms > {max_allowed}ms (threshold: {threshold}%)"
    );
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Generate word-like text of exactly `length` bytes.
fn generate_text(length: usize) -> String {
    let words = [
        "the", "quick", "brown", "fox", "jumps", "over", "lazy", "dog", "Lorem", "ipsum",
        "dolor", "sit", "amet", "consectetur", "adipiscing", "elit",
    ];

    let mut result = String::with_capacity(length + 16);
    let mut word_idx = 0;
    while result.len() < length {
        if !result.is_empty() {
            result.push(' ');
        }
        result.push_str(words[word_idx % words.len()]);
        word_idx += 1;
    }
    result.truncate(length);
    result
}

/// Generate text with a colour change every few words.
fn generate_styled(count: usize) -> String {
    let colors = ["%red", "%grn", "%blu", "%bld"];
    let mut text = String::new();
    for i in 0..count {
        text.push_str(colors[i % colors.len()]);
        text.push_str("item ");
        text.push_str(&i.to_string());
        text.push_str("%clr ");
    }
    text
}

fn create_large_table(rows: usize) -> Table {
    let mut table = Table::builder(["id", "address", "status", "note"])
        .width(160)
        .build()
        .unwrap();
    for r in 0..rows {
        table
            .add_row([
                (rows - r).to_string(),
                format!("10.{}.{}.{}", r / 65536 % 256, r / 256 % 256, r % 256),
                if r % 3 == 0 { "%grnup%clr" } else { "%reddown%clr" }.to_string(),
                generate_text(40 + r % 80),
            ])
            .unwrap();
    }
    table
}

// =============================================================================
// Wrapping Performance Tests
// =============================================================================

#[test]
fn perf_chunk_1mb_cell() {
    init_test_logging();
    let catalog = MarkerCatalog::standard();
    let text = generate_text(1_000_000);

    let start = Instant::now();
    let chunks = Chunker::new(&catalog, 37).chunks(&text);
    let elapsed = start.elapsed();

    assert_eq!(chunks.len(), 1_000_000_usize.div_ceil(37));
    tracing::info!(
        chunk_count = chunks.len(),
        elapsed_ms = elapsed.as_millis(),
        "1MB cell chunked"
    );
    assert_perf_within_threshold("chunk_1mb_cell_ms", elapsed.as_millis());
}

#[test]
fn perf_chunk_styled_text() {
    init_test_logging();
    let catalog = MarkerCatalog::standard();
    let text = generate_styled(20_000);

    let start = Instant::now();
    let chunks = Chunker::new(&catalog, 23).chunks(&text);
    let elapsed = start.elapsed();

    assert!(chunks.iter().all(|chunk| chunk.width() <= 23));
    tracing::info!(
        input_len = text.len(),
        chunk_count = chunks.len(),
        elapsed_ms = elapsed.as_millis(),
        "styled text chunked"
    );
    assert_perf_within_threshold("chunk_styled_200k_ms", elapsed.as_millis());
}

// =============================================================================
// Rendering Performance Tests
// =============================================================================

#[test]
fn perf_render_large_cell() {
    init_test_logging();
    let mut table = Table::builder(["key", "value"]).width(100).build().unwrap();
    table
        .add_row(["blob".to_string(), generate_text(500_000)])
        .unwrap();

    let start = Instant::now();
    let output = table.render();
    let elapsed = start.elapsed();

    assert!(output.lines().count() > 5_000);
    tracing::info!(
        output_len = output.len(),
        elapsed_ms = elapsed.as_millis(),
        "large cell rendered"
    );
    assert_perf_within_threshold("render_large_cell_ms", elapsed.as_millis());
}

#[test]
fn perf_render_5000_rows() {
    init_test_logging();
    let table = create_large_table(5_000);

    let start = Instant::now();
    let output = table.render();
    let elapsed = start.elapsed();

    assert!(output.lines().count() >= 5_002);
    tracing::info!(
        rows = 5_000,
        output_len = output.len(),
        elapsed_ms = elapsed.as_millis(),
        "5000 rows rendered"
    );
    assert_perf_within_threshold("render_5000_rows_ms", elapsed.as_millis());
}

#[test]
fn perf_sorted_search_5000_rows() {
    init_test_logging();
    let mut table = create_large_table(5_000);
    table.sort_rows(Some(1), SortOrder::Reverse);
    let filtered = {
        let mut options = Table::builder(table.columns().to_vec())
            .width(160)
            .sort_index(Some(1))
            .search_term("up");
        for row in table.rows() {
            if let Some(cells) = row.cells() {
                options = options.rows([cells.to_vec()]);
            }
        }
        options.build().unwrap()
    };

    let start = Instant::now();
    let output = filtered.render();
    let elapsed = start.elapsed();

    // Rows whose index is a multiple of three are "up".
    assert!(output.lines().count() >= 5_000 / 3);
    tracing::info!(
        output_len = output.len(),
        elapsed_ms = elapsed.as_millis(),
        "sorted and filtered render"
    );
    assert_perf_within_threshold("sorted_search_5000_rows_ms", elapsed.as_millis());
}

#[test]
fn perf_csv_export_5000_rows() {
    init_test_logging();
    let table = create_large_table(5_000);

    let start = Instant::now();
    let csv = table.to_csv().unwrap();
    let elapsed = start.elapsed();

    assert_eq!(csv.lines().count(), 5_001);
    tracing::info!(
        csv_len = csv.len(),
        elapsed_ms = elapsed.as_millis(),
        "CSV exported"
    );
    assert_perf_within_threshold("csv_export_5000_rows_ms", elapsed.as_millis());
}
