//! Display-width calculations.
//!
//! Every codepoint renders one cell wide and formatting markers render zero
//! wide. Wide glyphs (CJK, emoji) are deliberately counted as one cell.

use std::fmt;
use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use lru::LruCache;

use crate::markers::MarkerCatalog;
use crate::sync::lock_recover;

/// Minimum string length to cache (shorter strings have minimal overhead).
const CACHE_MIN_LEN: usize = 8;

/// Capacity of the per-measurer LRU cache.
const CACHE_CAPACITY: usize = 1024;

/// Get the display width of `text`, with markers counting zero.
#[must_use]
pub fn display_width(catalog: &MarkerCatalog, text: &str) -> usize {
    let mut width = 0;
    let mut pos = 0;
    while let Some(ch) = text[pos..].chars().next() {
        if let Some(marker) = catalog.find_marker_at(text, pos) {
            pos += marker.token().len();
        } else {
            width += 1;
            pos += ch.len_utf8();
        }
    }
    width
}

/// Get the display width of raw bytes.
///
/// Invalid UTF-8 sequences are replaced by U+FFFD, which counts as one cell.
#[must_use]
pub fn display_width_lossy(catalog: &MarkerCatalog, bytes: &[u8]) -> usize {
    display_width(catalog, &String::from_utf8_lossy(bytes))
}

/// Measures display widths against one catalog, caching long strings.
///
/// The cache is an LRU keyed by the string; entries are only valid for the
/// catalog the measurer was built with, which is why the cache lives here
/// and not in a global.
pub struct WidthMeasurer {
    catalog: Arc<MarkerCatalog>,
    cache: Mutex<LruCache<String, usize>>,
}

impl WidthMeasurer {
    /// Create a measurer for `catalog`.
    #[must_use]
    pub fn new(catalog: Arc<MarkerCatalog>) -> Self {
        let capacity = NonZeroUsize::new(CACHE_CAPACITY).unwrap_or(NonZeroUsize::MIN);
        Self {
            catalog,
            cache: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// The catalog markers are recognized from.
    #[must_use]
    pub fn catalog(&self) -> &MarkerCatalog {
        &self.catalog
    }

    /// Shared handle to the catalog.
    #[must_use]
    pub fn catalog_arc(&self) -> Arc<MarkerCatalog> {
        Arc::clone(&self.catalog)
    }

    /// Display width of `text` (cached for longer strings).
    #[must_use]
    pub fn display_width(&self, text: &str) -> usize {
        if text.len() < CACHE_MIN_LEN {
            return display_width(&self.catalog, text);
        }

        if let Some(&cached) = lock_recover(&self.cache).get(text) {
            return cached;
        }

        let width = display_width(&self.catalog, text);
        lock_recover(&self.cache).put(text.to_string(), width);
        width
    }

    /// Display width of raw bytes, see [`display_width_lossy`].
    #[must_use]
    pub fn display_width_lossy(&self, bytes: &[u8]) -> usize {
        self.display_width(&String::from_utf8_lossy(bytes))
    }

    /// Left-justify `text` to `width` display cells.
    ///
    /// Markers do not count toward the width, so a styled string gets the
    /// same visible padding as its plain counterpart. Text already at or
    /// beyond `width` is returned unchanged.
    #[must_use]
    pub fn pad_right(&self, text: &str, width: usize) -> String {
        let current = self.display_width(text);
        if current >= width {
            return text.to_string();
        }
        let mut padded = String::with_capacity(text.len() + width - current);
        padded.push_str(text);
        padded.extend(std::iter::repeat_n(' ', width - current));
        padded
    }
}

impl Clone for WidthMeasurer {
    fn clone(&self) -> Self {
        Self::new(Arc::clone(&self.catalog))
    }
}

impl fmt::Debug for WidthMeasurer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WidthMeasurer")
            .field("markers", &self.catalog.len())
            .field("cached", &lock_recover(&self.cache).len())
            .finish()
    }
}
