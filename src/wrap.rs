//! Marker-aware cell wrapping.
//!
//! [`Chunker`] cuts a cell into line-sized [`Chunk`]s. Markers are never
//! split, style that is still open when a line ends is closed on that line
//! and re-opened at the start of the next one, so each line can be printed
//! on its own without colour bleeding into the padding.
//!
//! ```
//! use wrapped_table::markers::MarkerCatalog;
//! use wrapped_table::wrap::Chunker;
//!
//! let catalog = MarkerCatalog::standard();
//! let chunks = Chunker::new(&catalog, 4).chunks("%redABCDEF%clr");
//! let lines: Vec<&str> = chunks.iter().map(|c| c.as_str()).collect();
//! assert_eq!(lines, ["%redABCD%clr", "%redEF%clr"]);
//! ```

use crate::markers::{Marker, MarkerCatalog, StyleState};

/// One line's worth of a cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    text: String,
    width: usize,
    reopened: usize,
    closed: usize,
}

impl Chunk {
    /// The text to print, including any re-opened and auto-closed markers.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.text
    }

    /// Display width (markers excluded).
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// The part of the chunk that came from the original cell text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.text[self.reopened..self.text.len() - self.closed]
    }

    /// Markers re-emitted at the start to resume the previous line's style.
    #[must_use]
    pub fn reopened(&self) -> &str {
        &self.text[..self.reopened]
    }

    /// Whether a clear marker was appended to terminate open style.
    #[must_use]
    pub fn auto_closed(&self) -> bool {
        self.closed > 0
    }

    /// Consume the chunk, returning its printable text.
    #[must_use]
    pub fn into_string(self) -> String {
        self.text
    }
}

/// Splits cell text into chunks no wider than a column.
#[derive(Debug, Clone, Copy)]
pub struct Chunker<'a> {
    catalog: &'a MarkerCatalog,
    width: usize,
}

impl<'a> Chunker<'a> {
    /// Create a chunker for a column `width` cells wide (at least 1).
    #[must_use]
    pub fn new(catalog: &'a MarkerCatalog, width: usize) -> Self {
        Self {
            catalog,
            width: width.max(1),
        }
    }

    /// The column width chunks are cut to.
    #[must_use]
    pub fn width(&self) -> usize {
        self.width
    }

    /// Split `text` into chunks.
    ///
    /// Empty text yields no chunks. Text made only of markers yields a
    /// single zero-width chunk. Otherwise every chunk holds between 1 and
    /// `width` visible codepoints; a new chunk is only started when a
    /// visible codepoint needs it, so markers that trail a full line stay
    /// on that line.
    #[must_use]
    pub fn chunks(&self, text: &str) -> Vec<Chunk> {
        let mut builder = ChunkBuilder::new(self.catalog);
        let mut pos = 0;

        while let Some(ch) = text[pos..].chars().next() {
            if let Some(marker) = self.catalog.find_marker_at(text, pos) {
                builder.push_marker(marker);
                pos += marker.token().len();
                continue;
            }

            if builder.width == self.width {
                builder.break_line();
            }
            builder.push_char(ch);
            pos += ch.len_utf8();
        }

        builder.finish()
    }
}

struct ChunkBuilder<'a> {
    catalog: &'a MarkerCatalog,
    state: StyleState<'a>,
    chunks: Vec<Chunk>,
    text: String,
    width: usize,
    reopened: usize,
}

impl<'a> ChunkBuilder<'a> {
    fn new(catalog: &'a MarkerCatalog) -> Self {
        Self {
            catalog,
            state: StyleState::new(),
            chunks: Vec::new(),
            text: String::new(),
            width: 0,
            reopened: 0,
        }
    }

    fn push_marker(&mut self, marker: &'a Marker) {
        self.text.push_str(marker.token());
        self.state.apply(marker);
    }

    fn push_char(&mut self, ch: char) {
        self.text.push(ch);
        self.width += 1;
    }

    /// Close the current chunk and open the next one with the active style.
    fn break_line(&mut self) {
        self.close();
        self.text = self.state.render_open();
        self.reopened = self.text.len();
    }

    fn close(&mut self) {
        let mut closed = 0;
        if !self.state.is_empty() {
            let clear = self.catalog.clear_marker().token();
            self.text.push_str(clear);
            closed = clear.len();
        }
        self.chunks.push(Chunk {
            text: std::mem::take(&mut self.text),
            width: self.width,
            reopened: self.reopened,
            closed,
        });
        self.width = 0;
        self.reopened = 0;
    }

    fn finish(mut self) -> Vec<Chunk> {
        if !self.text.is_empty() {
            self.close();
        }
        self.chunks
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunk_strs(text: &str, width: usize) -> Vec<String> {
        let catalog = MarkerCatalog::standard();
        Chunker::new(&catalog, width)
            .chunks(text)
            .into_iter()
            .map(Chunk::into_string)
            .collect()
    }

    #[test]
    fn test_plain_text_slices() {
        assert_eq!(chunk_strs("abcdefg", 3), ["abc", "def", "g"]);
        assert_eq!(chunk_strs("abc", 3), ["abc"]);
        assert_eq!(chunk_strs("abc", 10), ["abc"]);
    }

    #[test]
    fn test_empty_text_has_no_chunks() {
        assert!(chunk_strs("", 5).is_empty());
    }

    #[test]
    fn test_zero_width_is_treated_as_one() {
        assert_eq!(chunk_strs("abc", 0), ["a", "b", "c"]);
    }

    #[test]
    fn test_multibyte_codepoints() {
        assert_eq!(chunk_strs("这是中文这是", 4), ["这是中文", "这是"]);
    }

    #[test]
    fn test_style_reopened_and_closed() {
        let text = format!("%blu{}%clr", "A".repeat(100));
        let chunks = chunk_strs(&text, 46);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0], format!("%blu{}%clr", "A".repeat(46)));
        assert_eq!(chunks[1], format!("%blu{}%clr", "A".repeat(46)));
        assert_eq!(chunks[2], format!("%blu{}%clr", "A".repeat(8)));
    }

    #[test]
    fn test_unclosed_style_is_closed_at_end() {
        assert_eq!(chunk_strs("%redabcde", 3), ["%redabc%clr", "%redde%clr"]);
    }

    #[test]
    fn test_markers_stay_with_full_line() {
        // The trailing clear fits on the first line; no marker-only line.
        assert_eq!(chunk_strs("%redabc%clr", 3), ["%redabc%clr"]);
        assert_eq!(chunk_strs("abc%red", 3), ["abc%red%clr"]);
    }

    #[test]
    fn test_mid_text_style_change() {
        let chunks = chunk_strs("ab%redcd%clref", 3);
        assert_eq!(chunks, ["ab%redc%clr", "%redd%clref"]);
    }

    #[test]
    fn test_decorations_reopen_in_order() {
        let chunks = chunk_strs("%und%grn%bldabcd", 2);
        assert_eq!(chunks, ["%und%grn%bldab%clr", "%grn%und%bldcd%clr"]);
    }

    #[test]
    fn test_only_markers() {
        let catalog = MarkerCatalog::standard();
        let chunks = Chunker::new(&catalog, 5).chunks("%red%clr");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].width(), 0);
        assert_eq!(chunks[0].as_str(), "%red%clr");
    }

    #[test]
    fn test_source_round_trip() {
        let catalog = MarkerCatalog::standard();
        let text = "%bgred%bldHello%clr wor%cyald, %undagain";
        for width in 1..12 {
            let chunks = Chunker::new(&catalog, width).chunks(text);
            let joined: String = chunks.iter().map(Chunk::source).collect();
            assert_eq!(joined, text, "width {width}");
            assert!(chunks.iter().all(|c| c.width() <= width));
        }
    }

    #[test]
    fn test_chunk_accessors() {
        let catalog = MarkerCatalog::standard();
        let chunks = Chunker::new(&catalog, 2).chunks("%redabc");
        assert_eq!(chunks[0].reopened(), "");
        assert!(chunks[0].auto_closed());
        assert_eq!(chunks[1].reopened(), "%red");
        assert_eq!(chunks[1].source(), "c");
        assert_eq!(chunks[1].width(), 1);
    }
}
