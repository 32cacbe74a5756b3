//! Inline formatting markers.
//!
//! Cells may carry short inline tokens such as `%blu` or `%clr` that select
//! colours and decorations. This module provides the validated
//! [`MarkerCatalog`] that recognizes them, and [`StyleState`], which tracks
//! the markers that are still open at a given point in a string so that a
//! wrapped cell can resume its styling on the next line.
//!
//! # Examples
//!
//! ```
//! use wrapped_table::markers::{MarkerCatalog, MarkerGroup};
//!
//! let catalog = MarkerCatalog::standard();
//! let marker = catalog.find_marker_at("%bluhello", 0).unwrap();
//! assert_eq!(marker.group(), MarkerGroup::Foreground);
//! assert_eq!(catalog.strip("%bluhello%clr"), "hello");
//! assert_eq!(catalog.to_ansi("%bluhi%clr", false), "\x1b[34mhi\x1b[0m");
//! ```

use std::collections::HashSet;
use std::fmt;

use smallvec::SmallVec;

/// The group a marker belongs to.
///
/// Groups decide how a marker interacts with the markers already open:
/// colours replace each other, decorations accumulate and `Clear` resets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkerGroup {
    /// Foreground colour. At most one is open at a time.
    Foreground,
    /// Background colour. At most one is open at a time.
    Background,
    /// Text decoration (bold, underline). Several may be open.
    Decoration,
    /// Resets every open marker.
    Clear,
}

/// A single inline marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Marker {
    token: String,
    group: MarkerGroup,
    sgr: String,
}

impl Marker {
    /// Create a marker from its token, group and ANSI SGR parameters.
    #[must_use]
    pub fn new(token: impl Into<String>, group: MarkerGroup, sgr: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            group,
            sgr: sgr.into(),
        }
    }

    /// The literal token as it appears in cell text.
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// The marker group.
    #[must_use]
    pub fn group(&self) -> MarkerGroup {
        self.group
    }

    /// SGR parameters (e.g. `"2;31"`) used for ANSI substitution.
    #[must_use]
    pub fn sgr(&self) -> &str {
        &self.sgr
    }

    /// The ANSI escape sequence for this marker.
    #[must_use]
    pub fn to_ansi(&self) -> String {
        format!("\x1b[{}m", self.sgr)
    }
}

/// Error type for catalog validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// A marker with an empty token.
    EmptyToken,
    /// A token containing whitespace (would be split by trimming/collapsing).
    WhitespaceInToken(String),
    /// The same token registered twice.
    DuplicateToken(String),
    /// No marker in the `Clear` group.
    MissingClear,
    /// More than one marker in the `Clear` group.
    MultipleClear(Vec<String>),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyToken => write!(f, "marker token must not be empty"),
            Self::WhitespaceInToken(token) => {
                write!(f, "marker token {token:?} contains whitespace")
            }
            Self::DuplicateToken(token) => write!(f, "marker token {token:?} registered twice"),
            Self::MissingClear => write!(f, "catalog has no clear marker"),
            Self::MultipleClear(tokens) => {
                write!(f, "catalog has more than one clear marker: {}", tokens.join(", "))
            }
        }
    }
}

impl std::error::Error for CatalogError {}

/// Foreground markers of the stock catalog with their SGR parameters.
const STANDARD_FOREGROUND: [(&str, &str); 15] = [
    ("%blk", "30"),
    ("%red", "31"),
    ("%grn", "32"),
    ("%yel", "33"),
    ("%blu", "34"),
    ("%mag", "35"),
    ("%cya", "36"),
    ("%whi", "37"),
    ("%dred", "2;31"),
    ("%dgrn", "2;32"),
    ("%dyel", "2;33"),
    ("%dblu", "2;34"),
    ("%dmag", "2;35"),
    ("%dcya", "2;36"),
    ("%dwhi", "2;37"),
];

/// Background markers of the stock catalog.
const STANDARD_BACKGROUND: [(&str, &str); 8] = [
    ("%bgblk", "40"),
    ("%bgred", "41"),
    ("%bggrn", "42"),
    ("%bgyel", "43"),
    ("%bgblu", "44"),
    ("%bgmag", "45"),
    ("%bgcyn", "46"),
    ("%bgwhi", "47"),
];

/// Decoration markers of the stock catalog.
const STANDARD_DECORATION: [(&str, &str); 2] = [("%und", "4"), ("%bld", "1")];

/// The stock clear marker.
const STANDARD_CLEAR: [(&str, &str); 1] = [("%clr", "0")];

/// A validated, closed set of markers.
///
/// The catalog is an explicit value: build one with [`MarkerCatalog::new`]
/// (or take [`MarkerCatalog::standard`]) and hand it to the measurer and
/// chunker. Validation happens once, here, so a malformed catalog never
/// reaches rendering where it would corrupt width accounting.
#[derive(Debug, Clone)]
pub struct MarkerCatalog {
    /// Markers ordered longest token first so lookups find the longest match.
    markers: Vec<Marker>,
    /// First bytes of every token, for a fast negative check.
    lead_bytes: [bool; 256],
    /// Index of the clear marker in `markers`.
    clear: usize,
}

impl MarkerCatalog {
    /// Build and validate a catalog.
    ///
    /// # Errors
    ///
    /// Returns a [`CatalogError`] when a token is empty, contains whitespace,
    /// is registered twice, or when the catalog does not contain exactly one
    /// clear marker.
    pub fn new(markers: impl IntoIterator<Item = Marker>) -> Result<Self, CatalogError> {
        let mut markers: Vec<Marker> = markers.into_iter().collect();
        let mut seen = HashSet::with_capacity(markers.len());

        for marker in &markers {
            if marker.token.is_empty() {
                return Err(CatalogError::EmptyToken);
            }
            if marker.token.chars().any(char::is_whitespace) {
                return Err(CatalogError::WhitespaceInToken(marker.token.clone()));
            }
            if !seen.insert(marker.token.as_str()) {
                return Err(CatalogError::DuplicateToken(marker.token.clone()));
            }
        }

        let clears: Vec<String> = markers
            .iter()
            .filter(|m| m.group == MarkerGroup::Clear)
            .map(|m| m.token.clone())
            .collect();
        match clears.len() {
            0 => return Err(CatalogError::MissingClear),
            1 => {}
            _ => return Err(CatalogError::MultipleClear(clears)),
        }

        // Stable sort keeps registration order among equal lengths.
        markers.sort_by(|a, b| b.token.len().cmp(&a.token.len()));

        let mut lead_bytes = [false; 256];
        for marker in &markers {
            lead_bytes[usize::from(marker.token.as_bytes()[0])] = true;
        }
        let clear = markers
            .iter()
            .position(|m| m.group == MarkerGroup::Clear)
            .ok_or(CatalogError::MissingClear)?;

        Ok(Self {
            markers,
            lead_bytes,
            clear,
        })
    }

    /// The stock `%xxx` catalog (colours, background colours, bold,
    /// underline and `%clr`).
    ///
    /// # Panics
    ///
    /// Never in practice: the stock table is covered by unit tests.
    #[must_use]
    pub fn standard() -> Self {
        let groups = [
            (MarkerGroup::Foreground, &STANDARD_FOREGROUND[..]),
            (MarkerGroup::Background, &STANDARD_BACKGROUND[..]),
            (MarkerGroup::Decoration, &STANDARD_DECORATION[..]),
            (MarkerGroup::Clear, &STANDARD_CLEAR[..]),
        ];
        let markers = groups.into_iter().flat_map(|(group, entries)| {
            entries
                .iter()
                .map(move |(token, sgr)| Marker::new(*token, group, *sgr))
        });
        Self::new(markers).expect("standard marker catalog is valid")
    }

    /// Number of markers in the catalog.
    #[must_use]
    pub fn len(&self) -> usize {
        self.markers.len()
    }

    /// Whether the catalog is empty. A valid catalog never is.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Iterate over the registered markers (longest token first).
    pub fn iter(&self) -> impl Iterator<Item = &Marker> {
        self.markers.iter()
    }

    /// The clear marker.
    #[must_use]
    pub fn clear_marker(&self) -> &Marker {
        &self.markers[self.clear]
    }

    /// Look up a marker by its exact token.
    #[must_use]
    pub fn get(&self, token: &str) -> Option<&Marker> {
        self.markers.iter().find(|m| m.token == token)
    }

    /// Find the marker starting at byte offset `pos` of `text`, if any.
    ///
    /// When several tokens match, the longest one wins. Positions that are
    /// out of range or not on a character boundary never match.
    #[must_use]
    pub fn find_marker_at(&self, text: &str, pos: usize) -> Option<&Marker> {
        let &lead = text.as_bytes().get(pos)?;
        if !self.lead_bytes[usize::from(lead)] || !text.is_char_boundary(pos) {
            return None;
        }
        let rest = &text[pos..];
        self.markers.iter().find(|m| rest.starts_with(m.token.as_str()))
    }

    /// Remove every marker from `text`.
    #[must_use]
    pub fn strip(&self, text: &str) -> String {
        self.substitute(text, |_| None)
    }

    /// Replace every marker with its ANSI escape sequence.
    ///
    /// In `prompt` mode each sequence is wrapped in `\x01`/`\x02` so line
    /// editors (readline) do not count it toward the prompt width.
    #[must_use]
    pub fn to_ansi(&self, text: &str, prompt: bool) -> String {
        self.substitute(text, |marker| {
            let ansi = marker.to_ansi();
            Some(if prompt {
                format!("\x01{ansi}\x02")
            } else {
                ansi
            })
        })
    }

    fn substitute(&self, text: &str, mut replace: impl FnMut(&Marker) -> Option<String>) -> String {
        let mut out = String::with_capacity(text.len());
        let mut pos = 0;
        while let Some(ch) = text[pos..].chars().next() {
            if let Some(marker) = self.find_marker_at(text, pos) {
                if let Some(replacement) = replace(marker) {
                    out.push_str(&replacement);
                }
                pos += marker.token.len();
            } else {
                out.push(ch);
                pos += ch.len_utf8();
            }
        }
        out
    }
}

/// Markers left open at some point of a string.
///
/// Applying markers in text order reproduces the terminal's view of the
/// active style; [`StyleState::render_open`] gives the token sequence that
/// re-establishes it on a fresh line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StyleState<'a> {
    foreground: Option<&'a Marker>,
    background: Option<&'a Marker>,
    decorations: SmallVec<[&'a Marker; 4]>,
}

impl<'a> StyleState<'a> {
    /// An empty state (nothing open).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the state with a marker consumed from the text.
    pub fn apply(&mut self, marker: &'a Marker) {
        match marker.group {
            MarkerGroup::Foreground => self.foreground = Some(marker),
            MarkerGroup::Background => self.background = Some(marker),
            MarkerGroup::Decoration => {
                if !self.decorations.iter().any(|m| m.token == marker.token) {
                    self.decorations.push(marker);
                }
            }
            MarkerGroup::Clear => self.reset(),
        }
    }

    /// Close everything.
    pub fn reset(&mut self) {
        self.foreground = None;
        self.background = None;
        self.decorations.clear();
    }

    /// Whether no marker is open.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.foreground.is_none() && self.background.is_none() && self.decorations.is_empty()
    }

    /// Open markers in rendering order: foreground, background, then
    /// decorations in the order they were opened.
    pub fn open_markers(&self) -> impl Iterator<Item = &'a Marker> + '_ {
        self.foreground
            .into_iter()
            .chain(self.background)
            .chain(self.decorations.iter().copied())
    }

    /// The token sequence that resumes the open style.
    #[must_use]
    pub fn render_open(&self) -> String {
        self.open_markers().map(Marker::token).collect()
    }
}
