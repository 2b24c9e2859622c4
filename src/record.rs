//! Feature extraction and delimited record output.
//!
//! The output file's first line names its columns. Columns 0 to 4
//! are fixed (sequence number, block name, pair index, sentence,
//! origin index); every later column names a tracked feature word
//! whose first 1-based word position is written per record.

use std::collections::HashSet;
use std::fmt;
use std::io::{self, Write};
use std::sync::LazyLock;

use regex::Regex;

use crate::expand::Expansion;

/// Column separator used when none is configured.
pub const DEFAULT_SEPARATOR: char = '|';

/// Placeholder written in the block and pair columns outside blocks.
pub const NO_BLOCK: &str = "-----";

/// Number of fixed columns preceding the feature columns.
pub const FIXED_COLUMNS: usize = 5;

/// Column count of the header used when writing to stdout.
pub const STDOUT_COLUMNS: usize = 8;

static GAP_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^@@[0-9]*@@$").expect("gap marker pattern is valid"));

/// Whether `word` is a gap marker such as `@@3@@` or `@@@@`.
#[must_use]
pub fn is_gap_marker(word: &str) -> bool {
    GAP_MARKER.is_match(word)
}

/// Error produced when the output header cannot describe a record.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("header has {found} column(s), at least {FIXED_COLUMNS} required")]
pub struct HeaderError {
    pub found: usize,
}

/// Column layout read from the output file's first line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Header {
    columns: Vec<String>,
    separator: char,
}

impl Header {
    /// Parse a header line. One trailing separator closes the last
    /// column and does not start a new one.
    ///
    /// # Errors
    ///
    /// Returns `HeaderError` when fewer than five columns remain.
    pub fn parse(line: &str, separator: char) -> Result<Self, HeaderError> {
        let line = line.trim_end_matches(['\r', '\n']);
        let line = line.strip_suffix(separator).unwrap_or(line);
        let columns: Vec<String> = line.split(separator).map(ToString::to_string).collect();

        if columns.len() < FIXED_COLUMNS {
            return Err(HeaderError {
                found: columns.len(),
            });
        }

        Ok(Self { columns, separator })
    }

    /// Header with `STDOUT_COLUMNS` unnamed columns and no features.
    #[must_use]
    pub fn anonymous(separator: char) -> Self {
        Self {
            columns: vec![String::new(); STDOUT_COLUMNS],
            separator,
        }
    }

    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    #[must_use]
    pub const fn separator(&self) -> char {
        self.separator
    }

    /// Tracked feature words, in column order.
    pub fn features(&self) -> impl Iterator<Item = &str> {
        self.columns[FIXED_COLUMNS..].iter().map(String::as_str)
    }

    /// Column index tracking `word`, if any.
    fn feature_column(&self, word: &str) -> Option<usize> {
        self.columns[FIXED_COLUMNS..]
            .iter()
            .position(|name| !name.is_empty() && name == word)
            .map(|i| i + FIXED_COLUMNS)
    }
}

impl fmt::Display for Header {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for column in &self.columns {
            write!(f, "{column}{}", self.separator)?;
        }
        Ok(())
    }
}

/// Words whose joint presence suppresses a record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filter {
    words: HashSet<String>,
}

impl Filter {
    /// Build a filter from a whitespace-separated word list.
    #[must_use]
    pub fn parse(words: &str) -> Self {
        Self {
            words: words.split_whitespace().map(ToString::to_string).collect(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    /// True when every filter word occurs in `sentence`. An empty
    /// filter never suppresses.
    #[must_use]
    pub fn suppresses(&self, sentence: &[String]) -> bool {
        !self.words.is_empty() && self.words.iter().all(|w| sentence.contains(w))
    }
}

/// Block membership of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pairing<'a> {
    pub block: &'a str,
    pub pair: usize,
}

/// One output line before numbering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record<'a> {
    pub pairing: Option<Pairing<'a>>,
    pub sentence: String,
    pub origin: usize,
    /// First 1-based position per header column; `None` for fixed
    /// columns and absent features.
    pub positions: Vec<Option<usize>>,
}

impl Record<'_> {
    /// Render the record as one line, each field followed by the
    /// separator. Column 0 is left empty for the numbering pass.
    #[must_use]
    pub fn render(&self, header: &Header) -> String {
        use std::fmt::Write as _;

        let sep = header.separator();
        let mut out = String::new();
        let (block, pair) = self.pairing.map_or_else(
            || (NO_BLOCK.to_string(), NO_BLOCK.to_string()),
            |p| (p.block.trim().to_string(), p.pair.to_string()),
        );

        out.push(sep);
        let _ = write!(out, "{block}{sep}{pair}{sep}");
        let _ = write!(out, "{}{sep}{}{sep}", self.sentence.trim(), self.origin);
        for position in &self.positions[FIXED_COLUMNS..] {
            if let Some(p) = position {
                let _ = write!(out, "{p}");
            }
            out.push(sep);
        }
        out
    }
}

/// First 1-based word position of every tracked feature.
///
/// Gap markers can themselves be tracked but never advance the
/// position counter.
#[must_use]
pub fn feature_positions(words: &[String], header: &Header) -> Vec<Option<usize>> {
    let mut positions = vec![None; header.columns().len()];
    let mut position = 1;

    for word in words {
        if let Some(column) = header.feature_column(word) {
            positions[column].get_or_insert(position);
        }
        if !is_gap_marker(word) {
            position += 1;
        }
    }

    positions
}

/// Build the record for one expansion, or `None` if the filter
/// suppresses it.
#[must_use]
pub fn extract<'a>(
    expansion: &Expansion,
    pairing: Option<Pairing<'a>>,
    origin: usize,
    header: &Header,
    filter: &Filter,
) -> Option<Record<'a>> {
    let words = expansion.flatten();
    if filter.suppresses(&words) {
        return None;
    }

    let positions = feature_positions(&words, header);
    let sentence = words
        .iter()
        .filter(|w| !is_gap_marker(w))
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ");

    Some(Record {
        pairing,
        sentence,
        origin,
        positions,
    })
}

/// Writes records for expansions, applying the filter.
#[derive(Debug)]
pub struct RecordWriter<W> {
    out: W,
    header: Header,
    filter: Filter,
    written: usize,
    suppressed: usize,
}

impl<W: Write> RecordWriter<W> {
    pub const fn new(out: W, header: Header, filter: Filter) -> Self {
        Self {
            out,
            header,
            filter,
            written: 0,
            suppressed: 0,
        }
    }

    /// Extract and write one expansion. Returns whether a line was
    /// written.
    pub fn write(
        &mut self,
        expansion: &Expansion,
        pairing: Option<Pairing<'_>>,
        origin: usize,
    ) -> io::Result<bool> {
        match extract(expansion, pairing, origin, &self.header, &self.filter) {
            Some(record) => {
                writeln!(self.out, "{}", record.render(&self.header))?;
                self.written += 1;
                Ok(true)
            }
            None => {
                tracing::debug!(sentence = %expansion, "record suppressed by filter");
                self.suppressed += 1;
                Ok(false)
            }
        }
    }

    #[must_use]
    pub const fn written(&self) -> usize {
        self.written
    }

    #[must_use]
    pub const fn suppressed(&self) -> usize {
        self.suppressed
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header() -> Header {
        Header::parse("ID|BLOCK|NUM|SENTENCE|ORIG#|dog|cat|@@@@|", '|').unwrap()
    }

    fn expansion(s: &str) -> Expansion {
        Expansion::new(s.split(' ').map(ToString::to_string).collect())
    }

    #[test]
    fn gap_markers() {
        assert!(is_gap_marker("@@@@"));
        assert!(is_gap_marker("@@12@@"));
        assert!(!is_gap_marker("@@a@@"));
        assert!(!is_gap_marker("x@@1@@"));
    }

    #[test]
    fn header_drops_trailing_separator() {
        let h = header();
        assert_eq!(h.columns().len(), 8);
        assert_eq!(h.features().collect::<Vec<_>>(), ["dog", "cat", "@@@@"]);
    }

    #[test]
    fn header_too_short() {
        assert_eq!(Header::parse("A|B|C|", '|'), Err(HeaderError { found: 3 }));
    }

    #[test]
    fn anonymous_header_roundtrips() {
        let h = Header::anonymous('|');
        assert_eq!(h.to_string(), "||||||||");
        assert_eq!(Header::parse(&h.to_string(), '|').unwrap(), h);
    }

    #[test]
    fn positions_of_features() {
        let r = extract(
            &expansion("the dog sees a cat"),
            None,
            1,
            &header(),
            &Filter::default(),
        )
        .unwrap();
        assert_eq!(r.positions[5], Some(2));
        assert_eq!(r.positions[6], Some(5));
        assert_eq!(r.positions[7], None);
        assert_eq!(r.sentence, "the dog sees a cat");
    }

    #[test]
    fn first_occurrence_wins() {
        let r = extract(
            &expansion("dog bites dog"),
            None,
            1,
            &header(),
            &Filter::default(),
        )
        .unwrap();
        assert_eq!(r.positions[5], Some(1));
    }

    #[test]
    fn gap_marker_is_zero_width() {
        let r = extract(
            &expansion("the @@3@@ dog sees @@@@ a cat"),
            None,
            1,
            &header(),
            &Filter::default(),
        )
        .unwrap();
        assert_eq!(r.positions[5], Some(2));
        assert_eq!(r.positions[6], Some(5));
        assert_eq!(r.positions[7], Some(4));
        assert_eq!(r.sentence, "the dog sees a cat");
    }

    #[test]
    fn filter_needs_all_words() {
        let filter = Filter::parse("dog cat");
        let h = header();
        assert!(extract(&expansion("the dog sees a cat"), None, 1, &h, &filter).is_none());
        assert!(extract(&expansion("the dog sleeps"), None, 1, &h, &filter).is_some());
    }

    #[test]
    fn empty_filter_keeps_everything() {
        assert!(!Filter::parse("   ").suppresses(&["a".to_string()]));
    }

    #[test]
    fn render_outside_block() {
        let h = header();
        let r = extract(&expansion("the dog"), None, 3, &h, &Filter::default()).unwrap();
        assert_eq!(r.render(&h), "|-----|-----|the dog|3|2|||");
    }

    #[test]
    fn render_inside_block() {
        let h = header();
        let pairing = Pairing {
            block: "tense",
            pair: 1,
        };
        let r = extract(&expansion("a cat"), Some(pairing), 2, &h, &Filter::default()).unwrap();
        assert_eq!(r.render(&h), "|tense|1|a cat|2||2||");
    }

    #[test]
    fn special_columns_are_not_features() {
        let h = header();
        let r = extract(&expansion("BLOCK dog"), None, 1, &h, &Filter::default()).unwrap();
        assert!(r.positions[..FIXED_COLUMNS].iter().all(Option::is_none));
        assert_eq!(r.positions[5], Some(2));
    }
}
