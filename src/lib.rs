//! Sentence template multiplier.
//!
//! Expands templates with bracketed alternative groups into every
//! combination, keeps the expansions of related templates aligned
//! as adjacent minimal pairs, and writes one delimited record per
//! sentence with the word positions of tracked feature words.
//!
//! # Quick start
//!
//! ## Expand a single template
//!
//! ```
//! use sentence_multiplier::expand_str;
//!
//! let sentences: Vec<String> = expand_str("A [ B1 B2 ] [ C1 C2 ]")
//!     .unwrap()
//!     .iter()
//!     .map(ToString::to_string)
//!     .collect();
//! assert_eq!(sentences, ["A B1 C1", "A B1 C2", "A B2 C1", "A B2 C2"]);
//! ```
//!
//! ## Generate records for a block of minimal pairs
//!
//! ```
//! use sentence_multiplier::{Filter, Header, run};
//!
//! let input = "<block id='wh'>\nWho [ walked walks ]\nWhat [ walked walks ]\n</block>\n";
//! let header = Header::parse("ID|BLOCK|NUM|SENTENCE|ORIG#|walks|", '|').unwrap();
//! let mut out = Vec::new();
//! run(input.as_bytes(), &mut out, header, Filter::default()).unwrap();
//!
//! let text = String::from_utf8(out).unwrap();
//! assert_eq!(text.lines().nth(2), Some("|wh|1|Who walks|1|2|"));
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

use std::io;
use std::path::PathBuf;

pub mod block;
pub mod config;
pub mod engine;
pub mod expand;
pub mod invert;
pub mod output;
pub mod record;
pub mod template;

pub use block::{
    BlockError, BlockErrorKind, BlockHeader, BlockMember, DEFAULT_BLOCK_NAME, PairedExpansion,
    pair_block,
};
pub use config::Config;
pub use engine::{Engine, Line, Summary, expand_line, run};
pub use expand::{Expansion, expand};
pub use invert::{invert_template, restore_order};
pub use output::{
    Destination, NumberedWriter, Question, number_records, prepare, process, renumber,
};
pub use record::{
    Filter, Header, HeaderError, Pairing, Record, RecordWriter, extract, feature_positions,
    is_gap_marker,
};
pub use template::{ParseError, ParseErrorKind, Template, Token, parse_template};

/// Unified error type for a multiplier run.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed template or block structure.
    #[error("{0}")]
    Parse(#[from] ParseError),
    /// A block that cannot be paired.
    #[error("{0}")]
    Block(#[from] BlockError),
    /// Unusable output header.
    #[error("{0}")]
    Header(#[from] HeaderError),
    /// The input file does not exist.
    #[error("the file {} does not exist", .0.display())]
    InputNotFound(PathBuf),
    /// The output file is in use and neither appending nor
    /// resetting was accepted.
    #[error("output file {} is in use, run aborted", .0.display())]
    Aborted(PathBuf),
    /// Reading the input or writing records failed.
    #[error("{0}")]
    Io(#[from] io::Error),
}

/// Parse and expand a template string in one step.
pub fn expand_str(input: &str) -> Result<Vec<Expansion>, ParseError> {
    Ok(expand(&parse_template(input)?))
}
