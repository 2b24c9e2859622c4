//! Minimal-pair blocks: marker recognition and pairing.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::expand::Expansion;

/// Name given to blocks whose open marker carries no `id`.
pub const DEFAULT_BLOCK_NAME: &str = "default-block";

static BLOCK_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bid\s*=\s*(?:'([^']+)'|"([^"]+)")"#).expect("block id pattern is valid")
});

/// Classifies a block error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BlockErrorKind {
    /// Fewer than two templates between the markers.
    TooSmall { templates: usize },
    /// A template expands to a different count than the first one.
    LengthMismatch {
        expected: usize,
        found: usize,
        origin: usize,
    },
    /// Input ended inside the block.
    Unclosed,
}

impl fmt::Display for BlockErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooSmall { templates } => {
                write!(
                    f,
                    "block is too small: {templates} template(s), at least 2 required"
                )
            }
            Self::LengthMismatch {
                expected,
                found,
                origin,
            } => {
                write!(
                    f,
                    "not all templates have the same number of expansions: \
                     template #{origin} has {found}, expected {expected}"
                )
            }
            Self::Unclosed => {
                write!(f, "block is never closed")
            }
        }
    }
}

/// Error produced while pairing a block.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} in block '{name}'")]
pub struct BlockError {
    pub kind: BlockErrorKind,
    pub name: String,
}

/// Attributes carried by a block-open marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockHeader {
    pub name: String,
    /// Invert the 2nd, 4th, ... template line of the block.
    pub invert_odd: bool,
}

impl Default for BlockHeader {
    fn default() -> Self {
        Self {
            name: DEFAULT_BLOCK_NAME.to_string(),
            invert_odd: false,
        }
    }
}

impl BlockHeader {
    /// Parse a `<block ...>` line, or return `None` if the line
    /// is not a block-open marker.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if !trimmed.to_lowercase().starts_with("<block") {
            return None;
        }

        let name = BLOCK_ID
            .captures(trimmed)
            .and_then(|caps| caps.get(1).or_else(|| caps.get(2)))
            .map_or_else(|| DEFAULT_BLOCK_NAME.to_string(), |m| m.as_str().to_string());

        Some(Self {
            name,
            invert_odd: trimmed.to_lowercase().contains("invert-odd"),
        })
    }

    /// Whether the `position`-th (1-based) template line is inverted.
    #[must_use]
    pub const fn inverts(&self, position: usize) -> bool {
        self.invert_odd && position % 2 == 0
    }
}

/// Whether a line is a block-close marker.
#[must_use]
pub fn is_block_close(line: &str) -> bool {
    line.trim().to_lowercase().starts_with("</block>")
}

/// One template's contribution to a block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockMember {
    pub origin: usize,
    pub expansions: Vec<Expansion>,
}

/// An expansion placed in its minimal-pair slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairedExpansion<'a> {
    pub block: &'a str,
    pub pair: usize,
    pub origin: usize,
    pub expansion: Expansion,
}

/// Interleave the expansions of a block so that the `i`-th
/// expansion of every template appears consecutively.
///
/// Output order is `(t0, 0), (t1, 0), ..., (t0, 1), (t1, 1), ...`,
/// each tagged with its pair index and the originating template.
///
/// # Errors
///
/// Returns `BlockError` when the block has fewer than two members
/// or when members expand to different counts.
pub fn pair_block<'a>(
    name: &'a str,
    members: Vec<BlockMember>,
) -> Result<Vec<PairedExpansion<'a>>, BlockError> {
    let error = |kind: BlockErrorKind| BlockError {
        kind,
        name: name.to_string(),
    };

    if members.len() < 2 {
        return Err(error(BlockErrorKind::TooSmall {
            templates: members.len(),
        }));
    }

    let expected = members[0].expansions.len();
    if let Some(odd) = members.iter().find(|m| m.expansions.len() != expected) {
        return Err(error(BlockErrorKind::LengthMismatch {
            expected,
            found: odd.expansions.len(),
            origin: odd.origin,
        }));
    }

    let width = members.len();
    let mut columns: Vec<(usize, std::vec::IntoIter<Expansion>)> = members
        .into_iter()
        .map(|m| (m.origin, m.expansions.into_iter()))
        .collect();

    let mut paired = Vec::with_capacity(width * expected);
    for pair in 0..expected {
        for (origin, expansions) in &mut columns {
            if let Some(expansion) = expansions.next() {
                paired.push(PairedExpansion {
                    block: name,
                    pair,
                    origin: *origin,
                    expansion,
                });
            }
        }
    }

    Ok(paired)
}
