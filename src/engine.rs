//! Line-driven expansion engine.
//!
//! [`Engine`] is a two-state machine (outside a block, inside a
//! block) fed one input line at a time. Lines outside blocks are
//! written as soon as they are expanded; lines inside a block are
//! buffered until the close marker, then paired and written.

use std::io::{BufRead, Write};

use crate::Error;
use crate::block::{
    BlockError, BlockErrorKind, BlockHeader, BlockMember, is_block_close, pair_block,
};
use crate::expand::{Expansion, expand};
use crate::invert::{invert_template, restore_order};
use crate::record::{Filter, Header, Pairing, RecordWriter};
use crate::template::{ParseError, ParseErrorKind, parse_template};

/// What an input line means to the engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line<'a> {
    /// Blank or `#` comment.
    Skip,
    BlockOpen(BlockHeader),
    BlockClose,
    Template(&'a str),
}

impl<'a> Line<'a> {
    #[must_use]
    pub fn classify(line: &'a str) -> Self {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            Self::Skip
        } else if let Some(header) = BlockHeader::parse(trimmed) {
            Self::BlockOpen(header)
        } else if is_block_close(trimmed) {
            Self::BlockClose
        } else {
            Self::Template(trimmed)
        }
    }
}

/// Expand one template line, inverting the combination order when
/// `inverted` is set.
///
/// # Errors
///
/// Returns `ParseError` (reported at line 1) on malformed brackets,
/// whether or not the line is inverted.
pub fn expand_line(text: &str, inverted: bool) -> Result<Vec<Expansion>, ParseError> {
    let template = parse_template(text)?;
    if inverted {
        let expansions = expand(&invert_template(template));
        Ok(expansions.into_iter().map(restore_order).collect())
    } else {
        Ok(expand(&template))
    }
}

/// Counters reported at the end of a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Summary {
    pub templates: usize,
    pub blocks: usize,
    pub written: usize,
    pub suppressed: usize,
}

#[derive(Debug)]
struct PendingBlock {
    header: BlockHeader,
    members: Vec<BlockMember>,
}

#[derive(Debug)]
enum State {
    Outside,
    InsideBlock(PendingBlock),
}

/// Streams records for template lines to a writer.
#[derive(Debug)]
pub struct Engine<W> {
    writer: RecordWriter<W>,
    state: State,
    line: usize,
    origin: usize,
    blocks: usize,
}

impl<W: Write> Engine<W> {
    pub const fn new(out: W, header: Header, filter: Filter) -> Self {
        Self {
            writer: RecordWriter::new(out, header, filter),
            state: State::Outside,
            line: 0,
            origin: 0,
            blocks: 0,
        }
    }

    /// Process the next input line.
    pub fn feed(&mut self, line: &str) -> Result<(), Error> {
        self.line += 1;
        match Line::classify(line) {
            Line::Skip => Ok(()),
            Line::BlockOpen(header) => self.open_block(header),
            Line::BlockClose => self.close_block(),
            Line::Template(text) => self.template(text),
        }
    }

    fn open_block(&mut self, header: BlockHeader) -> Result<(), Error> {
        if matches!(self.state, State::InsideBlock(_)) {
            return Err(ParseError::new(ParseErrorKind::NestedBlock, self.line).into());
        }
        tracing::debug!(
            line = self.line,
            name = %header.name,
            invert_odd = header.invert_odd,
            "block opened"
        );
        self.state = State::InsideBlock(PendingBlock {
            header,
            members: Vec::new(),
        });
        Ok(())
    }

    fn close_block(&mut self) -> Result<(), Error> {
        let State::InsideBlock(block) = std::mem::replace(&mut self.state, State::Outside) else {
            return Err(ParseError::new(ParseErrorKind::UnmatchedBlockClose, self.line).into());
        };

        let paired = pair_block(&block.header.name, block.members)?;
        tracing::debug!(
            line = self.line,
            name = %block.header.name,
            records = paired.len(),
            "block paired"
        );
        for entry in &paired {
            let pairing = Pairing {
                block: entry.block,
                pair: entry.pair,
            };
            self.writer.write(&entry.expansion, Some(pairing), entry.origin)?;
        }
        self.blocks += 1;
        Ok(())
    }

    fn template(&mut self, text: &str) -> Result<(), Error> {
        self.origin += 1;
        let origin = self.origin;
        let line = self.line;

        match &mut self.state {
            State::Outside => {
                let expansions = expand_line(text, false).map_err(|e| e.at_line(line))?;
                tracing::info!(line, origin, count = expansions.len(), "expanded template");
                for expansion in &expansions {
                    self.writer.write(expansion, None, origin)?;
                }
            }
            State::InsideBlock(block) => {
                let inverted = block.header.inverts(block.members.len() + 1);
                let expansions = expand_line(text, inverted).map_err(|e| e.at_line(line))?;
                tracing::info!(
                    line,
                    origin,
                    inverted,
                    count = expansions.len(),
                    "expanded block template"
                );
                block.members.push(BlockMember { origin, expansions });
            }
        }
        Ok(())
    }

    /// Finish the run, returning the counters and the writer.
    pub fn finish(mut self) -> Result<(Summary, W), Error> {
        if let State::InsideBlock(block) = self.state {
            return Err(BlockError {
                kind: BlockErrorKind::Unclosed,
                name: block.header.name,
            }
            .into());
        }
        self.writer.flush()?;

        let summary = Summary {
            templates: self.origin,
            blocks: self.blocks,
            written: self.writer.written(),
            suppressed: self.writer.suppressed(),
        };
        Ok((summary, self.writer.into_inner()))
    }
}

/// Expand every line of `input`, appending records to `out`.
///
/// Stops at the first error; records already written stay written.
pub fn run<R: BufRead, W: Write>(
    input: R,
    out: W,
    header: Header,
    filter: Filter,
) -> Result<Summary, Error> {
    let mut engine = Engine::new(out, header, filter);
    for line in input.lines() {
        engine.feed(&line?)?;
    }
    let (summary, _) = engine.finish()?;
    Ok(summary)
}
