//! Output file handling around the engine.
//!
//! Reads the header of the output file, decides what to do with a
//! file that already holds records, and numbers the records once
//! the run is over. Questions about reusing a file go through an
//! injected confirmation callback; nothing here reads the terminal.

use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::Error;
use crate::config::Config;
use crate::engine::{self, Summary};
use crate::record::Header;

/// A decision the caller must make about an output file in use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Question<'a> {
    /// Keep the existing records and append after them?
    Append {
        path: &'a Path,
        second_line: &'a str,
    },
    /// Truncate the file back to its header line?
    Reset { path: &'a Path, header: &'a str },
}

/// Where records go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    File { path: PathBuf, header: Header },
    Stdout { header: Header },
}

/// Resolve the output destination.
///
/// With no path, or a path that is not an existing file, records go
/// to stdout under an anonymous header. An existing file's first
/// line is its header; when its second line is not blank, `confirm`
/// is asked whether to append and, failing that, whether to reset
/// the file to its header.
///
/// # Errors
///
/// `Error::Header` for an unusable header line, `Error::Aborted`
/// when both questions are refused, `Error::Io` on read/write
/// failures.
pub fn prepare<F>(
    path: Option<&Path>,
    separator: char,
    mut confirm: F,
) -> Result<Destination, Error>
where
    F: FnMut(&Question<'_>) -> bool,
{
    let Some(path) = path.filter(|p| p.is_file()) else {
        if let Some(missing) = path {
            tracing::warn!(path = %missing.display(), "output file not found, writing to stdout");
        } else {
            tracing::warn!("no output file given, writing to stdout");
        }
        return Ok(Destination::Stdout {
            header: Header::anonymous(separator),
        });
    };

    let mut lines = BufReader::new(File::open(path)?).lines();
    let first = lines.next().transpose()?.unwrap_or_default();
    let second = lines.next().transpose()?.unwrap_or_default();
    let header = Header::parse(&first, separator)?;
    tracing::info!(header = %first.trim(), "read feature line");

    if !second.trim().is_empty() {
        let append = confirm(&Question::Append {
            path,
            second_line: second.trim(),
        });
        if append {
            tracing::info!(path = %path.display(), "appending to output file in use");
        } else if confirm(&Question::Reset {
            path,
            header: first.trim(),
        }) {
            fs::write(path, format!("{first}\n"))?;
            tracing::info!(path = %path.display(), "output file reset to its header");
        } else {
            return Err(Error::Aborted(path.to_path_buf()));
        }
    }

    Ok(Destination::File {
        path: path.to_path_buf(),
        header,
    })
}

/// Write every record of `input` with its sequence number, starting
/// at `first`, in column 0. Whatever column 0 held before is
/// replaced, so numbering a file twice is harmless. Returns the
/// number of records written.
pub fn number_records<R: BufRead, W: Write>(
    input: R,
    mut out: W,
    separator: char,
    first: usize,
) -> io::Result<usize> {
    let mut count = 0;
    for line in input.lines() {
        let line = line?;
        let rest = line.find(separator).map_or(line.as_str(), |i| &line[i..]);
        writeln!(out, "{}{rest}", first + count)?;
        count += 1;
    }
    out.flush()?;
    Ok(count)
}

/// Writer that puts a sequence number in front of every line written
/// through it, for records whose column 0 is still empty.
#[derive(Debug)]
pub struct NumberedWriter<W> {
    out: W,
    next: usize,
    line_start: bool,
}

impl<W: Write> NumberedWriter<W> {
    pub const fn new(out: W, first: usize) -> Self {
        Self {
            out,
            next: first,
            line_start: true,
        }
    }
}

impl<W: Write> Write for NumberedWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        for chunk in buf.split_inclusive(|b| *b == b'\n') {
            if self.line_start {
                write!(self.out, "{}", self.next)?;
                self.next += 1;
            }
            self.out.write_all(chunk)?;
            self.line_start = chunk.ends_with(b"\n");
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.out.flush()
    }
}

/// Rewrite `path` with every record after the header numbered from 1.
pub fn renumber(path: &Path, separator: char) -> io::Result<usize> {
    let content = fs::read_to_string(path)?;
    let (header, records) = content.split_once('\n').unwrap_or((content.as_str(), ""));

    let mut out = BufWriter::new(File::create(path)?);
    writeln!(out, "{header}")?;
    number_records(records.as_bytes(), out, separator, 1)
}

/// Expand `input` into `output` (or `stdout` when there is no usable
/// output file), then number the records.
///
/// # Errors
///
/// `Error::InputNotFound` when `input` is not a file; otherwise any
/// error from [`prepare`] or the engine.
pub fn process<F, S>(
    input: &Path,
    output: Option<&Path>,
    config: &Config,
    confirm: F,
    stdout: S,
) -> Result<Summary, Error>
where
    F: FnMut(&Question<'_>) -> bool,
    S: Write,
{
    if !input.is_file() {
        return Err(Error::InputNotFound(input.to_path_buf()));
    }

    let destination = prepare(output, config.separator, confirm)?;
    let reader = BufReader::new(File::open(input)?);

    match destination {
        Destination::File { path, header } => {
            let terminated = fs::read(&path)?.last().is_none_or(|b| *b == b'\n');
            let mut file = OpenOptions::new().append(true).open(&path)?;
            if !terminated {
                writeln!(file)?;
            }
            let summary = engine::run(reader, BufWriter::new(file), header, config.filter.clone())?;
            let total = renumber(&path, config.separator)?;
            tracing::info!(path = %path.display(), total, "numbered output records");
            Ok(summary)
        }
        Destination::Stdout { header } => {
            let numbered = NumberedWriter::new(stdout, 1);
            engine::run(reader, numbered, header, config.filter.clone())
        }
    }
}
