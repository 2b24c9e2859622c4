//! CLI that expands a file of sentence templates into a delimited
//! feature file.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use sentence_multiplier::{Config, Question, process};
use tracing_subscriber::EnvFilter;

/// Expand sentence templates such as `A [ B1 B2 ] [ C1 C2 ]` into
/// every combination and append them, with feature positions, to a
/// delimited output file.
///
/// The output file's first line lists its columns; columns after the
/// fifth name words whose first position is recorded. Lines between
/// `<block id='name'>` and `</block>` are kept as adjacent minimal
/// pairs. Words like `@@3@@` are gap markers: removed from the text
/// and not counted.
#[derive(Parser, Debug)]
#[command(name = "multiply", version)]
struct Args {
    /// Input file with one template per line
    input: PathBuf,

    /// Output file holding the feature line (records are appended);
    /// stdout when missing
    #[arg(long, short = 'o')]
    output: Option<PathBuf>,

    /// Drop records that contain all of these space-separated words
    #[arg(long, short = 'f')]
    filter: Option<String>,

    /// Column separator of the output file
    #[arg(long, short = 's', default_value_t = '|')]
    separator: char,

    /// Append to an output file that already holds records without asking
    #[arg(long, conflicts_with = "reset")]
    append: bool,

    /// Reset an output file that already holds records to its feature line
    /// without asking
    #[arg(long)]
    reset: bool,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(long, short = 'v', action = clap::ArgAction::Count)]
    verbose: u8,
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

/// Interpret a typed answer. Only an explicit answer against
/// `default` changes the outcome.
fn answer(input: &str, default: bool) -> bool {
    let input = input.trim().to_lowercase();
    if default {
        !matches!(input.as_str(), "n" | "no")
    } else {
        matches!(input.as_str(), "y" | "yes")
    }
}

fn ask(prompt: &str, default: bool) -> bool {
    eprint!("{prompt} ");
    let _ = io::stderr().flush();

    let mut input = String::new();
    if io::stdin().lock().read_line(&mut input).is_err() {
        return false;
    }
    answer(&input, default)
}

/// Answer a reuse question from the flags, prompting with `ask`
/// when neither `--append` nor `--reset` was given.
fn confirm<A>(args: &Args, question: &Question<'_>, mut ask: A) -> bool
where
    A: FnMut(&str, bool) -> bool,
{
    match question {
        Question::Append { path, second_line } => {
            args.append
                || (!args.reset
                    && ask(
                        &format!(
                            "Warning: the output file {} contains more than 1 line \
                             (2nd line = {second_line}).\n\
                             Are you sure you want to continue appending the output to it? [y/N]",
                            path.display()
                        ),
                        false,
                    ))
        }
        Question::Reset { header, .. } => {
            args.reset
                || (!args.append
                    && ask(
                        &format!("Do you want to reset the output file to\n{header} [Y/n]?"),
                        true,
                    ))
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = Config::new()
        .separator(args.separator)
        .filter(args.filter.as_deref().unwrap_or_default());

    let result = process(
        &args.input,
        args.output.as_deref(),
        &config,
        |question| confirm(&args, question, ask),
        io::stdout().lock(),
    );

    match result {
        Ok(summary) => {
            tracing::info!(
                templates = summary.templates,
                blocks = summary.blocks,
                suppressed = summary.suppressed,
                "done"
            );
            eprintln!("Written {} lines", summary.written);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;

    use super::*;

    fn append() -> Question<'static> {
        Question::Append {
            path: Path::new("out.csv"),
            second_line: "1|-----|-----|old|1|",
        }
    }

    fn reset() -> Question<'static> {
        Question::Reset {
            path: Path::new("out.csv"),
            header: "ID|BLOCK|NUM|SENTENCE|ORIG#|",
        }
    }

    fn args(flags: &[&str]) -> Args {
        let mut argv = vec!["multiply", "in.txt"];
        argv.extend_from_slice(flags);
        Args::try_parse_from(argv).unwrap()
    }

    fn no_prompt(_: &str, _: bool) -> bool {
        panic!("no prompt expected")
    }

    #[test]
    fn append_flag_answers_append() {
        assert!(confirm(&args(&["--append"]), &append(), no_prompt));
        assert!(!confirm(&args(&["--append"]), &reset(), no_prompt));
    }

    #[test]
    fn reset_flag_refuses_append_and_resets() {
        assert!(!confirm(&args(&["--reset"]), &append(), no_prompt));
        assert!(confirm(&args(&["--reset"]), &reset(), no_prompt));
    }

    #[test]
    fn append_and_reset_conflict() {
        let argv = ["multiply", "in.txt", "--append", "--reset"];
        assert!(Args::try_parse_from(argv).is_err());
    }

    #[test]
    fn without_flags_the_prompt_decides() {
        let mut defaults = Vec::new();
        let mut record = |_: &str, default: bool| {
            defaults.push(default);
            default
        };
        assert!(!confirm(&args(&[]), &append(), &mut record));
        assert!(confirm(&args(&[]), &reset(), &mut record));
        assert_eq!(defaults, [false, true]);
    }

    #[test]
    fn empty_answer_takes_default() {
        assert!(!answer("\n", false));
        assert!(answer("\n", true));
    }

    #[test]
    fn explicit_answers() {
        assert!(answer("y\n", false));
        assert!(answer(" YES ", false));
        assert!(!answer("maybe", false));
        assert!(!answer("n", true));
        assert!(!answer("No\n", true));
        assert!(answer("sure", true));
    }
}
