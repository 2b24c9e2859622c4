#![allow(dead_code)]

use sentence_multiplier::{Expansion, Filter, Header, expand_str, run};

pub const HEADER: &str = "ID|BLOCK|NUM|SENTENCE|ORIG#|";

/// Expand a template and render each expansion as a sentence.
pub fn sentences(input: &str) -> Vec<String> {
    expand_str(input)
        .expect("expand failed")
        .iter()
        .map(ToString::to_string)
        .collect()
}

pub fn render(expansions: &[Expansion]) -> Vec<String> {
    expansions.iter().map(ToString::to_string).collect()
}

/// Run the engine over `input` and return the written records.
pub fn records(input: &str, header: &str, filter: &str) -> Vec<String> {
    let header = Header::parse(header, '|').expect("header parse failed");
    let mut out = Vec::new();
    run(input.as_bytes(), &mut out, header, Filter::parse(filter)).unwrap_or_else(|e| {
        panic!("run failed: {e}\n--- input ---\n{input}");
    });
    String::from_utf8(out)
        .expect("utf8")
        .lines()
        .map(ToString::to_string)
        .collect()
}

/// Split a record into its fields, dropping the trailing empty one.
pub fn fields(record: &str) -> Vec<&str> {
    let mut parts: Vec<&str> = record.split('|').collect();
    assert_eq!(parts.pop(), Some(""), "record lacks trailing separator: {record}");
    parts
}
