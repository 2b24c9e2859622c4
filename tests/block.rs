//! Block pairing and block structure through the engine.

mod common;

use common::{HEADER, fields, records};
use sentence_multiplier::{
    BlockError, BlockErrorKind, BlockHeader, BlockMember, Error, Filter, Header, ParseErrorKind,
    expand_str, pair_block, run,
};

fn member(origin: usize, template: &str) -> BlockMember {
    BlockMember {
        origin,
        expansions: expand_str(template).expect("expand"),
    }
}

fn run_err(input: &str) -> Error {
    let header = Header::parse(HEADER, '|').expect("header");
    run(input.as_bytes(), Vec::new(), header, Filter::default()).unwrap_err()
}

// -----------------------------------------------------------
// Pairing.
// -----------------------------------------------------------

#[test]
fn pair_three_templates() {
    let paired = pair_block(
        "b",
        vec![
            member(1, "x [ 1 2 ]"),
            member(2, "y [ 1 2 ]"),
            member(3, "z [ 1 2 ]"),
        ],
    )
    .expect("pair");
    assert_eq!(paired.len(), 6);

    let pairs: Vec<usize> = paired.iter().map(|p| p.pair).collect();
    let origins: Vec<usize> = paired.iter().map(|p| p.origin).collect();
    assert_eq!(pairs, [0, 0, 0, 1, 1, 1]);
    assert_eq!(origins, [1, 2, 3, 1, 2, 3]);
}

#[test]
fn pair_indices_are_contiguous() {
    let paired = pair_block(
        "b",
        vec![member(1, "a [ p q r s ]"), member(2, "b [ p q r s ]")],
    )
    .expect("pair");
    for chunk in paired.chunks(2) {
        assert_eq!(chunk[0].pair, chunk[1].pair);
    }
}

#[test]
fn pair_literal_only_templates() {
    let paired = pair_block("b", vec![member(1, "one"), member(2, "two")]).expect("pair");
    assert_eq!(paired.len(), 2);
    assert!(paired.iter().all(|p| p.pair == 0));
}

#[test]
fn pair_differing_shapes_same_count() {
    // 2 x 2 and 4: same count, different group profile.
    let paired = pair_block(
        "b",
        vec![member(1, "[ a b ] [ c d ]"), member(2, "[ 1 2 3 4 ]")],
    )
    .expect("pair");
    assert_eq!(paired.len(), 8);
}

#[test]
fn pair_error_empty_block() {
    let err = pair_block("empty", Vec::new()).unwrap_err();
    assert_eq!(err.kind, BlockErrorKind::TooSmall { templates: 0 });
}

#[test]
fn pair_error_display() {
    let err = pair_block("b", vec![member(1, "a [ x y ]"), member(2, "b [ x ]")]).unwrap_err();
    assert_eq!(
        err.to_string(),
        "not all templates have the same number of expansions: \
         template #2 has 1, expected 2 in block 'b'"
    );
}

// -----------------------------------------------------------
// Block markers through the engine.
// -----------------------------------------------------------

#[test]
fn block_name_from_id() {
    let out = records("<block id='tense'>\na [ x y ]\nb [ x y ]\n</block>\n", HEADER, "");
    assert!(out.iter().all(|r| fields(r)[1] == "tense"));
}

#[test]
fn block_skips_comments_inside() {
    let out = records("<block>\n# note\na\n\nb\n</block>\n", HEADER, "");
    assert_eq!(out, ["|default-block|0|a|1|", "|default-block|0|b|2|"]);
}

#[test]
fn block_invert_odd_flips_even_lines() {
    let input = "<block invert-odd>\n\
                 A [ x y ] [ 1 2 ]\n\
                 B [ x y ] [ 1 2 ]\n\
                 C [ x y ] [ 1 2 ]\n\
                 </block>\n";
    let out = records(input, HEADER, "");
    let sentences: Vec<&str> = out.iter().map(|r| fields(r)[3]).collect();
    assert_eq!(
        sentences,
        [
            "A x 1", "B x 1", "C x 1", //
            "A x 2", "B y 1", "C x 2", //
            "A y 1", "B x 2", "C y 1", //
            "A y 2", "B y 2", "C y 2",
        ]
    );
}

#[test]
fn block_header_parse_case_insensitive() {
    let h = BlockHeader::parse("<Block Id='MixedCase' INVERT-ODD>").expect("header");
    assert_eq!(h.name, "MixedCase");
    assert!(h.invert_odd);
}

#[test]
fn block_error_too_small() {
    let err = run_err("<block id='solo'>\nonly [ a b ]\n</block>\n");
    assert!(matches!(
        err,
        Error::Block(e) if e.kind == BlockErrorKind::TooSmall { templates: 1 } && e.name == "solo"
    ));
}

#[test]
fn block_error_length_mismatch() {
    let err = run_err("<block>\na [ x y ]\nb [ x y z ]\n</block>\n");
    assert!(matches!(
        err,
        Error::Block(BlockError {
            kind: BlockErrorKind::LengthMismatch {
                expected: 2,
                found: 3,
                origin: 2
            },
            ..
        })
    ));
}

#[test]
fn block_error_nested() {
    let err = run_err("<block>\na\n<block>\nb\n</block>\n");
    assert!(matches!(err, Error::Parse(e) if e.kind == ParseErrorKind::NestedBlock && e.line == 3));
}

#[test]
fn block_error_unmatched_close() {
    let err = run_err("a\n</block>\n");
    assert!(matches!(err, Error::Parse(e) if e.kind == ParseErrorKind::UnmatchedBlockClose));
}

#[test]
fn block_error_unclosed() {
    let err = run_err("<block>\na\nb\n");
    assert!(matches!(err, Error::Block(e) if e.kind == BlockErrorKind::Unclosed));
}
