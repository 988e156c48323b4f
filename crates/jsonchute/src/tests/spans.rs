use alloc::string::ToString;

use crate::{
    Location, Span, SpannedNode, TreeError, Value, parse_document_str, parse_spanned_str,
};

fn loc(offset: usize, line: usize, column: usize) -> Location {
    Location {
        offset,
        line,
        column,
    }
}

#[test]
fn array_and_elements_carry_their_spans() {
    let parsed = parse_spanned_str("[true,\n false\n]").unwrap();
    assert_eq!(
        parsed.span,
        Span {
            start: loc(0, 1, 1),
            end: loc(15, 3, 2),
        }
    );

    let SpannedNode::Array(items) = &parsed.node else {
        panic!("expected an array");
    };
    assert_eq!(items.len(), 2);

    assert_eq!(items[0].node, SpannedNode::Bool(true));
    assert_eq!(
        items[0].span,
        Span {
            start: loc(1, 1, 2),
            end: loc(5, 1, 6),
        }
    );

    assert_eq!(items[1].node, SpannedNode::Bool(false));
    assert_eq!(
        items[1].span,
        Span {
            start: loc(8, 2, 2),
            end: loc(13, 2, 7),
        }
    );
}

#[test]
fn scalar_spans_cover_the_lexeme() {
    // 0123456789
    let parsed = parse_spanned_str(r#"{"k": 12.5}"#).unwrap();
    assert_eq!(parsed.span.start, loc(0, 1, 1));
    assert_eq!(parsed.span.end, loc(11, 1, 12));

    let SpannedNode::Object(map) = &parsed.node else {
        panic!("expected an object");
    };
    let number = &map["k"];
    assert_eq!(number.span.start, loc(6, 1, 7));
    assert_eq!(number.span.end, loc(10, 1, 11));
}

#[test]
fn string_spans_include_both_quotes() {
    let parsed = parse_spanned_str(r#"["ab"]"#).unwrap();
    let SpannedNode::Array(items) = &parsed.node else {
        panic!("expected an array");
    };
    assert_eq!(items[0].span.start, loc(1, 1, 2));
    assert_eq!(items[0].span.end, loc(5, 1, 6));
    assert_eq!(items[0].node, SpannedNode::String("ab".into()));
}

#[test]
fn strip_matches_the_plain_tree() {
    let input = r#"{"a": [1, null, "x"], "b": {"c": true}}"#;
    let spanned = parse_spanned_str(input).unwrap();
    let plain = parse_document_str(input).unwrap();
    assert_eq!(spanned.strip(), plain);
}

#[test]
fn duplicate_keys_report_the_previous_stripped_value() {
    let err = parse_spanned_str(r#"{"k": [1], "k": 2}"#).unwrap_err();
    match err.source {
        TreeError::DuplicateKey { key, previous } => {
            assert_eq!(key, "k");
            assert_eq!(previous, parse_document_str("[1]").unwrap());
            assert_eq!(previous.to_string(), "[1]");
        }
        other => panic!("expected a duplicate key error, got {other:?}"),
    }
}

#[test]
fn spans_are_chunk_independent() {
    use crate::{Engine, EngineOptions, SpanFactory, StrSource, run_engine};

    let input = "[true,\n false\n]";
    let mut engine = Engine::new(SpanFactory, EngineOptions::default());
    let mut source = StrSource::with_chunk_size(input, 1);
    let chunked = run_engine(&mut engine, &mut source).unwrap();
    assert_eq!(chunked, parse_spanned_str(input).unwrap());
}

#[test]
fn stripped_numbers_keep_their_lexemes() {
    let spanned = parse_spanned_str("[1e3]").unwrap();
    let plain = spanned.strip();
    let items = plain.as_array().unwrap();
    assert_eq!(items[0].as_number().unwrap().as_str(), "1e3");
    assert!(!items[0].as_number().unwrap().is_integral());
}
