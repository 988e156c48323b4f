use alloc::string::ToString;

use quickcheck_macros::quickcheck;

use crate::{Value, parse_document_str, write_value};

/// Property: the compact rendering of any value parses back to that value.
#[quickcheck]
#[allow(clippy::needless_pass_by_value)]
fn display_then_parse_is_identity(value: Value) -> bool {
    parse_document_str(&value.to_string()) == Ok(value)
}

/// Property: the writer's output is accepted by an independent JSON parser.
#[quickcheck]
#[allow(clippy::needless_pass_by_value)]
fn output_is_valid_json_elsewhere(value: Value) -> bool {
    serde_json::from_str::<serde_json::Value>(&value.to_string()).is_ok()
}

#[test]
fn agrees_with_serde_json_on_strings_and_structure() {
    let input = r#"{"s": "aA\n\"\\ 😀", "arr": [null, true, "x"]}"#;
    let ours = parse_document_str(input).unwrap();
    let theirs: serde_json::Value = serde_json::from_str(input).unwrap();

    assert_eq!(
        ours.as_object().unwrap()["s"].as_str(),
        theirs["s"].as_str()
    );
    assert_eq!(
        ours.as_object().unwrap()["arr"].as_array().unwrap().len(),
        theirs["arr"].as_array().unwrap().len()
    );
}

#[test]
fn value_serde_roundtrip() {
    let value = parse_document_str(r#"{"n": [1, 2.5], "t": true}"#).unwrap();
    let encoded = serde_json::to_string(&value).unwrap();
    let decoded: Value = serde_json::from_str(&encoded).unwrap();
    assert_eq!(decoded, value);
}

#[test]
fn escaping_survives_a_full_cycle() {
    let original = Value::from("quote \" backslash \\ newline \n sep \u{2028} ctrl \u{1} plain é");
    let mut rendered = alloc::string::String::new();
    write_value(&original, &mut rendered).unwrap();
    assert_eq!(parse_document_str(&rendered).unwrap(), original);
}
