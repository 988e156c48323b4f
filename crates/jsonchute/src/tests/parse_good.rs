use alloc::string::ToString;

use rstest::rstest;

use crate::{Value, parse_document_str, parse_value_str};

#[rstest]
#[case("null", "null")]
#[case("true", "true")]
#[case("  false  ", "false")]
#[case("42", "42")]
#[case("-0", "-0")]
#[case("-12.5e3", "-12.5e3")]
#[case("0.001", "0.001")]
#[case("1E+10", "1E+10")]
#[case("\"\"", "\"\"")]
#[case("\"héllo\"", "\"héllo\"")]
#[case("[]", "[]")]
#[case("[ ]", "[]")]
#[case("[ 1 , 2 , 3 ]", "[1,2,3]")]
#[case("{}", "{}")]
#[case("{ \"b\" : 2 , \"a\" : 1 }", "{\"a\":1,\"b\":2}")]
#[case("[[[]],{}]", "[[[]],{}]")]
#[case(
    "{\"arr\":[null,true,\"x\"],\"obj\":{\"n\":-1}}",
    "{\"arr\":[null,true,\"x\"],\"obj\":{\"n\":-1}}"
)]
#[case("\r\n\t [1]\r\n", "[1]")]
fn well_formed_documents(#[case] input: &str, #[case] compact: &str) {
    let value = parse_document_str(input).unwrap();
    assert_eq!(value.to_string(), compact);
}

#[rstest]
#[case(r#""a\"b""#, "a\"b")]
#[case(r#""a\\b""#, "a\\b")]
#[case(r#""a\/b""#, "a/b")]
#[case(r#""\b\f\n\r\t""#, "\u{8}\u{c}\n\r\t")]
#[case(r#""a\u0020c""#, "a c")]
#[case(r#""A""#, "A")]
#[case(r#""é""#, "é")]
#[case(r#""😀""#, "\u{1F600}")]
#[case(r#""mix A\nend""#, "mix A\nend")]
fn string_escapes_decode(#[case] input: &str, #[case] expected: &str) {
    let value = parse_document_str(input).unwrap();
    assert_eq!(value.as_str(), Some(expected));
}

#[test]
fn numbers_keep_their_lexemes() {
    let value = parse_document_str("[42, -7, 1.5, 2e10, -0.25E-3]").unwrap();
    let items = value.as_array().unwrap();
    let lexemes: alloc::vec::Vec<&str> = items
        .iter()
        .map(|v| v.as_number().unwrap().as_str())
        .collect();
    assert_eq!(lexemes, ["42", "-7", "1.5", "2e10", "-0.25E-3"]);
    assert!(items[0].as_number().unwrap().is_integral());
    assert!(items[1].as_number().unwrap().is_integral());
    assert!(!items[2].as_number().unwrap().is_integral());
    assert!(!items[3].as_number().unwrap().is_integral());
    assert_eq!(items[0].as_number().unwrap().to_i64(), Some(42));
    assert_eq!(items[2].as_number().unwrap().to_f64(), Some(1.5));
    assert_eq!(items[3].as_number().unwrap().to_i64(), None);
}

#[test]
fn huge_number_lexeme_is_preserved_exactly() {
    let digits = "123456789012345678901234567890123456789012345678901234567890";
    let value = parse_document_str(digits).unwrap();
    assert_eq!(value.as_number().unwrap().as_str(), digits);
    assert_eq!(value.as_number().unwrap().to_i64(), None);
    assert_eq!(value.to_string(), digits);
}

#[test]
fn value_mode_stops_after_the_value() {
    let value = parse_value_str("123 trailing garbage").unwrap();
    assert_eq!(value, Value::from(123));

    let value = parse_value_str("[1,2]xyz").unwrap();
    assert_eq!(value.to_string(), "[1,2]");
}

#[test]
fn document_mode_allows_trailing_whitespace_only() {
    assert!(parse_document_str("1 \t\r\n ").is_ok());
    assert!(parse_document_str("1 x").is_err());
}

#[test]
fn accessors_see_through_the_tree() {
    let value = parse_document_str(r#"{"flag": true, "name": "it"}"#).unwrap();
    let map = value.as_object().unwrap();
    assert_eq!(map["flag"].as_bool(), Some(true));
    assert_eq!(map["name"].as_str(), Some("it"));
    assert!(!value.is_null());
}
