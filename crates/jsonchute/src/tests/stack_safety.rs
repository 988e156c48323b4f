use alloc::string::String;

use crate::{
    Engine, EngineOptions, Pending, Resumed, Validator, parse_document_str, parse_op,
    parse_spanned_str, run_to_completion,
};

#[test]
fn arrays_nested_one_hundred_thousand_deep() {
    let depth = 100_000;
    let mut src = String::with_capacity(depth * 2);
    for _ in 0..depth {
        src.push('[');
    }
    for _ in 0..depth {
        src.push(']');
    }
    assert!(crate::validate_str(&src).is_empty());
}

#[test]
fn objects_nested_ten_thousand_deep() {
    let depth = 10_000;
    let mut src = String::new();
    for _ in 0..depth {
        src.push_str("{\"k\":");
    }
    src.push('1');
    for _ in 0..depth {
        src.push('}');
    }
    assert!(crate::validate_str(&src).is_empty());
}

/// Builds the full tree at the depth the validator tests above only check,
/// then walks it and lets it fall out of scope. Both construction and drop
/// must run without growing the call stack.
#[test]
fn deeply_nested_tree_builds_and_drops() {
    let depth = 100_000;
    let mut src = String::with_capacity(depth * 2 + 1);
    for _ in 0..depth {
        src.push('[');
    }
    src.push('1');
    for _ in 0..depth {
        src.push(']');
    }

    let value = parse_document_str(&src).unwrap();
    let mut seen = 0usize;
    let mut cursor = &value;
    while let Some(items) = cursor.as_array() {
        seen += 1;
        cursor = &items[0];
    }
    assert_eq!(seen, depth);
    assert_eq!(cursor.as_number().unwrap().to_i64(), Some(1));
    drop(value);
}

#[test]
fn deeply_nested_spanned_tree_strips_and_drops() {
    let depth = 100_000;
    let mut src = String::with_capacity(depth * 2 + 1);
    for _ in 0..depth {
        src.push('[');
    }
    src.push('1');
    for _ in 0..depth {
        src.push(']');
    }

    let spanned = parse_spanned_str(&src).unwrap();
    let plain = spanned.strip();
    let mut seen = 0usize;
    let mut cursor = &plain;
    while let Some(items) = cursor.as_array() {
        seen += 1;
        cursor = &items[0];
    }
    assert_eq!(seen, depth);
    drop(spanned);
    drop(plain);
}

#[test]
fn one_million_element_array() {
    let count = 1_000_000;
    let mut src = String::with_capacity(count * 2 + 2);
    src.push('[');
    for i in 0..count {
        if i > 0 {
            src.push(',');
        }
        src.push('7');
    }
    src.push(']');

    let value = parse_document_str(&src).unwrap();
    let items = value.as_array().unwrap();
    assert_eq!(items.len(), count);
    assert_eq!(items[count - 1].as_number().unwrap().to_i64(), Some(7));
}

/// A parse suspended once per input character must run on constant call
/// stack no matter how long the input is.
#[test]
fn two_hundred_thousand_suspensions_run_flat() {
    let elements = 100_000;
    let mut src = String::with_capacity(elements * 2 + 2);
    src.push('[');
    for i in 0..elements {
        if i > 0 {
            src.push(',');
        }
        src.push('1');
    }
    src.push(']');
    let total_chars = src.chars().count();
    assert!(total_chars >= 200_000);

    let engine = Engine::new(Validator::new(), EngineOptions { capacity: 1, document: true });
    let mut chars = src.chars();
    let mut suspensions = 0usize;
    let result = run_to_completion(parse_op(engine), |pending| match pending {
        Pending::MoreInput { .. } => {
            suspensions += 1;
            chars
                .next()
                .map_or(Resumed::End, |c| Resumed::Chunk(String::from(c)))
        }
        Pending::Flush(_) | Pending::Fail(_) => Resumed::Done,
    });

    assert_eq!(result, Ok(()));
    assert!(suspensions > total_chars);
}
