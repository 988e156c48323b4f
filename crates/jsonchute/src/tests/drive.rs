use alloc::{string::ToString, vec::Vec};

use crate::{
    Engine, EngineOptions, Flow, Pending, Resumed, SyntaxError, TreeError, TreeFactory,
    parse_document_str, parse_op, run_to_completion, write_op,
};

#[test]
fn write_op_flushes_one_token_per_suspension() {
    let value = parse_document_str(r#"{"a":1,"b":[null,true]}"#).unwrap();
    let expected = value.to_string();

    let mut tokens = Vec::new();
    run_to_completion(write_op(value), |pending| {
        match pending {
            Pending::Flush(token) => tokens.push(token),
            other => panic!("unexpected effect {other:?}"),
        }
        Resumed::Done
    });

    assert!(tokens.len() > 1);
    assert_eq!(tokens.concat(), expected);
}

#[test]
fn parse_op_threads_scripted_chunks() {
    let chunks = ["{\"a\"", ": [1, ", "2]", "}"];
    let engine = Engine::new(TreeFactory, EngineOptions::default());
    let mut feed = chunks.iter();
    let result = run_to_completion(parse_op(engine), |pending| match pending {
        Pending::MoreInput { .. } => feed
            .next()
            .map_or(Resumed::End, |chunk| Resumed::Chunk((*chunk).to_string())),
        Pending::Flush(_) | Pending::Fail(_) => Resumed::Done,
    });
    assert_eq!(result.unwrap().to_string(), r#"{"a":[1,2]}"#);
}

#[test]
fn parse_op_announces_failure_before_finishing() {
    let engine = Engine::new(TreeFactory, EngineOptions::default());
    let mut fed = false;
    let mut announced = None;
    let result = run_to_completion(parse_op(engine), |pending| match pending {
        Pending::MoreInput { .. } => {
            if fed {
                Resumed::End
            } else {
                fed = true;
                Resumed::Chunk("tru".to_string())
            }
        }
        Pending::Fail(message) => {
            announced = Some(message);
            Resumed::Done
        }
        Pending::Flush(_) => panic!("a parse never flushes"),
    });

    let err = result.unwrap_err();
    assert_eq!(
        err.source,
        TreeError::Syntax(SyntaxError::BadLiteral {
            keyword: "true",
            expected: 'e',
            found: None,
        })
    );
    assert_eq!(announced.as_deref(), Some(err.to_string().as_str()));
}

#[test]
fn chunks_larger_than_the_buffer_are_replayed() {
    let engine = Engine::new(
        TreeFactory,
        EngineOptions {
            capacity: 4,
            document: true,
        },
    );
    let mut sent = false;
    let result = run_to_completion(parse_op(engine), |pending| match pending {
        Pending::MoreInput { .. } => {
            if sent {
                Resumed::End
            } else {
                sent = true;
                Resumed::Chunk("[10, 20, 30]".to_string())
            }
        }
        Pending::Flush(_) | Pending::Fail(_) => Resumed::Done,
    });
    assert_eq!(result.unwrap().to_string(), "[10,20,30]");
}

#[test]
fn need_input_reports_the_free_room() {
    let engine = Engine::new(
        TreeFactory,
        EngineOptions {
            capacity: 8,
            document: true,
        },
    );
    match parse_op(engine).step() {
        Flow::Suspended(Pending::MoreInput { min, room }, cont) => {
            assert_eq!(min, 1);
            assert_eq!(room, 8);
            let rest = cont.resume(Resumed::Chunk("7".to_string()));
            match rest.step() {
                Flow::Suspended(Pending::MoreInput { .. }, cont) => {
                    match cont.resume(Resumed::End).step() {
                        Flow::Finished(result) => {
                            assert_eq!(result.unwrap().to_string(), "7");
                        }
                        Flow::Suspended(..) => panic!("expected completion after end of input"),
                    }
                }
                _ => panic!("expected a further input request"),
            }
        }
        _ => panic!("an empty engine must request input"),
    }
}
