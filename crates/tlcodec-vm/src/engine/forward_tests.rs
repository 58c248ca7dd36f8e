use tlcodec_wire::{Reader, Writer};

use super::test_utils::{MESSAGES, engine, json, program, unwords, words};
use super::{CodecError, Engine, FunctionTable, Typing, Value};

fn encode_call(engine: &Engine<'_>, call: &Value) -> Result<String, CodecError> {
    let mut w = Writer::new();
    engine.encode_call(call, &mut w)?;
    Ok(words(w.as_bytes()))
}

fn get_users(ids: &str) -> Value {
    json(&format!(r#"{{ "_": "users.getUsers", "ids": {{ "items": [{ids}] }} }}"#))
}

fn invoke(query: Value) -> Value {
    Value::tagged("invokeWithLayer", [("layer", Value::Long(42)), ("query", query)])
}

#[test]
fn call_writes_function_magic() {
    let program = program(MESSAGES);
    let engine = engine(&program, Typing::Weak);

    let hex = encode_call(&engine, &get_users("1, 2")).unwrap();

    insta::assert_snapshot!(hex, @"48a5910d 02000000 01000000 00000000 02000000 00000000");
}

#[test]
fn call_decodes_by_magic() {
    let program = program(MESSAGES);
    let engine = engine(&program, Typing::Weak);
    let bytes = unwords("48a5910d 00000000");

    let call = engine.decode_call(&mut Reader::new(&bytes)).unwrap();

    assert_eq!(
        call,
        Value::tagged(
            "users.getUsers",
            [("ids", Value::record([("items", Value::Array(Vec::new()))]))]
        )
    );
}

#[test]
fn unknown_functions() {
    let program = program(MESSAGES);
    let engine = engine(&program, Typing::Weak);

    let err = encode_call(&engine, &json(r#"{ "_": "users.deleteAll" }"#)).unwrap_err();
    assert_eq!(err, CodecError::UnknownFunction("users.deleteAll".into()));

    let bytes = unwords("efbeadde");
    let err = engine.decode_call(&mut Reader::new(&bytes)).unwrap_err();
    assert_eq!(err, CodecError::UnknownFunction("#deadbeef".into()));
}

#[test]
fn result_uses_call_frame() {
    let program = program(MESSAGES);
    let engine = engine(&program, Typing::Weak);
    let call = get_users("3, 4");
    let users = json(
        r#"{ "items": [
            { "_": "userEmpty", "id": 3 },
            { "_": "user", "flags": 0, "id": 4 }
        ] }"#,
    );

    let mut w = Writer::new();
    engine.encode_result(&call, &users, &mut w).unwrap();
    insta::assert_snapshot!(words(w.as_bytes()), @"02000000 03000000 00000000 01aa0000 00000000 04000000 00000000");

    let decoded = engine.decode_result(&call, &mut Reader::new(w.as_bytes())).unwrap();
    assert_eq!(
        decoded,
        Value::record([(
            "items",
            Value::Array(vec![
                Value::tagged("userEmpty", [("id", Value::Long(3))]),
                Value::tagged("user", [("flags", Value::Nat(0)), ("id", Value::Long(4))]),
            ]),
        )])
    );
}

#[test]
fn original_result_magic_is_written_and_checked() {
    let program = program(MESSAGES);
    let engine = engine(&program, Typing::Weak);
    let call = json(r#"{ "_": "peers.resolve", "username": "durov" }"#);
    let peer = json(r#"{ "_": "peerChat", "chat_id": 5 }"#);

    let mut w = Writer::new();
    engine.encode_result(&call, &peer, &mut w).unwrap();
    insta::assert_snapshot!(words(w.as_bytes()), @"fff00000 02bb0000 05000000 00000000");

    let decoded = engine.decode_result(&call, &mut Reader::new(w.as_bytes())).unwrap();
    assert_eq!(decoded, Value::tagged("peerChat", [("chat_id", Value::Long(5))]));

    let bytes = unwords("01f00000 02bb0000 05000000 00000000");
    let err = engine.decode_result(&call, &mut Reader::new(&bytes)).unwrap_err();
    assert_eq!(
        err,
        CodecError::UnknownMagic {
            type_name: "result of peers.resolve".into(),
            magic: 0x0000_f001,
        }
    );
}

#[test]
fn forwarded_call_is_spliced_inline() {
    let program = program(MESSAGES);
    let engine = engine(&program, Typing::Weak);

    let hex = encode_call(&engine, &invoke(get_users("9"))).unwrap();
    insta::assert_snapshot!(hex, @"0d0d9bda 2a000000 48a5910d 01000000 09000000 00000000");

    let bytes = unwords(&hex);
    let decoded = engine.decode_call(&mut Reader::new(&bytes)).unwrap();
    assert_eq!(
        decoded,
        Value::tagged(
            "invokeWithLayer",
            [
                ("layer", Value::Int(42)),
                (
                    "query",
                    Value::tagged(
                        "users.getUsers",
                        [(
                            "ids",
                            Value::record([("items", Value::Array(vec![Value::Long(9)]))])
                        )]
                    ),
                ),
            ]
        )
    );
}

#[test]
fn forwarded_result_takes_nested_result_type() {
    let program = program(MESSAGES);
    let engine = engine(&program, Typing::Weak);
    let call = invoke(get_users("9"));
    let users = json(r#"{ "items": [{ "_": "userEmpty", "id": 9 }] }"#);

    let mut w = Writer::new();
    engine.encode_result(&call, &users, &mut w).unwrap();
    insta::assert_snapshot!(words(w.as_bytes()), @"01000000 09000000 00000000");

    let decoded = engine.decode_result(&call, &mut Reader::new(w.as_bytes())).unwrap();
    assert_eq!(
        decoded,
        Value::record([(
            "items",
            Value::Array(vec![Value::tagged("userEmpty", [("id", Value::Long(9))])]),
        )])
    );
}

#[test]
fn forwarding_nests() {
    let program = program(MESSAGES);
    let engine = engine(&program, Typing::Weak);
    let call = invoke(invoke(json(r#"{ "_": "peers.resolve", "username": "a" }"#)));

    let mut w = Writer::new();
    engine
        .encode_result(&call, &json(r#"{ "_": "peerUser", "user_id": 1 }"#), &mut w)
        .unwrap();

    insta::assert_snapshot!(words(w.as_bytes()), @"fff00000 01bb0000 01000000 00000000");
}

#[test]
fn unregistered_callee_is_rejected() {
    let program = program(MESSAGES);
    let engine = Engine::builder(&program)
        .registry(FunctionTable::only(&program, ["peers.resolve"]))
        .build();

    let err = encode_call(&engine, &invoke(get_users("9"))).unwrap_err();
    assert_eq!(
        err,
        CodecError::UnknownForwardedFunction {
            callee: "users.getUsers".into(),
        }
    );

    let bytes = unwords("0d0d9bda 2a000000 48a5910d 00000000");
    let err = engine.decode_call(&mut Reader::new(&bytes)).unwrap_err();
    assert_eq!(
        err,
        CodecError::UnknownForwardedFunction {
            callee: "#0d91a548".into(),
        }
    );

    let hex = encode_call(&engine, &invoke(json(r#"{ "_": "peers.resolve", "username": "" }"#)));
    insta::assert_snapshot!(hex.unwrap(), @"0d0d9bda 2a000000 01f00000 00000000");
}

#[test]
fn strong_calls_use_objects() {
    let program = program(MESSAGES);
    let engine = engine(&program, Typing::Strong);
    let call = Value::object(
        "invokeWithLayer",
        [
            ("layer", Value::Int(1)),
            (
                "query",
                Value::object("peers.resolve", [("username", Value::String("x".into()))]),
            ),
        ],
    );

    let hex = encode_call(&engine, &call).unwrap();
    insta::assert_snapshot!(hex, @"0d0d9bda 01000000 01f00000 01780000");

    let bytes = unwords(&hex);
    assert_eq!(engine.decode_call(&mut Reader::new(&bytes)).unwrap(), call);
}
