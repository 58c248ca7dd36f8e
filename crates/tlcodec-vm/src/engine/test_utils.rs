use tlcodec_compiler::{Program, compile};
use tlcodec_core::Schema;
use tlcodec_wire::{Reader, Writer};

use super::{CodecError, Engine, Typing, Value};

pub fn program(json: &str) -> Program {
    let schema =
        Schema::from_json(json).unwrap_or_else(|e| panic!("fixture schema failed to load: {e}"));
    compile(&schema).unwrap_or_else(|e| panic!("fixture schema failed to compile: {e:?}"))
}

/// Space-separated 4-byte words, as the wire is aligned.
pub fn words(bytes: &[u8]) -> String {
    bytes
        .chunks(4)
        .map(|w| w.iter().map(|b| format!("{b:02x}")).collect::<String>())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse space-separated hex words back into bytes.
pub fn unwords(text: &str) -> Vec<u8> {
    let digits: String = text.split_whitespace().collect();
    (0..digits.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(&digits[i..i + 2], 16).unwrap())
        .collect()
}

pub fn engine(program: &Program, typing: Typing) -> Engine<'_> {
    Engine::builder(program).typing(typing).build()
}

pub fn encode(engine: &Engine<'_>, ty: &str, value: &Value) -> Result<String, CodecError> {
    let mut w = Writer::new();
    engine.encode_named(ty, value, &mut w)?;
    Ok(words(w.as_bytes()))
}

pub fn decode(engine: &Engine<'_>, ty: &str, hex: &str) -> Result<Value, CodecError> {
    let bytes = unwords(hex);
    let mut r = Reader::new(&bytes);
    engine.decode_named(ty, &mut r)
}

/// Weak JSON value, the way the CLI builds them.
pub fn json(text: &str) -> Value {
    Value::from_json(&serde_json::from_str(text).unwrap())
}

/// Messaging-flavored fixture with explicit magics.
pub const MESSAGES: &str = r##"{
    "types": [
        {
            "name": "User",
            "default_constructor": true,
            "constructors": [
                {
                    "name": "user",
                    "magic": "0x0000aa01",
                    "args": [
                        { "name": "flags", "type": "#" },
                        { "name": "id", "type": "long" },
                        { "name": "name", "type": "string", "mask": { "arg": "flags", "bit": 0 } },
                        { "name": "bot", "type": "int", "mask": { "arg": "flags", "bit": 3 } }
                    ]
                },
                {
                    "name": "userEmpty",
                    "magic": "0x0000aa02",
                    "args": [{ "name": "id", "type": "long" }]
                }
            ]
        },
        {
            "name": "Peer",
            "constructors": [
                { "name": "peerUser", "magic": "0x0000bb01", "args": [{ "name": "user_id", "type": "long" }] },
                { "name": "peerChat", "magic": "0x0000bb02", "args": [{ "name": "chat_id", "type": "long" }] }
            ]
        },
        {
            "name": "Vector",
            "params": [{ "name": "t", "kind": "type" }],
            "constructors": [{
                "name": "vector",
                "magic": "0x1cb5c415",
                "args": [
                    { "name": "t", "param": "type" },
                    { "name": "n", "type": "#" },
                    { "name": "items", "type": { "array": { "var": "t" }, "count": "n" } }
                ]
            }]
        },
        {
            "name": "Tuple",
            "params": [{ "name": "t", "kind": "type" }, { "name": "n", "kind": "nat" }],
            "constructors": [{
                "name": "tuple",
                "magic": "0x0000ee01",
                "args": [
                    { "name": "t", "param": "type" },
                    { "name": "n", "param": "nat" },
                    { "name": "items", "type": { "array": { "var": "t" }, "count": "n" } }
                ]
            }]
        },
        {
            "name": "Point",
            "constructors": [{
                "name": "point",
                "magic": "0x0000ee02",
                "args": [
                    { "name": "coords", "type": { "type": "Tuple", "args": ["double", { "nat": 3 }] } },
                    { "name": "rgb", "type": { "array": "int", "count": 2 } }
                ]
            }]
        },
        {
            "name": "Media",
            "constructors": [{
                "name": "media",
                "magic": "0x0000cc01",
                "args": [
                    { "name": "flags", "type": "#" },
                    { "name": "caption", "type": "string", "mask": { "arg": "flags", "bit": 1 } },
                    { "name": "data", "type": "bytes", "mask": { "arg": "flags", "bit": 2 } },
                    { "name": "peers", "type": { "type": "Vector", "args": ["Peer"] }, "mask": { "arg": "flags", "bit": 2 } }
                ]
            }]
        },
        {
            "name": "List",
            "constructors": [
                { "name": "cons", "magic": "0x0000dd01", "args": [
                    { "name": "head", "type": "int" },
                    { "name": "tail", "type": "List" }
                ] },
                { "name": "nil", "magic": "0x0000dd02" }
            ]
        }
    ],
    "functions": [
        {
            "name": "users.getUsers",
            "magic": "0x0d91a548",
            "args": [{ "name": "ids", "type": { "type": "Vector", "args": ["long"] } }],
            "result": { "type": "Vector", "args": ["User"] }
        },
        {
            "name": "peers.resolve",
            "magic": "0x0000f001",
            "args": [{ "name": "username", "type": "string" }],
            "result": "Peer",
            "original_result_magic": "0x0000f0ff"
        },
        {
            "name": "invokeWithLayer",
            "magic": "0xda9b0d0d",
            "args": [
                { "name": "X", "param": "type" },
                { "name": "layer", "type": "int" },
                { "name": "query", "forward": "X" }
            ],
            "result": { "var": "X" }
        }
    ]
}"##;

/// Bare shapes: zero-size items and a gated counted array.
pub const SHAPES: &str = r##"{
    "types": [
        {
            "name": "True",
            "constructors": [{ "name": "true", "magic": "0x3fedd339" }]
        },
        {
            "name": "Vector",
            "params": [{ "name": "t", "kind": "type" }],
            "constructors": [{
                "name": "vector",
                "magic": "0x1cb5c415",
                "args": [
                    { "name": "t", "param": "type" },
                    { "name": "n", "type": "#" },
                    { "name": "items", "type": { "array": { "var": "t" }, "count": "n" } }
                ]
            }]
        },
        {
            "name": "Units",
            "constructors": [{
                "name": "units",
                "magic": "0x0000ab01",
                "args": [
                    { "name": "a", "type": { "type": "Vector", "args": ["True"] } },
                    { "name": "b", "type": { "type": "Vector", "args": ["True"] } }
                ]
            }]
        },
        {
            "name": "Opt",
            "constructors": [{
                "name": "opt",
                "magic": "0x0000ab02",
                "args": [
                    { "name": "flags", "type": "#" },
                    { "name": "n", "type": "#" },
                    { "name": "items", "type": { "array": "int", "count": "n" }, "mask": { "arg": "flags", "bit": 0 } }
                ]
            }]
        }
    ]
}"##;
