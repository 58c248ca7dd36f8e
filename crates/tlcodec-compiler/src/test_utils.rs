use tlcodec_core::Schema;

use crate::{Program, compile};

pub fn schema(json: &str) -> Schema {
    Schema::from_json(json).unwrap_or_else(|e| panic!("fixture schema failed to load: {e}"))
}

pub fn program(json: &str) -> Program {
    compile(&schema(json)).unwrap_or_else(|e| panic!("fixture schema failed to compile: {e:?}"))
}

/// Users/vectors fixture with explicit magics, shared by the snapshot tests.
pub const USERS: &str = r##"{
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
                        { "name": "name", "type": "string", "mask": { "arg": "flags", "bit": 0 } }
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
        }
    ],
    "functions": [
        {
            "name": "users.getUsers",
            "magic": "0x0d91a548",
            "args": [{ "name": "ids", "type": { "type": "Vector", "args": ["long"] } }],
            "result": { "type": "Vector", "args": ["User"] }
        }
    ]
}"##;
