use indoc::indoc;

use crate::{ParamKind, Schema, SchemaError, TypeExpr, TypeId, magic};

const USERS: &str = indoc! {r##"
    {
        "types": [
            {
                "name": "User",
                "constructors": [
                    {
                        "name": "user",
                        "args": [
                            { "name": "flags", "type": "#" },
                            { "name": "id", "type": "long" },
                            { "name": "name", "type": "string", "mask": { "arg": "flags", "bit": 0 } }
                        ]
                    },
                    { "name": "userEmpty", "args": [{ "name": "id", "type": "long" }] }
                ]
            },
            {
                "name": "Vector",
                "params": [{ "name": "t", "kind": "type" }],
                "constructors": [
                    {
                        "name": "vector",
                        "args": [
                            { "name": "t", "param": "type" },
                            { "name": "n", "type": "#" },
                            { "name": "items", "type": { "array": { "var": "t" }, "count": "n" } }
                        ]
                    }
                ]
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
    }
"##};

#[test]
fn loads_types_after_builtins() {
    let schema = Schema::from_json(USERS).unwrap();

    let user = schema.type_by_name("User").unwrap();
    assert_eq!(user, TypeId(6));
    assert_eq!(schema.type_by_name("Vector"), Some(TypeId(7)));
    assert_eq!(schema.declared_types().count(), 2);
    assert!(schema.type_def(user).is_polymorphic());
}

#[test]
fn resolves_mask_and_capture() {
    let schema = Schema::from_json(USERS).unwrap();
    let user = schema.type_def(schema.type_by_name("User").unwrap());
    let ctor = &user.constructors[0];

    let name = &ctor.args[2];
    assert_eq!(name.mask.map(|m| (m.arg, m.bit)), Some((0, 0)));
    assert!(ctor.args[0].captures_named_value);
    assert!(!ctor.args[1].captures_named_value);
}

#[test]
fn resolves_generic_vector() {
    let schema = Schema::from_json(USERS).unwrap();
    let vector = schema.type_def(schema.type_by_name("Vector").unwrap());

    assert_eq!(vector.params.len(), 1);
    assert_eq!(vector.params[0].kind, ParamKind::Type);

    let ctor = &vector.constructors[0];
    assert!(ctor.args[0].is_type);
    assert_eq!(ctor.args[0].type_expr, TypeExpr::TypeVar(0));
    assert!(ctor.args[1].captures_named_value);
    assert_eq!(
        ctor.args[2].type_expr,
        TypeExpr::Array {
            item: Box::new(TypeExpr::TypeVar(0)),
            multiplicity: Box::new(TypeExpr::NatVar(1)),
        }
    );
}

#[test]
fn fills_missing_constructor_magic() {
    let schema = Schema::from_json(USERS).unwrap();
    let vector = schema.type_def(schema.type_by_name("Vector").unwrap());
    let ctor = &vector.constructors[0];

    assert_eq!(
        magic::constructor_declaration(&schema, vector, ctor),
        "vector {t:Type} n:# items:n*[ t ] = Vector t"
    );
    assert_eq!(ctor.magic, magic::constructor_magic(&schema, vector, ctor));
}

#[test]
fn keeps_explicit_hex_magic() {
    let schema = Schema::from_json(USERS).unwrap();
    let id = schema.function_by_name("users.getUsers").unwrap();

    assert_eq!(schema.function(id).magic(), 0x0d91_a548);
    assert_eq!(schema.function_by_magic(0x0d91_a548), Some(id));
    assert_eq!(schema.function(id).namespace(), Some("users"));
}

#[test]
fn params_inferred_from_first_constructor() {
    let json = indoc! {r#"
        {
            "types": [{
                "name": "Pair",
                "constructors": [{
                    "name": "pair",
                    "args": [
                        { "name": "a", "param": "type" },
                        { "name": "n", "param": "nat" },
                        { "name": "first", "type": { "var": "a" } }
                    ]
                }]
            }]
        }
    "#};

    let schema = Schema::from_json(json).unwrap();
    let pair = schema.type_def(schema.type_by_name("Pair").unwrap());
    let kinds: Vec<_> = pair.params.iter().map(|p| p.kind).collect();
    assert_eq!(kinds, vec![ParamKind::Type, ParamKind::Nat]);
    assert!(pair.constructors[0].args[1].type_expr.is_nat_type());
}

#[test]
fn forwarded_function_binds_param() {
    let json = indoc! {r#"
        {
            "functions": [{
                "name": "invokeWithLayer",
                "args": [
                    { "name": "X", "param": "type" },
                    { "name": "layer", "type": "int" },
                    { "name": "query", "forward": "X" }
                ],
                "result": { "var": "X" }
            }]
        }
    "#};

    let schema = Schema::from_json(json).unwrap();
    let f = schema.function(schema.function_by_name("invokeWithLayer").unwrap());
    let query = &f.combinator.args[2];

    assert!(query.is_forwarded_function);
    assert_eq!(query.type_expr, TypeExpr::TypeVar(0));
    assert_eq!(
        magic::function_declaration(&schema, f),
        "invokeWithLayer {X:Type} layer:int query:!X = X"
    );
}

#[test]
fn rejects_duplicate_type() {
    let json = r#"{
        "types": [
            { "name": "A", "constructors": [{ "name": "a" }] },
            { "name": "A", "constructors": [{ "name": "a2" }] }
        ]
    }"#;

    let err = Schema::from_json(json).unwrap_err();
    assert!(matches!(err, SchemaError::DuplicateType(ref name) if name == "A"));
}

#[test]
fn rejects_builtin_shadowing() {
    let json = r#"{ "types": [{ "name": "Int", "constructors": [{ "name": "myInt" }] }] }"#;

    let err = Schema::from_json(json).unwrap_err();
    assert!(matches!(err, SchemaError::DuplicateType(_)));
}

#[test]
fn rejects_unknown_type_reference() {
    let json = r#"{
        "types": [{
            "name": "A",
            "constructors": [{ "name": "a", "args": [{ "name": "b", "type": "Missing" }] }]
        }]
    }"#;

    let err = Schema::from_json(json).unwrap_err();
    assert_eq!(err.to_string(), "unknown type `Missing` in `A.a`");
}

#[test]
fn rejects_unknown_mask_arg() {
    let json = r#"{
        "types": [{
            "name": "A",
            "constructors": [{
                "name": "a",
                "args": [{ "name": "b", "type": "int", "mask": { "arg": "flags", "bit": 1 } }]
            }]
        }]
    }"#;

    let err = Schema::from_json(json).unwrap_err();
    assert!(matches!(err, SchemaError::UnknownArg { ref name, .. } if name == "flags"));
}

#[test]
fn rejects_bad_hex_magic() {
    let json = r#"{
        "types": [{ "name": "A", "constructors": [{ "name": "a", "magic": "0xzz" }] }]
    }"#;

    let err = Schema::from_json(json).unwrap_err();
    assert!(matches!(err, SchemaError::InvalidMagic { .. }));
}

#[test]
fn rejects_empty_type() {
    let json = r#"{ "types": [{ "name": "Never", "constructors": [] }] }"#;

    let err = Schema::from_json(json).unwrap_err();
    assert!(matches!(err, SchemaError::EmptyType(_)));
}

#[test]
fn rejects_malformed_json() {
    let err = Schema::from_json("{ types: }").unwrap_err();
    assert!(matches!(err, SchemaError::Json(_)));
}
