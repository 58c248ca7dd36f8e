use indoc::indoc;
use tlcodec_core::{Primitive, TypeId};

use crate::test_utils::{USERS, program, schema};
use crate::{CompileError, Dispatch, ExprPlan, FieldRole, Step, compile};

#[test]
fn builtins_compile_to_bare_primitives() {
    let program = program(USERS);

    for p in Primitive::ALL {
        let plan = program.type_plan(TypeId::of_primitive(p)).unwrap();
        assert!(plan.builtin);
        assert_eq!(plan.primitive(), Some(p));
    }
}

#[test]
fn polymorphic_type_splits_default() {
    let program = program(USERS);
    let user = program.type_plan(program.type_by_name("User").unwrap()).unwrap();

    let Dispatch::Polymorphic { cases, default } = &user.dispatch else {
        panic!("User should be polymorphic");
    };
    assert_eq!(cases.len(), 1);
    assert_eq!(cases[0].name, "user");
    assert_eq!(default.as_ref().map(|c| c.name.as_str()), Some("userEmpty"));

    let names: Vec<_> = user.dispatch.constructors().map(|c| c.name.as_str()).collect();
    assert_eq!(names, vec!["user", "userEmpty"]);
}

#[test]
fn vector_count_is_length_prefix() {
    let program = program(USERS);
    let vector = program.type_plan(program.type_by_name("Vector").unwrap()).unwrap();
    let Dispatch::Bare(ctor) = &vector.dispatch else {
        panic!("Vector should be bare");
    };

    assert!(matches!(ctor.steps[0], Step::Param { slot: 0, param: 0, .. }));
    let Step::Field(count) = &ctor.steps[1] else {
        panic!("expected count field");
    };
    assert_eq!(count.role, FieldRole::LengthOf { array_slot: 2 });
    assert!(count.capture);
    assert_eq!(ctor.param_name(0), Some("t"));
}

#[test]
fn mask_argument_is_not_a_length_prefix() {
    let program = program(indoc! {r##"
        {
            "types": [{
                "name": "Odd",
                "constructors": [{
                    "name": "odd",
                    "args": [
                        { "name": "n", "type": "#" },
                        { "name": "extra", "type": "int", "mask": { "arg": "n", "bit": 1 } },
                        { "name": "items", "type": { "array": "int", "count": "n" } }
                    ]
                }]
            }]
        }
    "##});
    let odd = program.type_plan(program.type_by_name("Odd").unwrap()).unwrap();
    let Dispatch::Bare(ctor) = &odd.dispatch else {
        panic!("Odd should be bare");
    };

    let roles: Vec<_> = ctor.fields().map(|f| f.role).collect();
    assert_eq!(roles, vec![FieldRole::Value; 3]);
}

#[test]
fn fixed_size_array() {
    let program = program(indoc! {r#"
        {
            "types": [{
                "name": "Int128",
                "constructors": [{
                    "name": "int128",
                    "args": [{ "name": "parts", "type": { "array": "long", "count": 2 } }]
                }]
            }]
        }
    "#});
    let ty = program.type_plan(program.type_by_name("Int128").unwrap()).unwrap();
    let field = ty.dispatch.constructors().next().unwrap().fields().next().unwrap();

    assert_eq!(
        field.expr,
        ExprPlan::Array {
            item: Box::new(ExprPlan::Named {
                type_id: TypeId::LONG,
                args: Vec::new(),
            }),
            count: Box::new(ExprPlan::NatConst(2)),
        }
    );
}

#[test]
fn expected_magic_hint_for_single_bare_binding() {
    let program = program(indoc! {r#"
        {
            "types": [
                {
                    "name": "Point",
                    "constructors": [{
                        "name": "point",
                        "magic": 77,
                        "args": [{ "name": "x", "type": "int" }]
                    }]
                },
                {
                    "name": "Box",
                    "params": [{ "name": "t", "kind": "type" }],
                    "constructors": [{
                        "name": "box",
                        "args": [
                            { "name": "t", "param": "type" },
                            { "name": "value", "type": { "var": "t" } }
                        ]
                    }]
                },
                {
                    "name": "Shape",
                    "constructors": [{
                        "name": "shape",
                        "args": [{ "name": "origin", "type": { "type": "Box", "args": ["Point"] } }]
                    }]
                }
            ]
        }
    "#});
    let boxed = program.type_plan(program.type_by_name("Box").unwrap()).unwrap();
    let field = boxed.dispatch.constructors().next().unwrap().fields().next().unwrap();

    assert_eq!(
        field.expr,
        ExprPlan::TypeVar {
            param: 0,
            expected_magic: 77,
        }
    );
}

#[test]
fn hint_dropped_when_bindings_differ() {
    let json = indoc! {r#"
        {
            "types": [
                {
                    "name": "Box",
                    "params": [{ "name": "t", "kind": "type" }],
                    "constructors": [{
                        "name": "box",
                        "args": [
                            { "name": "t", "param": "type" },
                            { "name": "value", "type": { "var": "t" } }
                        ]
                    }]
                },
                {
                    "name": "Pair",
                    "constructors": [{
                        "name": "pair",
                        "args": [
                            { "name": "a", "type": { "type": "Box", "args": ["int"] } },
                            { "name": "b", "type": { "type": "Box", "args": ["string"] } }
                        ]
                    }]
                }
            ]
        }
    "#};
    let program = program(json);
    let boxed = program.type_plan(program.type_by_name("Box").unwrap()).unwrap();
    let field = boxed.dispatch.constructors().next().unwrap().fields().next().unwrap();

    assert!(matches!(field.expr, ExprPlan::TypeVar { expected_magic: 0, .. }));
}

#[test]
fn function_plan_lookup() {
    let program = program(USERS);
    let id = program.function_by_name("users.getUsers").unwrap();
    let plan = program.function_plan(id).unwrap();

    assert_eq!(program.function_by_magic(0x0d91_a548), Some(id));
    assert_eq!(plan.call.fields().count(), 1);
    assert!(matches!(&plan.result, ExprPlan::Named { args, .. } if args.len() == 1));
    assert_eq!(plan.original_result_magic, None);
}

#[test]
fn invalid_schema_is_rejected() {
    let schema = schema(
        r#"{
            "types": [{
                "name": "Broken",
                "constructors": [{
                    "name": "broken",
                    "args": [{ "name": "v", "type": { "type": "Broken", "args": ["int"] } }]
                }]
            }]
        }"#,
    );

    let err = compile(&schema).unwrap_err();
    let CompileError::Invalid(violations) = &err;
    assert_eq!(violations.len(), 1);
    assert_eq!(
        err.to_string(),
        "schema verification failed with 1 violations"
    );
}
