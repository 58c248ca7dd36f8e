use crate::{Arg, Combinator, FieldMask, Primitive, Schema, TypeDef, TypeExpr, magic};

fn user_type() -> (Schema, TypeDef) {
    let schema = Schema::new();
    let ctor = Combinator {
        name: "user".into(),
        magic: 0,
        args: vec![
            Arg::new("flags", 0, TypeExpr::primitive(Primitive::Nat)),
            {
                let mut arg = Arg::new("name", 1, TypeExpr::primitive(Primitive::String));
                arg.mask = Some(FieldMask { arg: 0, bit: 3 });
                arg
            },
        ],
        primitive: None,
    };
    let def = TypeDef {
        name: "User".into(),
        params: Vec::new(),
        constructors: vec![ctor],
        has_default_constructor: false,
    };
    (schema, def)
}

#[test]
fn optional_argument_rendering() {
    let (schema, def) = user_type();

    assert_eq!(
        magic::constructor_declaration(&schema, &def, &def.constructors[0]),
        "user flags:# name:flags.3?string = User"
    );
}

#[test]
fn magic_is_stable() {
    let (schema, def) = user_type();
    let first = magic::constructor_magic(&schema, &def, &def.constructors[0]);
    let second = magic::constructor_magic(&schema, &def, &def.constructors[0]);

    assert_eq!(first, second);
    assert_eq!(first, crc32fast::hash(b"user flags:# name:flags.3?string = User"));
}

#[test]
fn magic_changes_with_declaration() {
    let (schema, mut def) = user_type();
    let before = magic::constructor_magic(&schema, &def, &def.constructors[0]);

    def.constructors[0].args[1].mask = Some(FieldMask { arg: 0, bit: 4 });
    let after = magic::constructor_magic(&schema, &def, &def.constructors[0]);

    assert_ne!(before, after);
}

#[test]
fn builtin_magics_are_distinct() {
    let mut magics: Vec<_> = Primitive::ALL.into_iter().map(magic::builtin_magic).collect();
    magics.sort_unstable();
    magics.dedup();

    assert_eq!(magics.len(), Primitive::ALL.len());
}

#[test]
fn nested_generic_children_are_parenthesized() {
    let mut schema = Schema::new();
    let vector = schema.push_type(TypeDef {
        name: "Vector".into(),
        params: Vec::new(),
        constructors: Vec::new(),
        has_default_constructor: false,
    });
    let comb = Combinator {
        name: "f".into(),
        magic: 0,
        args: Vec::new(),
        primitive: None,
    };
    let expr = TypeExpr::Named {
        type_id: vector,
        children: vec![TypeExpr::Named {
            type_id: vector,
            children: vec![TypeExpr::primitive(Primitive::Long)],
        }],
    };

    assert_eq!(
        magic::render_expr(&schema, &comb, &expr),
        "Vector (Vector long)"
    );
}
