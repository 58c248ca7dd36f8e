//! TypeExprCodec: compiles one type-expression tree into an [`ExprPlan`].
//!
//! Generic instantiation stays parametric: `Named` carries its argument
//! expressions and the runtime binds them as closures, so one plan per type
//! serves every instantiation.

use std::collections::HashMap;

use tlcodec_core::{ParamKind, Schema, TypeExpr, TypeId};

use crate::plan::ExprPlan;

/// What the schema binds one type parameter to, across all instantiations.
#[derive(Clone, Copy, PartialEq, Eq)]
enum Binding {
    Magic(u32),
    Varies,
}

pub(crate) struct ExprCodec<'s> {
    schema: &'s Schema,
    /// `(owner type, param)` -> magic of the single bare type bound there.
    hints: HashMap<(TypeId, usize), u32>,
}

impl<'s> ExprCodec<'s> {
    pub(crate) fn new(schema: &'s Schema) -> Self {
        let mut bindings = HashMap::new();
        for (_, def) in schema.types() {
            for ctor in &def.constructors {
                for arg in &ctor.args {
                    collect_bindings(schema, &arg.type_expr, &mut bindings);
                }
            }
        }
        for (_, function) in schema.functions() {
            for arg in &function.combinator.args {
                collect_bindings(schema, &arg.type_expr, &mut bindings);
            }
            collect_bindings(schema, &function.result, &mut bindings);
        }

        let hints = bindings
            .into_iter()
            .filter_map(|(key, binding)| match binding {
                Binding::Magic(magic) => Some((key, magic)),
                Binding::Varies => None,
            })
            .collect();
        Self { schema, hints }
    }

    pub(crate) fn schema(&self) -> &'s Schema {
        self.schema
    }

    /// Compile `expr` as it appears inside a constructor of `owner` (or a function).
    pub(crate) fn compile(&self, owner: Option<TypeId>, expr: &TypeExpr) -> ExprPlan {
        match expr {
            TypeExpr::NatConst(n) => ExprPlan::NatConst(*n),
            TypeExpr::NatVar(slot) => ExprPlan::NatVar(*slot),
            TypeExpr::TypeVar(param) => ExprPlan::TypeVar {
                param: *param,
                expected_magic: owner
                    .and_then(|ty| self.hints.get(&(ty, *param)))
                    .copied()
                    .unwrap_or(0),
            },
            TypeExpr::Array { item, multiplicity } => ExprPlan::Array {
                item: Box::new(self.compile(owner, item)),
                count: Box::new(self.compile(owner, multiplicity)),
            },
            TypeExpr::Named { type_id, children } => ExprPlan::Named {
                type_id: *type_id,
                args: children.iter().map(|c| self.compile(owner, c)).collect(),
            },
        }
    }
}

fn collect_bindings(
    schema: &Schema,
    expr: &TypeExpr,
    out: &mut HashMap<(TypeId, usize), Binding>,
) {
    match expr {
        TypeExpr::NatConst(_) | TypeExpr::NatVar(_) | TypeExpr::TypeVar(_) => {}
        TypeExpr::Array { item, multiplicity } => {
            collect_bindings(schema, item, out);
            collect_bindings(schema, multiplicity, out);
        }
        TypeExpr::Named { type_id, children } => {
            let Some(def) = schema.get_type(*type_id) else {
                return;
            };
            for (position, (param, child)) in def.params.iter().zip(children).enumerate() {
                if param.kind != ParamKind::Type {
                    continue;
                }
                let binding = match child {
                    TypeExpr::Named { type_id, .. } => match schema.get_type(*type_id) {
                        Some(bound) if !bound.is_polymorphic() && bound.primitive().is_none() => {
                            bound
                                .constructors
                                .first()
                                .map_or(Binding::Varies, |c| Binding::Magic(c.magic))
                        }
                        _ => Binding::Varies,
                    },
                    _ => Binding::Varies,
                };
                out.entry((*type_id, position))
                    .and_modify(|seen| {
                        if *seen != binding {
                            *seen = Binding::Varies;
                        }
                    })
                    .or_insert(binding);
            }
            for child in children {
                collect_bindings(schema, child, out);
            }
        }
    }
}
