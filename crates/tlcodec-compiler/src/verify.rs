//! Schema invariant checks run before plan generation.
//!
//! All violations are collected, not just the first, so one `check` run
//! reports everything wrong with a schema.

use std::collections::{HashMap, HashSet};

use tlcodec_core::{Combinator, ParamKind, Schema, TypeDef, TypeExpr};

use crate::error::{Violation, ViolationKind};

/// Check every type and function of `schema`.
pub fn verify(schema: &Schema) -> Vec<Violation> {
    let mut verifier = Verifier {
        schema,
        out: Vec::new(),
    };
    for (_, def) in schema.declared_types() {
        verifier.type_def(def);
    }

    let mut magics: HashMap<u32, &str> = HashMap::new();
    for (_, function) in schema.functions() {
        let comb = &function.combinator;
        verifier.combinator(comb.name.clone(), comb);
        verifier.expr(&comb.name, comb, &function.result, comb.args.len());
        if let Some(other) = magics.insert(function.magic(), function.name()) {
            verifier.report(
                comb.name.clone(),
                ViolationKind::DuplicateFunctionMagic {
                    magic: function.magic(),
                    other: other.to_string(),
                },
            );
        }
    }
    verifier.out
}

struct Verifier<'s> {
    schema: &'s Schema,
    out: Vec<Violation>,
}

impl Verifier<'_> {
    fn report(&mut self, location: impl Into<String>, kind: ViolationKind) {
        self.out.push(Violation {
            location: location.into(),
            kind,
        });
    }

    fn type_def(&mut self, def: &TypeDef) {
        if def.constructors.is_empty() {
            self.report(def.name.clone(), ViolationKind::NoConstructors);
            return;
        }
        if def.has_default_constructor && !def.is_polymorphic() {
            self.report(def.name.clone(), ViolationKind::DefaultOnBare);
        }
        if def.is_polymorphic() {
            let mut seen = HashSet::new();
            for ctor in &def.constructors {
                if !seen.insert(ctor.magic) {
                    self.report(
                        format!("{}.{}", def.name, ctor.name),
                        ViolationKind::DuplicateMagic(ctor.magic),
                    );
                }
            }
        }

        let expected: Vec<_> = def.params.iter().map(|p| p.kind).collect();
        for ctor in &def.constructors {
            let location = format!("{}.{}", def.name, ctor.name);
            if ctor.primitive.is_none() {
                let found: Vec<_> = ctor.args.iter().filter_map(|a| a.param_kind()).collect();
                if found != expected {
                    self.report(location.clone(), ViolationKind::ParamsMismatch);
                }
            }
            self.combinator(location, ctor);
        }
    }

    fn combinator(&mut self, base: String, comb: &Combinator) {
        let mut indices = HashSet::new();
        for (pos, arg) in comb.args.iter().enumerate() {
            let location = format!("{base}.{}", arg.name);
            if !indices.insert(arg.index) {
                self.report(location.clone(), ViolationKind::DuplicateIndex(arg.index));
            }

            if let Some(mask) = arg.mask {
                match comb.args.get(mask.arg) {
                    Some(target) if mask.arg < pos => {
                        if target.is_optional() || !target.type_expr.is_nat_type() {
                            self.report(
                                location.clone(),
                                ViolationKind::MaskNotNat(target.name.clone()),
                            );
                        }
                    }
                    other => {
                        let name =
                            other.map_or_else(|| format!("#{}", mask.arg), |a| a.name.clone());
                        self.report(location.clone(), ViolationKind::MaskNotEarlier(name));
                    }
                }
                if mask.bit >= 32 {
                    self.report(location.clone(), ViolationKind::MaskBitRange(mask.bit));
                }
            }

            if arg.is_type {
                continue;
            }
            if arg.is_forwarded_function {
                let ok = matches!(
                    arg.type_expr,
                    TypeExpr::TypeVar(p) if self.param_kind(comb, p) == Some(ParamKind::Type)
                );
                if !ok {
                    self.report(location, ViolationKind::ForwardedNotTypeVar);
                }
                continue;
            }
            if arg.type_expr.is_nat_expr() {
                self.report(location, ViolationKind::NatAsFieldType);
                continue;
            }
            self.expr(&location, comb, &arg.type_expr, pos);
        }
    }

    fn param_kind(&self, comb: &Combinator, param: usize) -> Option<ParamKind> {
        comb.param_arg(param)
            .and_then(|slot| comb.args[slot].param_kind())
    }

    /// `limit`: natural variables must reference an argument before this position.
    fn expr(&mut self, location: &str, comb: &Combinator, expr: &TypeExpr, limit: usize) {
        match expr {
            TypeExpr::NatConst(_) => {}
            TypeExpr::NatVar(arg) => {
                let ok = *arg < limit
                    && comb
                        .args
                        .get(*arg)
                        .is_some_and(|a| a.type_expr.is_nat_type());
                if !ok {
                    let name = comb
                        .args
                        .get(*arg)
                        .map_or_else(|| format!("#{arg}"), |a| a.name.clone());
                    self.report(location, ViolationKind::BadNatVar(name));
                }
            }
            TypeExpr::TypeVar(param) => {
                if self.param_kind(comb, *param) != Some(ParamKind::Type) {
                    self.report(location, ViolationKind::BadTypeVar(*param));
                }
            }
            TypeExpr::Array { item, multiplicity } => {
                if !multiplicity.is_nat_expr() {
                    self.report(location, ViolationKind::ArrayCountNotNat);
                }
                if item.is_nat_expr() {
                    self.report(location, ViolationKind::ArrayItemNotType);
                }
                self.expr(location, comb, multiplicity, limit);
                self.expr(location, comb, item, limit);
            }
            TypeExpr::Named { type_id, children } => {
                let Some(def) = self.schema.get_type(*type_id) else {
                    self.report(location, ViolationKind::UnknownType(type_id.0));
                    return;
                };
                if def.params.len() != children.len() {
                    self.report(
                        location,
                        ViolationKind::ArityMismatch {
                            ty: def.name.clone(),
                            expected: def.params.len(),
                            found: children.len(),
                        },
                    );
                }
                for (position, (param, child)) in def.params.iter().zip(children).enumerate() {
                    let (ok, expected) = match param.kind {
                        ParamKind::Nat => (child.is_nat_expr(), "natural"),
                        ParamKind::Type => (!child.is_nat_expr(), "type"),
                    };
                    if !ok {
                        self.report(
                            location,
                            ViolationKind::ParamKindMismatch {
                                ty: def.name.clone(),
                                position,
                                expected,
                            },
                        );
                    }
                }
                for child in children {
                    self.expr(location, comb, child, limit);
                }
            }
        }
    }
}
