//! CombinatorCodec: one procedure per constructor or function signature.

use std::collections::{HashMap, HashSet};

use tlcodec_core::{Combinator, Function, TypeExpr, TypeId};

use crate::expr::ExprCodec;
use crate::plan::{CombinatorPlan, FieldRole, FieldStep, FunctionPlan, Gate, Step};

/// Compile a constructor of `owner`, or a function signature when `owner` is `None`.
///
/// `result` is the function result, whose natural variables also need captures.
pub(crate) fn compile_combinator(
    codec: &ExprCodec<'_>,
    owner: Option<TypeId>,
    comb: &Combinator,
    result: Option<&TypeExpr>,
) -> CombinatorPlan {
    let slot_names = comb.args.iter().map(|a| a.name.clone()).collect();
    if comb.primitive.is_some() {
        return CombinatorPlan {
            name: comb.name.clone(),
            magic: comb.magic,
            primitive: comb.primitive,
            steps: Vec::new(),
            slot_names,
            param_slots: Vec::new(),
        };
    }

    let prefixes = length_prefixes(comb);
    let referenced = referenced_slots(comb, result);
    let mut steps = Vec::with_capacity(comb.args.len());
    let mut param_slots = Vec::new();

    for (slot, arg) in comb.args.iter().enumerate() {
        let gate = arg.mask.map(|m| Gate {
            mask_slot: m.arg,
            bit: m.bit,
        });

        if let Some(kind) = arg.param_kind() {
            steps.push(Step::Param {
                slot,
                param: param_slots.len(),
                kind,
            });
            param_slots.push(slot);
            continue;
        }

        if arg.is_forwarded_function {
            let param = match arg.type_expr {
                TypeExpr::TypeVar(p) => p,
                _ => 0,
            };
            steps.push(Step::Forwarded {
                slot,
                name: arg.name.clone(),
                index: arg.index,
                gate,
                param,
            });
            continue;
        }

        let role = match prefixes.get(&slot) {
            Some(&array_slot) => FieldRole::LengthOf { array_slot },
            None => FieldRole::Value,
        };
        steps.push(Step::Field(FieldStep {
            slot,
            name: arg.name.clone(),
            index: arg.index,
            gate,
            expr: codec.compile(owner, &arg.type_expr),
            capture: arg.captures_named_value
                || referenced.contains(&slot)
                || role != FieldRole::Value,
            role,
        }));
    }

    CombinatorPlan {
        name: comb.name.clone(),
        magic: comb.magic,
        primitive: None,
        steps,
        slot_names,
        param_slots,
    }
}

pub(crate) fn compile_function(codec: &ExprCodec<'_>, function: &Function) -> FunctionPlan {
    FunctionPlan {
        call: compile_combinator(codec, None, &function.combinator, Some(&function.result)),
        result: codec.compile(None, &function.result),
        original_result_magic: function.original_result_magic,
    }
}

/// Slots read later as a mask or a natural variable.
fn referenced_slots(comb: &Combinator, result: Option<&TypeExpr>) -> HashSet<usize> {
    let mut slots: HashSet<usize> = comb
        .args
        .iter()
        .filter_map(|a| a.mask.map(|m| m.arg))
        .collect();
    for arg in &comb.args {
        nat_vars(&arg.type_expr, &mut slots);
    }
    if let Some(result) = result {
        nat_vars(result, &mut slots);
    }
    slots
}

fn nat_vars(expr: &TypeExpr, out: &mut HashSet<usize>) {
    match expr {
        TypeExpr::NatVar(slot) => {
            out.insert(*slot);
        }
        TypeExpr::Array { item, multiplicity } => {
            nat_vars(item, out);
            nat_vars(multiplicity, out);
        }
        TypeExpr::Named { children, .. } => {
            for child in children {
                nat_vars(child, out);
            }
        }
        TypeExpr::NatConst(_) | TypeExpr::TypeVar(_) => {}
    }
}

/// Count arguments that only exist to prefix an array: required, explicit
/// naturals used as the multiplicity of a later array field and never as a mask.
/// Maps count slot to the first array slot it prefixes.
fn length_prefixes(comb: &Combinator) -> HashMap<usize, usize> {
    let masks: HashSet<usize> = comb.args.iter().filter_map(|a| a.mask.map(|m| m.arg)).collect();
    let mut prefixes = HashMap::new();

    for (pos, arg) in comb.args.iter().enumerate() {
        if arg.is_type || arg.is_forwarded_function {
            continue;
        }
        let TypeExpr::Array { multiplicity, .. } = &arg.type_expr else {
            continue;
        };
        let TypeExpr::NatVar(count) = **multiplicity else {
            continue;
        };
        let Some(count_arg) = comb.args.get(count) else {
            continue;
        };
        if count < pos
            && !count_arg.is_type
            && !count_arg.is_optional()
            && count_arg.type_expr.is_nat_type()
            && !masks.contains(&count)
        {
            prefixes.entry(count).or_insert(pos);
        }
    }
    prefixes
}
