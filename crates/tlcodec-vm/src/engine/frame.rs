//! Per-invocation frames and generic parameter bindings.
//!
//! A frame is created for every constructor or call that runs. Naturals read
//! or written by the combinator land in `slots`; `params` holds what the
//! instantiating expression bound to the generic parameters. Type arguments
//! are closures: the argument expression plus a snapshot of the frame that
//! wrote it, so `Vector (Maybe t)` resolves `t` in the caller.

use std::rc::Rc;

use tlcodec_compiler::{CombinatorPlan, ExprPlan, FunctionPlan};

/// Value bound to one generic parameter.
#[derive(Clone, Debug)]
pub(super) enum Binding<'p> {
    Nat(u32),
    Type(Closure<'p>),
}

/// A type argument awaiting evaluation in its defining frame.
#[derive(Clone, Debug)]
pub(super) struct Closure<'p> {
    pub expr: &'p ExprPlan,
    pub env: Rc<Env<'p>>,
    /// Set when the closure is the result of a forwarded call.
    pub result_of: Option<&'p FunctionPlan>,
}

#[derive(Clone, Debug)]
pub(super) struct Env<'p> {
    ctor: &'p CombinatorPlan,
    slots: Vec<Option<u32>>,
    params: Vec<Option<Binding<'p>>>,
}

impl<'p> Env<'p> {
    pub fn new(ctor: &'p CombinatorPlan, params: Vec<Option<Binding<'p>>>) -> Self {
        Self {
            ctor,
            slots: vec![None; ctor.slot_count()],
            params,
        }
    }

    /// Frame of a function call: parameters start unbound, `!X` arguments bind them.
    pub fn for_call(ctor: &'p CombinatorPlan) -> Self {
        Self::new(ctor, vec![None; ctor.param_slots.len()])
    }

    pub fn ctor(&self) -> &'p CombinatorPlan {
        self.ctor
    }

    pub fn slot(&self, slot: usize) -> Option<u32> {
        self.slots.get(slot).copied().flatten()
    }

    pub fn set_slot(&mut self, slot: usize, value: u32) {
        if let Some(s) = self.slots.get_mut(slot) {
            *s = Some(value);
        }
    }

    pub fn slot_name(&self, slot: usize) -> &'p str {
        self.ctor.slot_names.get(slot).map_or("?", String::as_str)
    }

    pub fn param(&self, param: usize) -> Option<&Binding<'p>> {
        self.params.get(param).and_then(Option::as_ref)
    }

    pub fn param_name(&self, param: usize) -> &'p str {
        self.ctor.param_name(param).unwrap_or("?")
    }

    pub fn bind_param(&mut self, param: usize, binding: Binding<'p>) {
        if self.params.len() <= param {
            self.params.resize(param + 1, None);
        }
        self.params[param] = Some(binding);
    }

    /// Evaluate a natural expression; `None` when its slot is still empty.
    pub fn nat(&self, expr: &ExprPlan) -> Option<u32> {
        match expr {
            ExprPlan::NatConst(n) => Some(*n),
            ExprPlan::NatVar(slot) => self.slot(*slot),
            _ => None,
        }
    }

    /// Bindings for instantiating a type with `args` from this frame.
    ///
    /// Parameters passed through unchanged keep their original closure, so
    /// chains of generic forwarding do not nest. Fails with the position of
    /// the first argument that cannot be bound yet.
    pub fn bind(&self, args: &'p [ExprPlan]) -> Result<Vec<Option<Binding<'p>>>, usize> {
        let mut snapshot: Option<Rc<Env<'p>>> = None;
        args.iter()
            .enumerate()
            .map(|(i, arg)| match arg {
                ExprPlan::NatConst(_) | ExprPlan::NatVar(_) => {
                    self.nat(arg).map(|n| Some(Binding::Nat(n))).ok_or(i)
                }
                ExprPlan::TypeVar { param, .. } => self.param(*param).cloned().map(Some).ok_or(i),
                _ => {
                    let env = snapshot.get_or_insert_with(|| Rc::new(self.clone()));
                    Ok(Some(Binding::Type(Closure {
                        expr: arg,
                        env: Rc::clone(env),
                        result_of: None,
                    })))
                }
            })
            .collect()
    }
}
