//! Compiled codec plans.
//!
//! A [`Program`] holds two direction-agnostic procedures per schema entry: the
//! runtime walks the same plan to encode or to decode. All references are
//! indices, so a program is `Send + Sync` and needs no schema at runtime.

use std::collections::HashMap;

use indexmap::IndexMap;
use tlcodec_core::{FunctionId, ParamKind, Primitive, TypeId, TypeParam};

/// One node of a compiled type expression (TypeExprCodec output).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExprPlan {
    /// Compile-time natural, never on the wire.
    NatConst(u32),
    /// Natural captured in the current frame slot.
    NatVar(usize),
    /// Generic parameter of the current instantiation.
    TypeVar {
        param: usize,
        /// Magic of the only constructor the parameter is ever bound to, 0 if unknown.
        expected_magic: u32,
    },
    /// `count*[ item ]`; the count comes from the frame, the array writes no header.
    Array {
        item: Box<ExprPlan>,
        count: Box<ExprPlan>,
    },
    /// Instantiate another type with `args` bound to its parameters.
    Named { type_id: TypeId, args: Vec<ExprPlan> },
}

/// Optional-field gate: present iff `slots[mask_slot] & (1 << bit) != 0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Gate {
    pub mask_slot: usize,
    pub bit: u8,
}

impl Gate {
    pub fn is_open(&self, mask: u32) -> bool {
        self.bit < 32 && mask & (1 << self.bit) != 0
    }
}

/// How a field's host value relates to the record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldRole {
    /// Supplied by / returned to the host.
    Value,
    /// Count prefix of the array field in `array_slot`; derived on encode, hidden on decode.
    LengthOf { array_slot: usize },
}

/// A wire-carried argument.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldStep {
    pub slot: usize,
    pub name: String,
    pub index: u32,
    pub gate: Option<Gate>,
    pub expr: ExprPlan,
    /// Keep the natural in `slot` for later masks and counts.
    pub capture: bool,
    pub role: FieldRole,
}

/// One step of a combinator procedure (CombinatorCodec output).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Step {
    /// Implicit parameter slot; natural parameters are copied into `slot`.
    Param {
        slot: usize,
        param: usize,
        kind: ParamKind,
    },
    Field(FieldStep),
    /// `!X` argument: a nested call whose result type binds `param`.
    Forwarded {
        slot: usize,
        name: String,
        index: u32,
        gate: Option<Gate>,
        param: usize,
    },
}

/// Procedure for one constructor or function signature.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CombinatorPlan {
    pub name: String,
    pub magic: u32,
    /// Builtin payload; when set, `steps` is empty.
    pub primitive: Option<Primitive>,
    pub steps: Vec<Step>,
    /// Argument names by slot, for diagnostics and dumps.
    pub slot_names: Vec<String>,
    /// Slot of each implicit parameter, in parameter order.
    pub param_slots: Vec<usize>,
}

impl CombinatorPlan {
    pub fn slot_count(&self) -> usize {
        self.slot_names.len()
    }

    pub fn param_name(&self, param: usize) -> Option<&str> {
        self.param_slots
            .get(param)
            .and_then(|&slot| self.slot_names.get(slot))
            .map(String::as_str)
    }

    /// Iterate the wire-carried fields.
    pub fn fields(&self) -> impl Iterator<Item = &FieldStep> {
        self.steps.iter().filter_map(|s| match s {
            Step::Field(f) => Some(f),
            _ => None,
        })
    }
}

/// Per-type dispatch (TypeCodec output); fixed at compile time.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Dispatch {
    /// Single constructor: no magic on the wire.
    Bare(CombinatorPlan),
    /// Magic switch over `cases` in declaration order, then `default`.
    Polymorphic {
        cases: Vec<CombinatorPlan>,
        default: Option<CombinatorPlan>,
    },
}

impl Dispatch {
    /// All constructors in declaration order.
    pub fn constructors(&self) -> impl Iterator<Item = &CombinatorPlan> {
        let (head, tail): (&[CombinatorPlan], Option<&CombinatorPlan>) = match self {
            Self::Bare(ctor) => (std::slice::from_ref(ctor), None),
            Self::Polymorphic { cases, default } => (cases, default.as_ref()),
        };
        head.iter().chain(tail)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypePlan {
    pub name: String,
    pub params: Vec<TypeParam>,
    pub dispatch: Dispatch,
    pub builtin: bool,
}

impl TypePlan {
    pub fn is_polymorphic(&self) -> bool {
        matches!(self.dispatch, Dispatch::Polymorphic { .. })
    }

    /// Payload primitive of builtin types.
    pub fn primitive(&self) -> Option<Primitive> {
        match &self.dispatch {
            Dispatch::Bare(ctor) => ctor.primitive,
            Dispatch::Polymorphic { .. } => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FunctionPlan {
    pub call: CombinatorPlan,
    pub result: ExprPlan,
    /// Written before the result payload when the declared result was flattened.
    pub original_result_magic: Option<u32>,
}

impl FunctionPlan {
    pub fn name(&self) -> &str {
        &self.call.name
    }

    pub fn magic(&self) -> u32 {
        self.call.magic
    }
}

/// All compiled procedures of a schema.
#[derive(Clone, Debug, Default)]
pub struct Program {
    types: Vec<TypePlan>,
    functions: Vec<FunctionPlan>,
    type_names: IndexMap<String, TypeId>,
    function_names: IndexMap<String, FunctionId>,
    function_magics: HashMap<u32, FunctionId>,
}

impl Program {
    pub(crate) fn push_type(&mut self, plan: TypePlan) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.type_names.entry(plan.name.clone()).or_insert(id);
        self.types.push(plan);
        id
    }

    pub(crate) fn push_function(&mut self, plan: FunctionPlan) -> FunctionId {
        let id = FunctionId(self.functions.len() as u32);
        self.function_names
            .entry(plan.name().to_string())
            .or_insert(id);
        self.function_magics.entry(plan.magic()).or_insert(id);
        self.functions.push(plan);
        id
    }

    pub fn type_plan(&self, id: TypeId) -> Option<&TypePlan> {
        self.types.get(id.index())
    }

    pub fn function_plan(&self, id: FunctionId) -> Option<&FunctionPlan> {
        self.functions.get(id.index())
    }

    /// Type lookup; builtins answer to both `int` and `Int`.
    pub fn type_by_name(&self, name: &str) -> Option<TypeId> {
        self.type_names
            .get(name)
            .copied()
            .or_else(|| Primitive::from_name(name).map(TypeId::of_primitive))
    }

    pub fn function_by_name(&self, name: &str) -> Option<FunctionId> {
        self.function_names.get(name).copied()
    }

    pub fn function_by_magic(&self, magic: u32) -> Option<FunctionId> {
        self.function_magics.get(&magic).copied()
    }

    pub fn types(&self) -> impl Iterator<Item = (TypeId, &TypePlan)> {
        self.types
            .iter()
            .enumerate()
            .map(|(i, t)| (TypeId(i as u32), t))
    }

    pub fn functions(&self) -> impl Iterator<Item = (FunctionId, &FunctionPlan)> {
        self.functions
            .iter()
            .enumerate()
            .map(|(i, f)| (FunctionId(i as u32), f))
    }

    pub fn type_name(&self, id: TypeId) -> &str {
        self.type_plan(id).map_or("?", |t| t.name.as_str())
    }
}
