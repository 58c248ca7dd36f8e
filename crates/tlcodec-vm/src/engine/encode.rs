//! Encoder: walks plans and writes host values.

use std::rc::Rc;

use tlcodec_compiler::{
    CombinatorPlan, Dispatch, ExprPlan, FieldRole, FieldStep, FunctionPlan, Gate, Step,
};
use tlcodec_core::{ParamKind, Primitive, TypeId};
use tlcodec_wire::Writer;

use super::codec::{Ctx, Typing};
use super::coerce;
use super::error::CodecError;
use super::frame::{Binding, Closure, Env};
use super::value::Value;

type Result<T> = std::result::Result<T, CodecError>;

type Fields = [(String, Value)];

pub(super) struct Encoder<'e, 'w> {
    ctx: Ctx<'e>,
    out: &'w mut Writer,
    depth: u32,
}

impl<'e, 'w> Encoder<'e, 'w> {
    pub fn new(ctx: Ctx<'e>, out: &'w mut Writer) -> Self {
        Self { ctx, out, depth: 0 }
    }

    /// Top-level instance of a type with no generic arguments.
    pub fn value(&mut self, ty: TypeId, value: &Value) -> Result<()> {
        let field = self.ctx.program.type_name(ty);
        self.instance(ty, Vec::new(), value, field)
    }

    /// Write a call's magic and arguments; returns the call frame.
    pub fn call(&mut self, function: &'e FunctionPlan, call: &Value) -> Result<Env<'e>> {
        self.enter()?;
        let fields = self.fields_of(&function.call, call)?;
        self.out.write_magic(function.magic());
        let env = self.combinator(Env::for_call(&function.call), fields)?;
        self.depth -= 1;
        Ok(env)
    }

    /// Write a result of `function` evaluated in its call frame.
    pub fn result(
        &mut self,
        function: &'e FunctionPlan,
        env: Env<'e>,
        value: &Value,
    ) -> Result<()> {
        if let Some(magic) = function.original_result_magic {
            self.out.write_magic(magic);
        }
        self.expr(&function.result, &env, value, function.name())
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        let limit = self.ctx.limits.recursion_limit;
        if self.depth > limit {
            return Err(CodecError::RecursionLimitExceeded(limit));
        }
        Ok(())
    }

    fn instance(
        &mut self,
        ty: TypeId,
        params: Vec<Option<Binding<'e>>>,
        value: &Value,
        field: &str,
    ) -> Result<()> {
        self.enter()?;
        let plan = self
            .ctx
            .program
            .type_plan(ty)
            .ok_or_else(|| CodecError::UnknownType(format!("#{}", ty.0)))?;

        if let Some(p) = plan.primitive() {
            self.primitive(p, value, field)?;
            self.depth -= 1;
            return Ok(());
        }

        let typing = self.ctx.typing;
        let invalid = || CodecError::InvalidConstructor {
            type_name: plan.name.clone(),
            found: constructor_name(typing, value)
                .unwrap_or(value.kind())
                .to_string(),
        };
        match &plan.dispatch {
            Dispatch::Bare(ctor) => {
                let named = constructor_name(typing, value) == Some(ctor.name.as_str());
                if typing == Typing::Strong && !named {
                    return Err(invalid());
                }
                self.constructor(ctor, params, value)?;
            }
            Dispatch::Polymorphic { cases, default } => {
                let name = constructor_name(typing, value).ok_or_else(invalid)?;
                if let Some(ctor) = cases.iter().find(|c| c.name == name) {
                    tracing::trace!(
                        ty = %plan.name,
                        ctor = %ctor.name,
                        magic = ctor.magic,
                        "constructor"
                    );
                    self.out.write_magic(ctor.magic);
                    self.constructor(ctor, params, value)?;
                } else if let Some(ctor) = default.as_ref().filter(|c| c.name == name) {
                    tracing::trace!(ty = %plan.name, ctor = %ctor.name, "default constructor");
                    self.constructor(ctor, params, value)?;
                } else {
                    return Err(invalid());
                }
            }
        }
        self.depth -= 1;
        Ok(())
    }

    fn fields_of<'v>(&self, ctor: &CombinatorPlan, value: &'v Value) -> Result<&'v Fields> {
        let fields = match (self.ctx.typing, value) {
            (Typing::Strong, Value::Object { fields, .. }) => Some(fields.as_slice()),
            (Typing::Strong, _) => None,
            (Typing::Weak, _) => value.fields(),
        };
        fields.ok_or_else(|| CodecError::InvalidConstructor {
            type_name: ctor.name.clone(),
            found: value.kind().to_string(),
        })
    }

    fn constructor(
        &mut self,
        ctor: &'e CombinatorPlan,
        params: Vec<Option<Binding<'e>>>,
        value: &Value,
    ) -> Result<Env<'e>> {
        let fields = self.fields_of(ctor, value)?;
        self.combinator(Env::new(ctor, params), fields)
    }

    fn combinator(&mut self, mut env: Env<'e>, fields: &Fields) -> Result<Env<'e>> {
        let ctor = env.ctor();
        for step in &ctor.steps {
            match step {
                Step::Param {
                    slot,
                    param,
                    kind: ParamKind::Nat,
                } => match env.param(*param) {
                    Some(Binding::Nat(n)) => {
                        let n = *n;
                        env.set_slot(*slot, n);
                    }
                    _ => {
                        return Err(CodecError::UnboundParameter {
                            field: ctor.name.clone(),
                            param: env.param_name(*param).to_string(),
                        });
                    }
                },
                Step::Param { .. } => {}
                Step::Field(field) => self.field(&mut env, field, fields)?,
                Step::Forwarded {
                    name,
                    index,
                    gate,
                    param,
                    ..
                } => {
                    let Some(call) = self.present(&env, name, *index, *gate, fields)? else {
                        continue;
                    };
                    let binding = self.forwarded(call)?;
                    env.bind_param(*param, binding);
                }
            }
        }
        Ok(env)
    }

    /// Host value of an argument, honoring its gate; `None` when the gate is closed.
    fn present<'v>(
        &self,
        env: &Env<'e>,
        name: &str,
        index: u32,
        gate: Option<Gate>,
        fields: &'v Fields,
    ) -> Result<Option<&'v Value>> {
        let value = lookup(fields, name, index, self.ctx.typing);
        let missing = || CodecError::MissingRequiredField {
            constructor: env.ctor().name.clone(),
            field: name.to_string(),
        };
        let Some(gate) = gate else {
            return value.map(Some).ok_or_else(missing);
        };
        let open = gate.is_open(env.slot(gate.mask_slot).unwrap_or(0));
        match (open, value) {
            (true, Some(v)) => Ok(Some(v)),
            (true, None) => Err(missing()),
            (false, Some(_)) if self.ctx.typing == Typing::Strong => Err(missing()),
            (false, _) => Ok(None),
        }
    }

    fn field(&mut self, env: &mut Env<'e>, field: &'e FieldStep, fields: &Fields) -> Result<()> {
        if let FieldRole::LengthOf { array_slot } = field.role {
            let len = array_len(env, array_slot, fields, self.ctx.typing);
            self.out.write_nat(len);
            env.set_slot(field.slot, len);
            return Ok(());
        }

        let Some(value) = self.present(env, &field.name, field.index, field.gate, fields)? else {
            return Ok(());
        };
        self.expr(&field.expr, env, value, &field.name)?;
        if field.capture
            && let Ok(n) = coerce::nat(value, self.ctx.typing, &field.name)
        {
            env.set_slot(field.slot, n);
        }
        Ok(())
    }

    /// Encode a nested call and bind its result type.
    fn forwarded(&mut self, call: &Value) -> Result<Binding<'e>> {
        let callee = constructor_name(self.ctx.typing, call).ok_or_else(|| {
            CodecError::InvalidConstructor {
                type_name: "forwarded call".to_string(),
                found: call.kind().to_string(),
            }
        })?;
        let function = self
            .ctx
            .registry
            .by_name(callee)
            .ok_or_else(|| CodecError::UnknownForwardedFunction {
                callee: callee.to_string(),
            })?;
        tracing::trace!(callee = %function.name(), magic = function.magic(), "forwarded call");
        let env = self.call(function, call)?;
        Ok(Binding::Type(Closure {
            expr: &function.result,
            env: Rc::new(env),
            result_of: Some(function),
        }))
    }

    fn expr(
        &mut self,
        expr: &'e ExprPlan,
        env: &Env<'e>,
        value: &Value,
        field: &str,
    ) -> Result<()> {
        match expr {
            ExprPlan::Named { type_id, args } => {
                let params = env
                    .bind(args)
                    .map_err(|i| unbound_arg(self.ctx, *type_id, i, field))?;
                self.instance(*type_id, params, value, field)
            }
            ExprPlan::TypeVar {
                param,
                expected_magic,
            } => match env.param(*param) {
                Some(Binding::Type(closure)) => {
                    if *expected_magic != 0 {
                        tracing::trace!(field, expected = *expected_magic, "generic argument");
                    }
                    if let Some(magic) = closure.result_of.and_then(|f| f.original_result_magic) {
                        self.out.write_magic(magic);
                    }
                    self.expr(closure.expr, &closure.env, value, field)
                }
                _ => Err(CodecError::UnboundParameter {
                    field: field.to_string(),
                    param: env.param_name(*param).to_string(),
                }),
            },
            ExprPlan::Array { item, count } => {
                let Value::Array(items) = value else {
                    return Err(CodecError::TypeMismatch {
                        field: field.to_string(),
                        expected: "array",
                        found: value.kind(),
                    });
                };
                let expected = env.nat(count).ok_or_else(|| unbound_count(env, count, field))?;
                if items.len() != expected as usize {
                    return Err(CodecError::ArrayLengthMismatch {
                        field: field.to_string(),
                        expected,
                        actual: items.len(),
                    });
                }
                for element in items {
                    self.expr(item, env, element, field)?;
                }
                Ok(())
            }
            ExprPlan::NatConst(_) | ExprPlan::NatVar(_) => Err(CodecError::TypeMismatch {
                field: field.to_string(),
                expected: "type",
                found: value.kind(),
            }),
        }
    }

    fn primitive(&mut self, p: Primitive, value: &Value, field: &str) -> Result<()> {
        let typing = self.ctx.typing;
        match p {
            Primitive::Nat => self.out.write_nat(coerce::nat(value, typing, field)?),
            Primitive::Int => self.out.write_int(coerce::int(value, typing, field)?),
            Primitive::Long => self.out.write_long(coerce::long(value, typing, field)?),
            Primitive::Double => self.out.write_double(coerce::double(value, typing, field)?),
            Primitive::String => self.out.write_string(coerce::string(value, typing, field)?)?,
            Primitive::Bytes => self.out.write_bytes(&coerce::bytes(value, typing, field)?)?,
        }
        Ok(())
    }
}

/// Constructor named by a value under the active typing.
pub(super) fn constructor_name(typing: Typing, value: &Value) -> Option<&str> {
    match (typing, value) {
        (Typing::Strong, Value::Object { constructor, .. }) => Some(constructor),
        (Typing::Strong, _) => None,
        (Typing::Weak, _) => value.constructor(),
    }
}

/// Field lookup by name; weak records may also key a field by its index.
fn lookup<'v>(fields: &'v Fields, name: &str, index: u32, typing: Typing) -> Option<&'v Value> {
    let by_index = || match typing {
        Typing::Weak => fields
            .iter()
            .find(|(k, _)| k.parse::<u32>().is_ok_and(|i| i == index)),
        Typing::Strong => None,
    };
    fields
        .iter()
        .find(|(k, _)| k == name)
        .or_else(by_index)
        .map(|(_, v)| v)
}

/// Length of the array a count prefix describes; absent or gated-off arrays count as empty.
fn array_len(env: &Env<'_>, array_slot: usize, fields: &Fields, typing: Typing) -> u32 {
    let Some(array) = env.ctor().fields().find(|f| f.slot == array_slot) else {
        return 0;
    };
    if let Some(gate) = array.gate
        && !gate.is_open(env.slot(gate.mask_slot).unwrap_or(0))
    {
        return 0;
    }
    match lookup(fields, &array.name, array.index, typing) {
        Some(Value::Array(items)) => u32::try_from(items.len()).unwrap_or(u32::MAX),
        _ => 0,
    }
}

pub(super) fn unbound_arg(ctx: Ctx<'_>, ty: TypeId, arg: usize, field: &str) -> CodecError {
    let param = ctx
        .program
        .type_plan(ty)
        .and_then(|plan| plan.params.get(arg))
        .map_or_else(|| format!("#{arg}"), |p| p.name.clone());
    CodecError::UnboundParameter {
        field: field.to_string(),
        param,
    }
}

pub(super) fn unbound_count(env: &Env<'_>, count: &ExprPlan, field: &str) -> CodecError {
    let param = match count {
        ExprPlan::NatVar(slot) => env.slot_name(*slot).to_string(),
        _ => "count".to_string(),
    };
    CodecError::UnboundParameter {
        field: field.to_string(),
        param,
    }
}
