//! Decoder: walks plans and reads host values.

use std::rc::Rc;

use tlcodec_compiler::{CombinatorPlan, Dispatch, ExprPlan, FieldRole, FunctionPlan, Step};
use tlcodec_core::{ParamKind, Primitive, TypeId};
use tlcodec_wire::{MAGIC_SIZE, Reader};

use super::codec::{Ctx, Typing};
use super::encode::{unbound_arg, unbound_count};
use super::error::CodecError;
use super::frame::{Binding, Closure, Env};
use super::value::Value;

type Result<T> = std::result::Result<T, CodecError>;

type Fields = Vec<(String, Value)>;

pub(super) struct Decoder<'e, 'r, 'a> {
    ctx: Ctx<'e>,
    input: &'r mut Reader<'a>,
    depth: u32,
    elements: u32,
}

impl<'e, 'r, 'a> Decoder<'e, 'r, 'a> {
    pub fn new(ctx: Ctx<'e>, input: &'r mut Reader<'a>) -> Self {
        Self {
            ctx,
            input,
            depth: 0,
            elements: 0,
        }
    }

    /// Top-level instance of a type with no generic arguments.
    pub fn value(&mut self, ty: TypeId) -> Result<Value> {
        self.instance(ty, Vec::new())
    }

    /// Read a call's magic and arguments.
    pub fn call(&mut self) -> Result<Value> {
        let magic = self.input.read_magic()?;
        let program = self.ctx.program;
        let function = program
            .function_by_magic(magic)
            .and_then(|id| program.function_plan(id))
            .ok_or_else(|| CodecError::UnknownFunction(format!("#{magic:08x}")))?;
        tracing::trace!(function = %function.name(), magic, "call");
        let (fields, _) = self.call_body(function)?;
        Ok(self.wrap(&function.call, fields, true))
    }

    /// Read a result of `function` in its call frame.
    pub fn result(&mut self, function: &'e FunctionPlan, env: Env<'e>) -> Result<Value> {
        self.result_magic(function)?;
        self.expr(&function.result, &env, function.name())
    }

    fn result_magic(&mut self, function: &FunctionPlan) -> Result<()> {
        let Some(expected) = function.original_result_magic else {
            return Ok(());
        };
        let magic = self.input.read_magic()?;
        if magic != expected {
            return Err(CodecError::UnknownMagic {
                type_name: format!("result of {}", function.name()),
                magic,
            });
        }
        Ok(())
    }

    /// Charge `n` elements to the per-call budget; zero-size items read no input.
    fn take_elements(&mut self, n: u32, field: &str) -> Result<()> {
        let limit = self.ctx.limits.element_limit;
        let total = self.elements.saturating_add(n);
        if total > limit {
            return Err(CodecError::ElementLimitExceeded {
                field: field.to_string(),
                count: n,
                limit,
            });
        }
        self.elements = total;
        Ok(())
    }

    fn enter(&mut self) -> Result<()> {
        self.depth += 1;
        let limit = self.ctx.limits.recursion_limit;
        if self.depth > limit {
            return Err(CodecError::RecursionLimitExceeded(limit));
        }
        Ok(())
    }

    fn call_body(&mut self, function: &'e FunctionPlan) -> Result<(Fields, Env<'e>)> {
        self.enter()?;
        let decoded = self.combinator(Env::for_call(&function.call))?;
        self.depth -= 1;
        Ok(decoded)
    }

    /// Host shape of a decoded constructor; weak records are tagged when
    /// the constructor had to be chosen.
    fn wrap(&self, ctor: &CombinatorPlan, fields: Fields, tagged: bool) -> Value {
        match self.ctx.typing {
            Typing::Strong => Value::Object {
                constructor: ctor.name.clone(),
                fields,
            },
            Typing::Weak if tagged => Value::tagged(&ctor.name, fields),
            Typing::Weak => Value::Record(fields),
        }
    }

    fn instance(&mut self, ty: TypeId, params: Vec<Option<Binding<'e>>>) -> Result<Value> {
        self.enter()?;
        let plan = self
            .ctx
            .program
            .type_plan(ty)
            .ok_or_else(|| CodecError::UnknownType(format!("#{}", ty.0)))?;

        let value = if let Some(p) = plan.primitive() {
            self.primitive(p)?
        } else {
            match &plan.dispatch {
                Dispatch::Bare(ctor) => {
                    let (fields, _) = self.combinator(Env::new(ctor, params))?;
                    self.wrap(ctor, fields, false)
                }
                Dispatch::Polymorphic { cases, default } => {
                    let ctor = self.select(&plan.name, cases, default.as_ref())?;
                    let (fields, _) = self.combinator(Env::new(ctor, params))?;
                    self.wrap(ctor, fields, true)
                }
            }
        };
        self.depth -= 1;
        Ok(value)
    }

    /// Magic switch; a miss falls back to the default with the magic unread.
    fn select(
        &mut self,
        type_name: &str,
        cases: &'e [CombinatorPlan],
        default: Option<&'e CombinatorPlan>,
    ) -> Result<&'e CombinatorPlan> {
        if let Some(default) = default
            && self.input.remaining() < MAGIC_SIZE
        {
            tracing::trace!(ty = type_name, "short input, default constructor");
            return Ok(default);
        }

        let mark = self.input.mark();
        let magic = self.input.read_magic()?;
        if let Some(ctor) = cases.iter().find(|c| c.magic == magic) {
            tracing::trace!(ty = type_name, ctor = %ctor.name, magic, "constructor");
            return Ok(ctor);
        }
        match default {
            Some(default) => {
                self.input.rewind(mark);
                tracing::trace!(ty = type_name, magic, "rewind, default constructor");
                Ok(default)
            }
            None => Err(CodecError::UnknownMagic {
                type_name: type_name.to_string(),
                magic,
            }),
        }
    }

    fn combinator(&mut self, mut env: Env<'e>) -> Result<(Fields, Env<'e>)> {
        let ctor = env.ctor();
        let mut fields = Vec::with_capacity(ctor.steps.len());
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
                Step::Field(field) => {
                    if let Some(gate) = field.gate
                        && !gate.is_open(env.slot(gate.mask_slot).unwrap_or(0))
                    {
                        continue;
                    }
                    let value = self.expr(&field.expr, &env, &field.name)?;
                    if field.capture
                        && let Value::Nat(n) = value
                    {
                        env.set_slot(field.slot, n);
                    }
                    if field.role == FieldRole::Value {
                        fields.push((field.name.clone(), value));
                    }
                }
                Step::Forwarded {
                    name, gate, param, ..
                } => {
                    if let Some(gate) = gate
                        && !gate.is_open(env.slot(gate.mask_slot).unwrap_or(0))
                    {
                        continue;
                    }
                    let (call, binding) = self.forwarded()?;
                    fields.push((name.clone(), call));
                    env.bind_param(*param, binding);
                }
            }
        }
        Ok((fields, env))
    }

    /// Read a nested call and bind its result type.
    fn forwarded(&mut self) -> Result<(Value, Binding<'e>)> {
        let magic = self.input.read_magic()?;
        let function = self.ctx.registry.by_magic(magic).ok_or_else(|| {
            CodecError::UnknownForwardedFunction {
                callee: format!("#{magic:08x}"),
            }
        })?;
        tracing::trace!(callee = %function.name(), magic, "forwarded call");
        let (fields, env) = self.call_body(function)?;
        let call = self.wrap(&function.call, fields, true);
        let binding = Binding::Type(Closure {
            expr: &function.result,
            env: Rc::new(env),
            result_of: Some(function),
        });
        Ok((call, binding))
    }

    fn expr(&mut self, expr: &'e ExprPlan, env: &Env<'e>, field: &str) -> Result<Value> {
        match expr {
            ExprPlan::Named { type_id, args } => {
                let params = env
                    .bind(args)
                    .map_err(|i| unbound_arg(self.ctx, *type_id, i, field))?;
                self.instance(*type_id, params)
            }
            ExprPlan::TypeVar {
                param,
                expected_magic,
            } => match env.param(*param) {
                Some(Binding::Type(closure)) => {
                    if *expected_magic != 0 {
                        tracing::trace!(field, expected = *expected_magic, "generic argument");
                    }
                    if let Some(function) = closure.result_of {
                        self.result_magic(function)?;
                    }
                    self.expr(closure.expr, &closure.env, field)
                }
                _ => Err(CodecError::UnboundParameter {
                    field: field.to_string(),
                    param: env.param_name(*param).to_string(),
                }),
            },
            ExprPlan::Array { item, count } => {
                let n = env
                    .nat(count)
                    .ok_or_else(|| unbound_count(env, count, field))?;
                self.take_elements(n, field)?;
                // Untrusted count: never reserve past the input.
                let mut items = Vec::with_capacity((n as usize).min(self.input.remaining()));
                for _ in 0..n {
                    items.push(self.expr(item, env, field)?);
                }
                Ok(Value::Array(items))
            }
            ExprPlan::NatConst(_) | ExprPlan::NatVar(_) => Err(CodecError::TypeMismatch {
                field: field.to_string(),
                expected: "type",
                found: "#",
            }),
        }
    }

    fn primitive(&mut self, p: Primitive) -> Result<Value> {
        let value = match p {
            Primitive::Nat => Value::Nat(self.input.read_nat()?),
            Primitive::Int => Value::Int(self.input.read_int()?),
            Primitive::Long => Value::Long(self.input.read_long()?),
            Primitive::Double => Value::Double(self.input.read_double()?),
            Primitive::String => Value::String(self.input.read_string()?.to_owned()),
            Primitive::Bytes => Value::Bytes(self.input.read_bytes()?.to_vec()),
        };
        Ok(value)
    }
}
