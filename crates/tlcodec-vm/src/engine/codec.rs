//! Engine configuration and the public encode/decode entry points.

use tlcodec_compiler::{FunctionPlan, Program};
use tlcodec_core::TypeId;
use tlcodec_wire::{Reader, Writer};

use super::decode::Decoder;
use super::encode::Encoder;
use super::error::CodecError;
use super::registry::{FunctionRegistry, FunctionTable};
use super::value::Value;

type Result<T> = std::result::Result<T, CodecError>;

/// Host value representation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Typing {
    /// Records keyed by field name; `_` names constructors; numbers coerce.
    #[default]
    Weak,
    /// Objects with explicit constructors; exact kinds; mask presence enforced.
    Strong,
}

/// Runtime limits for one encode or decode call.
#[derive(Clone, Copy, Debug)]
pub struct Limits {
    /// Maximum nesting of types and calls (default: 1,024).
    pub(crate) recursion_limit: u32,
    /// Maximum array elements decoded by one call (default: 4,194,304).
    pub(crate) element_limit: u32,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            recursion_limit: 1024,
            element_limit: 1 << 22,
        }
    }
}

impl Limits {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the recursion limit.
    pub fn recursion_limit(mut self, limit: u32) -> Self {
        self.recursion_limit = limit;
        self
    }

    pub fn get_recursion_limit(&self) -> u32 {
        self.recursion_limit
    }

    /// Set the total number of array elements one decode may produce.
    pub fn element_limit(mut self, limit: u32) -> Self {
        self.element_limit = limit;
        self
    }

    pub fn get_element_limit(&self) -> u32 {
        self.element_limit
    }
}

/// Read-only state shared by every frame of one call.
#[derive(Clone, Copy)]
pub(super) struct Ctx<'e> {
    pub program: &'e Program,
    pub registry: &'e dyn FunctionRegistry,
    pub typing: Typing,
    pub limits: Limits,
}

impl<'e> Ctx<'e> {
    /// Function named by a call value (`_` field or object constructor).
    pub fn function(&self, call: &Value) -> Result<&'e FunctionPlan> {
        let name = call.constructor().ok_or_else(|| CodecError::InvalidConstructor {
            type_name: "function call".to_string(),
            found: call.kind().to_string(),
        })?;
        self.program
            .function_by_name(name)
            .and_then(|id| self.program.function_plan(id))
            .ok_or_else(|| CodecError::UnknownFunction(name.to_string()))
    }
}

/// Builder for [`Engine`].
pub struct EngineBuilder<'p> {
    program: &'p Program,
    registry: Option<Box<dyn FunctionRegistry + 'p>>,
    typing: Typing,
    limits: Limits,
}

impl<'p> EngineBuilder<'p> {
    pub fn new(program: &'p Program) -> Self {
        Self {
            program,
            registry: None,
            typing: Typing::default(),
            limits: Limits::default(),
        }
    }

    pub fn typing(mut self, typing: Typing) -> Self {
        self.typing = typing;
        self
    }

    /// Set the runtime limits.
    pub fn limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Set the recursion limit.
    pub fn recursion_limit(mut self, limit: u32) -> Self {
        self.limits = self.limits.recursion_limit(limit);
        self
    }

    /// Functions accepted as forwarded `!X` arguments.
    ///
    /// Defaults to every function of the program.
    pub fn registry(mut self, registry: impl FunctionRegistry + 'p) -> Self {
        self.registry = Some(Box::new(registry));
        self
    }

    pub fn build(self) -> Engine<'p> {
        let program = self.program;
        Engine {
            program,
            registry: self
                .registry
                .unwrap_or_else(|| Box::new(FunctionTable::all(program))),
            typing: self.typing,
            limits: self.limits,
        }
    }
}

/// Encodes and decodes values by walking a compiled [`Program`].
///
/// The engine holds no per-call state: every call gets fresh frames, so one
/// engine serves any number of sequential calls.
pub struct Engine<'p> {
    program: &'p Program,
    registry: Box<dyn FunctionRegistry + 'p>,
    typing: Typing,
    limits: Limits,
}

impl<'p> Engine<'p> {
    pub fn builder(program: &'p Program) -> EngineBuilder<'p> {
        EngineBuilder::new(program)
    }

    /// Weakly typed engine with default limits and every function forwardable.
    pub fn new(program: &'p Program) -> Self {
        Self::builder(program).build()
    }

    pub fn program(&self) -> &'p Program {
        self.program
    }

    pub fn typing(&self) -> Typing {
        self.typing
    }

    fn ctx(&self) -> Ctx<'_> {
        Ctx {
            program: self.program,
            registry: &*self.registry,
            typing: self.typing,
            limits: self.limits,
        }
    }

    fn type_id(&self, name: &str) -> Result<TypeId> {
        self.program
            .type_by_name(name)
            .ok_or_else(|| CodecError::UnknownType(name.to_string()))
    }

    /// Runs an encode step; on failure the writer is cut back to where it started.
    fn guarded<'s>(
        &'s self,
        out: &mut Writer,
        f: impl FnOnce(&mut Encoder<'s, '_>) -> Result<()>,
    ) -> Result<()> {
        let start = out.len();
        let result = f(&mut Encoder::new(self.ctx(), out));
        if result.is_err() {
            out.truncate(start);
        }
        result
    }

    /// Encode `value` as an instance of `ty`.
    pub fn encode(&self, ty: TypeId, value: &Value, out: &mut Writer) -> Result<()> {
        self.guarded(out, |enc| enc.value(ty, value))
    }

    /// Decode one instance of `ty`.
    pub fn decode(&self, ty: TypeId, input: &mut Reader<'_>) -> Result<Value> {
        Decoder::new(self.ctx(), input).value(ty)
    }

    pub fn encode_named(&self, type_name: &str, value: &Value, out: &mut Writer) -> Result<()> {
        self.encode(self.type_id(type_name)?, value, out)
    }

    pub fn decode_named(&self, type_name: &str, input: &mut Reader<'_>) -> Result<Value> {
        self.decode(self.type_id(type_name)?, input)
    }

    /// Encode a function call: its magic, then its arguments.
    ///
    /// The function is named by the value's constructor.
    pub fn encode_call(&self, call: &Value, out: &mut Writer) -> Result<()> {
        let ctx = self.ctx();
        let function = ctx.function(call)?;
        self.guarded(out, |enc| enc.call(function, call).map(drop))
    }

    /// Decode a function call, dispatching on its magic.
    pub fn decode_call(&self, input: &mut Reader<'_>) -> Result<Value> {
        Decoder::new(self.ctx(), input).call()
    }

    /// Encode the result of `call`.
    pub fn encode_result(&self, call: &Value, result: &Value, out: &mut Writer) -> Result<()> {
        let ctx = self.ctx();
        let function = ctx.function(call)?;
        let mut scratch = Writer::new();
        let env = Encoder::new(ctx, &mut scratch).call(function, call)?;
        self.guarded(out, |enc| enc.result(function, env, result))
    }

    /// Decode the result of `call`.
    pub fn decode_result(&self, call: &Value, input: &mut Reader<'_>) -> Result<Value> {
        let ctx = self.ctx();
        let function = ctx.function(call)?;
        let mut scratch = Writer::new();
        let env = Encoder::new(ctx, &mut scratch).call(function, call)?;
        Decoder::new(ctx, input).result(function, env)
    }
}
