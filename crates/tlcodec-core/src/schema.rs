//! Schema IR: types, combinators, arguments and type expressions.
//!
//! Built once by the loader and read-only afterwards. Every cross reference is
//! an index (`TypeId`, argument position, parameter position), so the whole
//! schema is `Send + Sync` and can be shared by parallel generation passes.

use std::collections::HashMap;

use indexmap::IndexMap;

use crate::Primitive;

/// Index of a TypeDef inside a [`Schema`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct TypeId(pub u32);

impl TypeId {
    pub const NAT: Self = Self(Primitive::Nat as u32);
    pub const INT: Self = Self(Primitive::Int as u32);
    pub const LONG: Self = Self(Primitive::Long as u32);
    pub const DOUBLE: Self = Self(Primitive::Double as u32);
    pub const STRING: Self = Self(Primitive::String as u32);
    pub const BYTES: Self = Self(Primitive::Bytes as u32);

    /// Builtin TypeId of a primitive.
    pub fn of_primitive(p: Primitive) -> Self {
        Self(p as u32)
    }

    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Index of a Function inside a [`Schema`].
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
pub struct FunctionId(pub u32);

impl FunctionId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Kind of a generic parameter.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum ParamKind {
    /// `{t:Type}` - bound to a type expression.
    Type,
    /// `{n:#}` - bound to a natural number.
    Nat,
}

/// Declared generic parameter of a TypeDef.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeParam {
    pub name: String,
    pub kind: ParamKind,
}

/// Type expression tree (closed variant set).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeExpr {
    /// Literal natural; compile-time constant, never on the wire.
    NatConst(u32),
    /// Captured natural, referenced by argument position in the enclosing combinator.
    NatVar(usize),
    /// Generic parameter slot, referenced by parameter position.
    TypeVar(usize),
    /// `multiplicity*[ item ]`.
    Array {
        item: Box<TypeExpr>,
        multiplicity: Box<TypeExpr>,
    },
    /// Reference to another type, with its generic arguments.
    Named {
        type_id: TypeId,
        children: Vec<TypeExpr>,
    },
}

impl TypeExpr {
    /// Reference to a type without generic arguments.
    pub fn named(type_id: TypeId) -> Self {
        Self::Named {
            type_id,
            children: Vec::new(),
        }
    }

    /// Reference to a builtin primitive.
    pub fn primitive(p: Primitive) -> Self {
        Self::named(TypeId::of_primitive(p))
    }

    /// Whether this expression denotes a natural rather than a type.
    pub fn is_nat_expr(&self) -> bool {
        matches!(self, Self::NatConst(_) | Self::NatVar(_))
    }

    /// Whether this expression references the builtin `#` type.
    pub fn is_nat_type(&self) -> bool {
        matches!(self, Self::Named { type_id, .. } if *type_id == TypeId::NAT)
    }
}

/// Field-mask gate of an optional argument: present iff `mask & (1 << bit) != 0`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldMask {
    /// Position of the argument holding the mask integer.
    pub arg: usize,
    pub bit: u8,
}

/// One argument of a constructor or function.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Arg {
    pub name: String,
    /// Wire field id used by weakly typed representations.
    pub index: u32,
    /// For implicit params: `TypeVar(own position)` for `{t:Type}`, `#` for `{n:#}`.
    pub type_expr: TypeExpr,
    pub mask: Option<FieldMask>,
    /// Generic parameter slot (`{t:Type}` / `{n:#}`), never on the wire.
    pub is_type: bool,
    /// `!X` - carries an arbitrary nested function call.
    pub is_forwarded_function: bool,
    /// Decoded value is kept for a later array length or mask test.
    pub captures_named_value: bool,
}

impl Arg {
    /// Explicit argument of the given type.
    pub fn new(name: impl Into<String>, index: u32, type_expr: TypeExpr) -> Self {
        Self {
            name: name.into(),
            index,
            type_expr,
            mask: None,
            is_type: false,
            is_forwarded_function: false,
            captures_named_value: false,
        }
    }

    pub fn is_optional(&self) -> bool {
        self.mask.is_some()
    }

    /// Parameter kind for implicit arguments, `None` for wire arguments.
    pub fn param_kind(&self) -> Option<ParamKind> {
        if !self.is_type {
            return None;
        }
        if self.type_expr.is_nat_type() {
            Some(ParamKind::Nat)
        } else {
            Some(ParamKind::Type)
        }
    }
}

/// Shape shared by constructors and functions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Combinator {
    pub name: String,
    pub magic: u32,
    pub args: Vec<Arg>,
    /// Builtin constructors carry a wire primitive instead of arguments.
    pub primitive: Option<Primitive>,
}

impl Combinator {
    /// Positions of the implicit parameter arguments, in parameter order.
    pub fn param_args(&self) -> impl Iterator<Item = usize> + '_ {
        self.args
            .iter()
            .enumerate()
            .filter(|(_, a)| a.is_type)
            .map(|(i, _)| i)
    }

    /// Argument position of the parameter at `param` position.
    pub fn param_arg(&self, param: usize) -> Option<usize> {
        self.param_args().nth(param)
    }
}

/// A schema type with its constructors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeDef {
    pub name: String,
    pub params: Vec<TypeParam>,
    /// Declaration order; the default constructor, when flagged, is last.
    pub constructors: Vec<Combinator>,
    pub has_default_constructor: bool,
}

impl TypeDef {
    pub fn is_polymorphic(&self) -> bool {
        self.constructors.len() > 1
    }

    /// The designated constructor whose magic is never written.
    pub fn default_constructor(&self) -> Option<&Combinator> {
        if self.has_default_constructor {
            self.constructors.last()
        } else {
            None
        }
    }

    /// Primitive payload of builtin types.
    pub fn primitive(&self) -> Option<Primitive> {
        match self.constructors.as_slice() {
            [only] => only.primitive,
            _ => None,
        }
    }

    /// Namespace of the type (`messages` for `messages.Chats`).
    pub fn namespace(&self) -> Option<&str> {
        namespace_of(&self.name)
    }
}

/// A callable schema entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Function {
    pub combinator: Combinator,
    pub result: TypeExpr,
    /// Wire magic of the declared result when the parser flattened it.
    pub original_result_magic: Option<u32>,
}

impl Function {
    pub fn name(&self) -> &str {
        &self.combinator.name
    }

    pub fn magic(&self) -> u32 {
        self.combinator.magic
    }

    pub fn namespace(&self) -> Option<&str> {
        namespace_of(&self.combinator.name)
    }
}

/// Prefix before the last `.`, if any.
pub fn namespace_of(name: &str) -> Option<&str> {
    name.rfind('.').map(|i| &name[..i])
}

/// Immutable, ID-indexed schema.
#[derive(Clone, Debug)]
pub struct Schema {
    types: Vec<TypeDef>,
    functions: Vec<Function>,
    type_names: IndexMap<String, TypeId>,
    function_names: IndexMap<String, FunctionId>,
    function_magics: HashMap<u32, FunctionId>,
}

impl Default for Schema {
    fn default() -> Self {
        Self::new()
    }
}

impl Schema {
    /// Schema holding only the builtin primitive types.
    pub fn new() -> Self {
        let mut schema = Self {
            types: Vec::new(),
            functions: Vec::new(),
            type_names: IndexMap::new(),
            function_names: IndexMap::new(),
            function_magics: HashMap::new(),
        };
        for p in Primitive::ALL {
            let mut ctor = Combinator {
                name: p.tl_name().to_string(),
                magic: 0,
                args: Vec::new(),
                primitive: Some(p),
            };
            ctor.magic = crate::magic::builtin_magic(p);
            schema.push_type(TypeDef {
                name: p.type_name().to_string(),
                params: Vec::new(),
                constructors: vec![ctor],
                has_default_constructor: false,
            });
        }
        schema
    }

    /// Append a type. Later lookups by name return the first registration.
    pub fn push_type(&mut self, def: TypeDef) -> TypeId {
        let id = TypeId(self.types.len() as u32);
        self.type_names.entry(def.name.clone()).or_insert(id);
        self.types.push(def);
        id
    }

    /// Append a function and index it by name and magic.
    pub fn push_function(&mut self, function: Function) -> FunctionId {
        let id = FunctionId(self.functions.len() as u32);
        self.function_names
            .entry(function.name().to_string())
            .or_insert(id);
        self.function_magics.entry(function.magic()).or_insert(id);
        self.functions.push(function);
        id
    }

    /// Loader access for back-filling computed magics.
    pub(crate) fn types_mut(&mut self) -> &mut [TypeDef] {
        &mut self.types
    }

    /// Get a type by id.
    ///
    /// # Panics
    /// Panics if the id was not produced by this schema.
    #[inline]
    pub fn type_def(&self, id: TypeId) -> &TypeDef {
        &self.types[id.index()]
    }

    #[inline]
    pub fn get_type(&self, id: TypeId) -> Option<&TypeDef> {
        self.types.get(id.index())
    }

    /// Get a function by id.
    ///
    /// # Panics
    /// Panics if the id was not produced by this schema.
    #[inline]
    pub fn function(&self, id: FunctionId) -> &Function {
        &self.functions[id.index()]
    }

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

    /// Iterate all types, builtins first.
    pub fn types(&self) -> impl Iterator<Item = (TypeId, &TypeDef)> {
        self.types
            .iter()
            .enumerate()
            .map(|(i, t)| (TypeId(i as u32), t))
    }

    /// Iterate declared (non-builtin) types.
    pub fn declared_types(&self) -> impl Iterator<Item = (TypeId, &TypeDef)> {
        self.types().skip(Primitive::ALL.len())
    }

    pub fn functions(&self) -> impl Iterator<Item = (FunctionId, &Function)> {
        self.functions
            .iter()
            .enumerate()
            .map(|(i, f)| (FunctionId(i as u32), f))
    }

    pub fn type_count(&self) -> usize {
        self.types.len()
    }

    pub fn function_count(&self) -> usize {
        self.functions.len()
    }

    /// Whether the id refers to one of the builtin primitive types.
    pub fn is_builtin(&self, id: TypeId) -> bool {
        id.index() < Primitive::ALL.len()
    }
}
