//! JSON loading for already-parsed schemas.
//!
//! The parser hands over the IR as JSON with names instead of ids. This module
//! resolves names into the ID-indexed [`Schema`], filling in magics and
//! capture flags that the JSON may leave out.

use std::collections::HashMap;

use serde::Deserialize;

use crate::magic;
use crate::{
    Arg, Combinator, FieldMask, Function, ParamKind, Schema, TypeDef, TypeExpr, TypeId, TypeParam,
};

/// Error while loading a schema.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("duplicate type `{0}`")]
    DuplicateType(String),

    #[error("duplicate function `{0}`")]
    DuplicateFunction(String),

    #[error("type `{0}` declares no constructors")]
    EmptyType(String),

    #[error("unknown type `{name}` in `{context}`")]
    UnknownType { name: String, context: String },

    #[error("unknown argument `{name}` in `{context}`")]
    UnknownArg { name: String, context: String },

    #[error("unknown type parameter `{name}` in `{context}`")]
    UnknownParam { name: String, context: String },

    #[error("argument `{arg}` of `{context}` has no type")]
    MissingArgType { arg: String, context: String },

    #[error("invalid magic `{value}` in `{context}`")]
    InvalidMagic { value: String, context: String },
}

impl Schema {
    /// Load a schema from its JSON form.
    pub fn from_json(json: &str) -> Result<Self, SchemaError> {
        let raw: RawSchema = serde_json::from_str(json)?;
        raw.resolve()
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSchema {
    #[serde(default)]
    types: Vec<RawType>,
    #[serde(default)]
    functions: Vec<RawFunction>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawType {
    name: String,
    #[serde(default)]
    params: Option<Vec<RawParam>>,
    constructors: Vec<RawCombinator>,
    #[serde(default)]
    default_constructor: bool,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawParam {
    name: String,
    kind: RawParamKind,
}

#[derive(Clone, Copy, Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum RawParamKind {
    Type,
    Nat,
}

impl From<RawParamKind> for ParamKind {
    fn from(kind: RawParamKind) -> Self {
        match kind {
            RawParamKind::Type => ParamKind::Type,
            RawParamKind::Nat => ParamKind::Nat,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawCombinator {
    name: String,
    #[serde(default)]
    magic: Option<RawMagic>,
    #[serde(default)]
    args: Vec<RawArg>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawFunction {
    name: String,
    #[serde(default)]
    magic: Option<RawMagic>,
    #[serde(default)]
    args: Vec<RawArg>,
    result: RawTypeExpr,
    #[serde(default)]
    original_result_magic: Option<RawMagic>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawArg {
    name: String,
    #[serde(default)]
    index: Option<u32>,
    #[serde(default, rename = "type")]
    type_expr: Option<RawTypeExpr>,
    /// Implicit parameter slot: `{name:Type}` or `{name:#}`.
    #[serde(default)]
    param: Option<RawParamKind>,
    /// Forwarded function: name of the type parameter it binds (`!X`).
    #[serde(default)]
    forward: Option<String>,
    #[serde(default)]
    mask: Option<RawMask>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawMask {
    arg: String,
    bit: u8,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawMagic {
    Number(u32),
    Hex(String),
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawTypeExpr {
    Name(String),
    Nat {
        nat: u32,
    },
    NatVar {
        nat_var: String,
    },
    Var {
        var: String,
    },
    Array {
        array: Box<RawTypeExpr>,
        count: RawCount,
    },
    Named {
        #[serde(rename = "type")]
        name: String,
        #[serde(default)]
        args: Vec<RawTypeExpr>,
    },
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawCount {
    Const(u32),
    Var(String),
}

fn parse_magic(raw: &RawMagic, context: &str) -> Result<u32, SchemaError> {
    match raw {
        RawMagic::Number(n) => Ok(*n),
        RawMagic::Hex(s) => {
            let digits = s
                .strip_prefix("0x")
                .or_else(|| s.strip_prefix('#'))
                .unwrap_or(s);
            u32::from_str_radix(digits, 16).map_err(|_| SchemaError::InvalidMagic {
                value: s.clone(),
                context: context.to_string(),
            })
        }
    }
}

/// Name scope of one combinator during resolution.
struct Names<'a> {
    types: &'a HashMap<String, TypeId>,
    schema: &'a Schema,
    args: &'a [RawArg],
    /// Param name -> (param position, kind).
    params: HashMap<&'a str, (usize, ParamKind)>,
    context: &'a str,
}

impl<'a> Names<'a> {
    fn new(
        types: &'a HashMap<String, TypeId>,
        schema: &'a Schema,
        args: &'a [RawArg],
        context: &'a str,
    ) -> Self {
        let params = args
            .iter()
            .filter_map(|a| a.param.map(|k| (a.name.as_str(), k.into())))
            .enumerate()
            .map(|(pos, (name, kind))| (name, (pos, kind)))
            .collect();
        Self {
            types,
            schema,
            args,
            params,
            context,
        }
    }

    fn type_id(&self, name: &str) -> Result<TypeId, SchemaError> {
        self.types
            .get(name)
            .copied()
            .or_else(|| self.schema.type_by_name(name))
            .ok_or_else(|| SchemaError::UnknownType {
                name: name.to_string(),
                context: self.context.to_string(),
            })
    }

    fn arg(&self, name: &str) -> Result<usize, SchemaError> {
        self.args
            .iter()
            .position(|a| a.name == name)
            .ok_or_else(|| SchemaError::UnknownArg {
                name: name.to_string(),
                context: self.context.to_string(),
            })
    }

    fn type_param(&self, name: &str) -> Result<usize, SchemaError> {
        match self.params.get(name) {
            Some((pos, ParamKind::Type)) => Ok(*pos),
            _ => Err(SchemaError::UnknownParam {
                name: name.to_string(),
                context: self.context.to_string(),
            }),
        }
    }

    fn expr(&self, raw: &RawTypeExpr, child: bool) -> Result<TypeExpr, SchemaError> {
        Ok(match raw {
            RawTypeExpr::Name(name) => {
                if let Ok(pos) = self.type_param(name) {
                    TypeExpr::TypeVar(pos)
                } else if let (true, Ok(arg)) = (child, self.arg(name)) {
                    TypeExpr::NatVar(arg)
                } else {
                    TypeExpr::named(self.type_id(name)?)
                }
            }
            RawTypeExpr::Nat { nat } => TypeExpr::NatConst(*nat),
            RawTypeExpr::NatVar { nat_var } => TypeExpr::NatVar(self.arg(nat_var)?),
            RawTypeExpr::Var { var } => TypeExpr::TypeVar(self.type_param(var)?),
            RawTypeExpr::Array { array, count } => TypeExpr::Array {
                item: Box::new(self.expr(array, false)?),
                multiplicity: Box::new(match count {
                    RawCount::Const(n) => TypeExpr::NatConst(*n),
                    RawCount::Var(name) => TypeExpr::NatVar(self.arg(name)?),
                }),
            },
            RawTypeExpr::Named { name, args } => TypeExpr::Named {
                type_id: self.type_id(name)?,
                children: args
                    .iter()
                    .map(|a| self.expr(a, true))
                    .collect::<Result<_, _>>()?,
            },
        })
    }

    fn combinator(&self, name: &str) -> Result<Combinator, SchemaError> {
        let mut args = Vec::with_capacity(self.args.len());
        for (pos, raw) in self.args.iter().enumerate() {
            let index = raw.index.unwrap_or(pos as u32);
            let mut arg = if let Some(kind) = raw.param {
                let (param, _) = self.params[raw.name.as_str()];
                let type_expr = match kind {
                    RawParamKind::Nat => TypeExpr::primitive(crate::Primitive::Nat),
                    RawParamKind::Type => TypeExpr::TypeVar(param),
                };
                let mut arg = Arg::new(&raw.name, index, type_expr);
                arg.is_type = true;
                arg
            } else if let Some(target) = &raw.forward {
                let param = self.type_param(target)?;
                let mut arg = Arg::new(&raw.name, index, TypeExpr::TypeVar(param));
                arg.is_forwarded_function = true;
                arg
            } else {
                let Some(expr) = &raw.type_expr else {
                    return Err(SchemaError::MissingArgType {
                        arg: raw.name.clone(),
                        context: self.context.to_string(),
                    });
                };
                Arg::new(&raw.name, index, self.expr(expr, false)?)
            };
            if let Some(mask) = &raw.mask {
                arg.mask = Some(FieldMask {
                    arg: self.arg(&mask.arg)?,
                    bit: mask.bit,
                });
            }
            args.push(arg);
        }
        Ok(Combinator {
            name: name.to_string(),
            magic: 0,
            args,
            primitive: None,
        })
    }
}

/// Mark arguments referenced by masks or nat variables as captured.
fn mark_captures(comb: &mut Combinator, extra: Option<&TypeExpr>) {
    let mut captured = vec![false; comb.args.len()];
    for arg in &comb.args {
        if let Some(mask) = arg.mask
            && let Some(slot) = captured.get_mut(mask.arg)
        {
            *slot = true;
        }
        collect_nat_vars(&arg.type_expr, &mut captured);
    }
    if let Some(expr) = extra {
        collect_nat_vars(expr, &mut captured);
    }
    for (arg, captured) in comb.args.iter_mut().zip(captured) {
        arg.captures_named_value |= captured;
    }
}

fn collect_nat_vars(expr: &TypeExpr, captured: &mut [bool]) {
    match expr {
        TypeExpr::NatVar(arg) => {
            if let Some(slot) = captured.get_mut(*arg) {
                *slot = true;
            }
        }
        TypeExpr::Array { item, multiplicity } => {
            collect_nat_vars(item, captured);
            collect_nat_vars(multiplicity, captured);
        }
        TypeExpr::Named { children, .. } => {
            for child in children {
                collect_nat_vars(child, captured);
            }
        }
        TypeExpr::NatConst(_) | TypeExpr::TypeVar(_) => {}
    }
}

impl RawSchema {
    fn resolve(self) -> Result<Schema, SchemaError> {
        let mut schema = Schema::new();

        // Pass 1: assign ids so constructors may reference any declared type.
        let mut type_ids = HashMap::new();
        for (i, raw) in self.types.iter().enumerate() {
            let id = TypeId((schema.type_count() + i) as u32);
            if type_ids.insert(raw.name.clone(), id).is_some()
                || schema.type_by_name(&raw.name).is_some()
            {
                return Err(SchemaError::DuplicateType(raw.name.clone()));
            }
        }

        // Pass 2: resolve constructors.
        let mut pending_magic = Vec::new();
        for raw in &self.types {
            if raw.constructors.is_empty() {
                return Err(SchemaError::EmptyType(raw.name.clone()));
            }
            let mut constructors = Vec::with_capacity(raw.constructors.len());
            for (ci, raw_ctor) in raw.constructors.iter().enumerate() {
                let context = format!("{}.{}", raw.name, raw_ctor.name);
                let names = Names::new(&type_ids, &schema, &raw_ctor.args, &context);
                let mut ctor = names.combinator(&raw_ctor.name)?;
                mark_captures(&mut ctor, None);
                match &raw_ctor.magic {
                    Some(m) => ctor.magic = parse_magic(m, &context)?,
                    None => pending_magic.push((type_ids[&raw.name], ci)),
                }
                constructors.push(ctor);
            }
            let params = match &raw.params {
                Some(params) => params
                    .iter()
                    .map(|p| TypeParam {
                        name: p.name.clone(),
                        kind: p.kind.into(),
                    })
                    .collect(),
                None => constructors[0]
                    .args
                    .iter()
                    .filter_map(|a| {
                        a.param_kind().map(|kind| TypeParam {
                            name: a.name.clone(),
                            kind,
                        })
                    })
                    .collect(),
            };
            schema.push_type(TypeDef {
                name: raw.name.clone(),
                params,
                constructors,
                has_default_constructor: raw.default_constructor,
            });
        }

        let computed: Vec<_> = pending_magic
            .into_iter()
            .map(|(tid, ci)| {
                let def = schema.type_def(tid);
                (tid, ci, magic::constructor_magic(&schema, def, &def.constructors[ci]))
            })
            .collect();
        for (tid, ci, m) in computed {
            schema.types_mut()[tid.index()].constructors[ci].magic = m;
        }

        // Pass 3: functions, once every type is in place.
        for raw in &self.functions {
            if schema.function_by_name(&raw.name).is_some() {
                return Err(SchemaError::DuplicateFunction(raw.name.clone()));
            }
            let names = Names::new(&type_ids, &schema, &raw.args, &raw.name);
            let mut combinator = names.combinator(&raw.name)?;
            let result = names.expr(&raw.result, false)?;
            mark_captures(&mut combinator, Some(&result));
            let original_result_magic = raw
                .original_result_magic
                .as_ref()
                .map(|m| parse_magic(m, &raw.name))
                .transpose()?;
            let mut function = Function {
                combinator,
                result,
                original_result_magic,
            };
            function.combinator.magic = match &raw.magic {
                Some(m) => parse_magic(m, &raw.name)?,
                None => magic::function_magic(&schema, &function),
            };
            schema.push_function(function);
        }

        Ok(schema)
    }
}
