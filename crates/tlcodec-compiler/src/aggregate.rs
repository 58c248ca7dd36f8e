//! ModuleAggregator: groups reachable types and functions into units.
//!
//! A unit is one namespace (`messages` for `messages.getHistory`); names
//! without a namespace land in [`ROOT_NAMESPACE`]. Units are handed to a
//! [`UnitSink`] so that each unit comes after the units it depends on,
//! except inside dependency cycles, where declaration-name order decides.

use std::collections::{BTreeMap, BTreeSet};

use tlcodec_core::{FunctionId, Schema, TypeExpr, TypeId, namespace_of};

use crate::plan::Program;

/// Namespace of names without a `.` prefix.
pub const ROOT_NAMESPACE: &str = "common";

/// One compilation unit.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Unit {
    pub namespace: String,
    pub types: Vec<TypeId>,
    pub functions: Vec<FunctionId>,
    /// Other units referenced by this one, sorted.
    pub dependencies: Vec<String>,
}

/// Receives finished units.
pub trait UnitSink {
    type Error;

    fn emit_unit(&mut self, program: &Program, unit: &Unit) -> Result<(), Self::Error>;
}

impl<F, E> UnitSink for F
where
    F: FnMut(&Program, &Unit) -> Result<(), E>,
{
    type Error = E;

    fn emit_unit(&mut self, program: &Program, unit: &Unit) -> Result<(), E> {
        self(program, unit)
    }
}

pub struct Aggregator<'s> {
    schema: &'s Schema,
    roots: Vec<TypeId>,
}

fn unit_name(name: &str) -> &str {
    namespace_of(name).unwrap_or(ROOT_NAMESPACE)
}

impl<'s> Aggregator<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Self {
            schema,
            roots: Vec::new(),
        }
    }

    /// Keep `ty` (and what it references) even if no function mentions it.
    pub fn with_root(mut self, ty: TypeId) -> Self {
        self.roots.push(ty);
        self
    }

    /// Declared types reachable from the functions and extra roots, by id.
    pub fn reachable_types(&self) -> Vec<TypeId> {
        let mut seen = vec![false; self.schema.type_count()];
        let mut stack = Vec::new();

        for &root in &self.roots {
            stack.push(root);
        }
        for (_, function) in self.schema.functions() {
            for arg in &function.combinator.args {
                collect_types(&arg.type_expr, &mut stack);
            }
            collect_types(&function.result, &mut stack);
        }

        while let Some(id) = stack.pop() {
            let Some(slot) = seen.get_mut(id.index()) else {
                continue;
            };
            if std::mem::replace(slot, true) {
                continue;
            }
            for ctor in &self.schema.type_def(id).constructors {
                for arg in &ctor.args {
                    collect_types(&arg.type_expr, &mut stack);
                }
            }
        }

        seen.iter()
            .enumerate()
            .filter(|&(i, &reached)| reached && !self.schema.is_builtin(TypeId(i as u32)))
            .map(|(i, _)| TypeId(i as u32))
            .collect()
    }

    /// Units in emission order.
    pub fn units(&self) -> Vec<Unit> {
        let mut units: BTreeMap<String, (Unit, BTreeSet<String>)> = BTreeMap::new();
        let mut refs = Vec::new();

        for id in self.reachable_types() {
            let def = self.schema.type_def(id);
            let ns = unit_name(&def.name);
            refs.clear();
            for ctor in &def.constructors {
                for arg in &ctor.args {
                    collect_types(&arg.type_expr, &mut refs);
                }
            }
            let (unit, deps) = units.entry(ns.to_string()).or_default();
            unit.types.push(id);
            self.add_dependencies(ns, &refs, deps);
        }

        for (id, function) in self.schema.functions() {
            let ns = unit_name(function.name());
            refs.clear();
            for arg in &function.combinator.args {
                collect_types(&arg.type_expr, &mut refs);
            }
            collect_types(&function.result, &mut refs);
            let (unit, deps) = units.entry(ns.to_string()).or_default();
            unit.functions.push(id);
            self.add_dependencies(ns, &refs, deps);
        }

        let mut pending: Vec<Unit> = units
            .into_iter()
            .map(|(namespace, (unit, deps))| Unit {
                namespace,
                dependencies: deps.into_iter().collect(),
                ..unit
            })
            .collect();

        let mut ordered = Vec::with_capacity(pending.len());
        let mut emitted = BTreeSet::new();
        while !pending.is_empty() {
            let next = pending
                .iter()
                .position(|u| u.dependencies.iter().all(|d| emitted.contains(d)))
                .unwrap_or(0);
            let unit = pending.remove(next);
            emitted.insert(unit.namespace.clone());
            ordered.push(unit);
        }
        ordered
    }

    fn add_dependencies(&self, own: &str, refs: &[TypeId], deps: &mut BTreeSet<String>) {
        for &id in refs {
            if self.schema.is_builtin(id) {
                continue;
            }
            let Some(def) = self.schema.get_type(id) else {
                continue;
            };
            let ns = unit_name(&def.name);
            if ns != own {
                deps.insert(ns.to_string());
            }
        }
    }

    /// Hand every unit to `sink`; stops at the first sink error.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn emit<S: UnitSink>(&self, program: &Program, sink: &mut S) -> Result<usize, S::Error> {
        let units = self.units();
        for unit in &units {
            tracing::debug!(
                namespace = %unit.namespace,
                types = unit.types.len(),
                functions = unit.functions.len(),
                "emit unit"
            );
            sink.emit_unit(program, unit)?;
        }
        Ok(units.len())
    }
}

fn collect_types(expr: &TypeExpr, out: &mut Vec<TypeId>) {
    match expr {
        TypeExpr::NatConst(_) | TypeExpr::NatVar(_) | TypeExpr::TypeVar(_) => {}
        TypeExpr::Array { item, multiplicity } => {
            collect_types(item, out);
            collect_types(multiplicity, out);
        }
        TypeExpr::Named { type_id, children } => {
            out.push(*type_id);
            for child in children {
                collect_types(child, out);
            }
        }
    }
}
