//! Lookup of functions that may appear as forwarded `!X` arguments.

use std::collections::HashSet;

use tlcodec_compiler::{FunctionPlan, Program};
use tlcodec_core::FunctionId;

/// Resolves nested calls carried by forwarded arguments.
pub trait FunctionRegistry {
    fn by_name(&self, name: &str) -> Option<&FunctionPlan>;
    fn by_magic(&self, magic: u32) -> Option<&FunctionPlan>;
}

/// Registry backed by a program's functions, optionally restricted.
#[derive(Clone, Debug)]
pub struct FunctionTable<'p> {
    program: &'p Program,
    allowed: Option<HashSet<FunctionId>>,
}

impl<'p> FunctionTable<'p> {
    /// Every function of `program` may be forwarded.
    pub fn all(program: &'p Program) -> Self {
        Self {
            program,
            allowed: None,
        }
    }

    /// Only the named functions may be forwarded; unknown names are ignored.
    pub fn only<'n>(program: &'p Program, names: impl IntoIterator<Item = &'n str>) -> Self {
        let allowed = names
            .into_iter()
            .filter_map(|name| program.function_by_name(name))
            .collect();
        Self {
            program,
            allowed: Some(allowed),
        }
    }

    fn lookup(&self, id: Option<FunctionId>) -> Option<&'p FunctionPlan> {
        let id = id?;
        if let Some(allowed) = &self.allowed
            && !allowed.contains(&id)
        {
            return None;
        }
        self.program.function_plan(id)
    }
}

impl FunctionRegistry for FunctionTable<'_> {
    fn by_name(&self, name: &str) -> Option<&FunctionPlan> {
        self.lookup(self.program.function_by_name(name))
    }

    fn by_magic(&self, magic: u32) -> Option<&FunctionPlan> {
        self.lookup(self.program.function_by_magic(magic))
    }
}
