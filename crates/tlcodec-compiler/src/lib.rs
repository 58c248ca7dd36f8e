//! Codec plan generation for TL schemas.
//!
//! Pipeline:
//! - `verify` - schema invariants, all violations collected
//! - `expr` - TypeExprCodec, one plan node per type-expression node
//! - `combinator` - CombinatorCodec, one procedure per constructor/function
//! - `type_codec` - TypeCodec, bare forwarding or magic switch per type
//! - `aggregate` - ModuleAggregator, namespace units and their dependencies
//! - `dump` - text rendering of the compiled procedures

#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod aggregate;
mod combinator;
pub mod dump;
mod error;
mod expr;
pub mod plan;
mod type_codec;
pub mod verify;

#[cfg(test)]
mod test_utils;

#[cfg(test)]
mod compile_tests;

pub use aggregate::{Aggregator, ROOT_NAMESPACE, Unit, UnitSink};
pub use dump::{DumpConfig, dump};
pub use error::{CompileError, Result, Violation, ViolationKind};
pub use plan::{
    CombinatorPlan, Dispatch, ExprPlan, FieldRole, FieldStep, FunctionPlan, Gate, Program, Step,
    TypePlan,
};

use tlcodec_core::Schema;

/// Verify `schema` and compile every type and function into a [`Program`].
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(types = schema.type_count(), functions = schema.function_count())
)]
pub fn compile(schema: &Schema) -> Result<Program> {
    let violations = verify::verify(schema);
    if !violations.is_empty() {
        tracing::debug!(count = violations.len(), "schema rejected");
        return Err(CompileError::Invalid(violations));
    }

    let codec = expr::ExprCodec::new(schema);
    let mut program = Program::default();
    for (id, def) in schema.types() {
        let plan = type_codec::compile_type(&codec, id, def);
        tracing::trace!(ty = %plan.name, polymorphic = plan.is_polymorphic(), "type compiled");
        program.push_type(plan);
    }
    for (_, function) in schema.functions() {
        let plan = combinator::compile_function(&codec, function);
        tracing::trace!(function = %plan.name(), magic = plan.magic(), "function compiled");
        program.push_function(plan);
    }
    Ok(program)
}
