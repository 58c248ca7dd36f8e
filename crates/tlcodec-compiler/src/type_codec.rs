//! TypeCodec: bare forwarding or magic switch, chosen once per type.

use tlcodec_core::{TypeDef, TypeId};

use crate::combinator::compile_combinator;
use crate::expr::ExprCodec;
use crate::plan::{Dispatch, TypePlan};

pub(crate) fn compile_type(codec: &ExprCodec<'_>, id: TypeId, def: &TypeDef) -> TypePlan {
    let mut ctors: Vec<_> = def
        .constructors
        .iter()
        .map(|c| compile_combinator(codec, Some(id), c, None))
        .collect();

    let dispatch = if ctors.len() == 1 {
        Dispatch::Bare(ctors.remove(0))
    } else {
        let default = if def.has_default_constructor {
            ctors.pop()
        } else {
            None
        };
        Dispatch::Polymorphic {
            cases: ctors,
            default,
        }
    };

    TypePlan {
        name: def.name.clone(),
        params: def.params.clone(),
        dispatch,
        builtin: codec.schema().is_builtin(id),
    }
}
