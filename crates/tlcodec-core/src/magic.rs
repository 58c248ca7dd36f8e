//! Magic numbers: CRC32 of the canonical declaration text.
//!
//! The canonical text omits the magic itself and the trailing `;`:
//! `vector {t:Type} # [ t ] = Vector t` style, with arguments rendered as
//! `name:type`, optional arguments as `name:mask.bit?type` and arrays as
//! `n*[ item ]`. Regenerating an unchanged declaration always yields the
//! same magic.

use crate::{Combinator, Function, Primitive, Schema, TypeDef, TypeExpr};

/// Hash a canonical declaration.
pub fn compute(declaration: &str) -> u32 {
    crc32fast::hash(declaration.as_bytes())
}

/// Magic of a builtin primitive constructor (`int ? = Int`).
pub fn builtin_magic(p: Primitive) -> u32 {
    compute(&format!("{} ? = {}", p.tl_name(), p.type_name()))
}

/// Canonical declaration of a constructor of `ty`.
pub fn constructor_declaration(schema: &Schema, ty: &TypeDef, ctor: &Combinator) -> String {
    if let Some(p) = ctor.primitive {
        return format!("{} ? = {}", ctor.name, p.type_name());
    }
    let mut out = render_head(schema, ctor);
    out.push_str(" = ");
    out.push_str(&ty.name);
    for param in &ty.params {
        out.push(' ');
        out.push_str(&param.name);
    }
    out
}

/// Canonical declaration of a function.
pub fn function_declaration(schema: &Schema, function: &Function) -> String {
    let comb = &function.combinator;
    let mut out = render_head(schema, comb);
    out.push_str(" = ");
    out.push_str(&render_expr(schema, comb, &function.result));
    out
}

/// Magic a constructor would get from its declaration.
pub fn constructor_magic(schema: &Schema, ty: &TypeDef, ctor: &Combinator) -> u32 {
    compute(&constructor_declaration(schema, ty, ctor))
}

/// Magic a function would get from its declaration.
pub fn function_magic(schema: &Schema, function: &Function) -> u32 {
    compute(&function_declaration(schema, function))
}

fn render_head(schema: &Schema, comb: &Combinator) -> String {
    let mut out = comb.name.clone();
    for arg in &comb.args {
        out.push(' ');
        if arg.is_type {
            let kind = if arg.type_expr.is_nat_type() { "#" } else { "Type" };
            out.push_str(&format!("{{{}:{}}}", arg.name, kind));
            continue;
        }
        out.push_str(&arg.name);
        out.push(':');
        if arg.is_forwarded_function {
            out.push('!');
        }
        if let Some(mask) = arg.mask {
            let mask_name = comb
                .args
                .get(mask.arg)
                .map(|a| a.name.as_str())
                .unwrap_or("?");
            out.push_str(&format!("{}.{}?", mask_name, mask.bit));
        }
        out.push_str(&render_expr(schema, comb, &arg.type_expr));
    }
    out
}

/// Render a type expression in declaration syntax.
pub fn render_expr(schema: &Schema, comb: &Combinator, expr: &TypeExpr) -> String {
    match expr {
        TypeExpr::NatConst(n) => n.to_string(),
        TypeExpr::NatVar(arg) => comb
            .args
            .get(*arg)
            .map(|a| a.name.clone())
            .unwrap_or_else(|| format!("${arg}")),
        TypeExpr::TypeVar(param) => comb
            .param_arg(*param)
            .map(|i| comb.args[i].name.clone())
            .unwrap_or_else(|| format!("%{param}")),
        TypeExpr::Array { item, multiplicity } => format!(
            "{}*[ {} ]",
            render_expr(schema, comb, multiplicity),
            render_expr(schema, comb, item)
        ),
        TypeExpr::Named { type_id, children } => {
            let mut out = match schema.get_type(*type_id) {
                Some(def) => match def.primitive() {
                    Some(p) => p.tl_name().to_string(),
                    None => def.name.clone(),
                },
                None => format!("?{}", type_id.0),
            };
            for child in children {
                let rendered = render_expr(schema, comb, child);
                out.push(' ');
                if rendered.contains(' ') {
                    out.push('(');
                    out.push_str(&rendered);
                    out.push(')');
                } else {
                    out.push_str(&rendered);
                }
            }
            out
        }
    }
}
