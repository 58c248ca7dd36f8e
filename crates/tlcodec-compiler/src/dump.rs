//! Human-readable rendering of compiled procedures.
//!
//! Every declared type prints an `encode` and a `decode` block; every function
//! prints its `call` and `result` blocks.

use std::fmt::Write as _;

use tlcodec_core::{Colors, ParamKind, namespace_of};

use crate::aggregate::ROOT_NAMESPACE;
use crate::plan::{
    CombinatorPlan, Dispatch, ExprPlan, FieldRole, FunctionPlan, Gate, Program, Step, TypePlan,
};

/// Dump options.
#[derive(Clone, Debug, Default)]
pub struct DumpConfig {
    pub(crate) colors: Colors,
    /// Only dump entries of this namespace.
    pub(crate) unit: Option<String>,
}

impl DumpConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn colored(mut self, enabled: bool) -> Self {
        self.colors = Colors::new(enabled);
        self
    }

    pub fn unit(mut self, namespace: impl Into<String>) -> Self {
        self.unit = Some(namespace.into());
        self
    }

    fn selects(&self, name: &str) -> bool {
        match &self.unit {
            Some(unit) => namespace_of(name).unwrap_or(ROOT_NAMESPACE) == unit,
            None => true,
        }
    }
}

/// Render the declared types and functions of `program`.
pub fn dump(program: &Program, config: &DumpConfig) -> String {
    let printer = Printer {
        program,
        c: config.colors,
    };
    let mut blocks = Vec::new();
    for (_, ty) in program.types() {
        if ty.builtin || !config.selects(&ty.name) {
            continue;
        }
        blocks.push(printer.type_block(ty, Direction::Encode));
        blocks.push(printer.type_block(ty, Direction::Decode));
    }
    for (_, function) in program.functions() {
        if !config.selects(function.name()) {
            continue;
        }
        blocks.push(printer.function_block(function));
    }
    blocks.join("\n")
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Direction {
    Encode,
    Decode,
}

struct Printer<'p> {
    program: &'p Program,
    c: Colors,
}

impl Printer<'_> {
    fn magic(&self, magic: u32) -> String {
        self.c.paint(self.c.yellow, &format!("#{magic:08x}"))
    }

    fn keyword(&self, word: &str) -> String {
        self.c.paint(self.c.dim, word)
    }

    fn type_block(&self, ty: &TypePlan, dir: Direction) -> String {
        let mut out = String::new();
        let head = match dir {
            Direction::Encode => "encode",
            Direction::Decode => "decode",
        };
        out.push_str(&self.keyword(head));
        out.push(' ');
        out.push_str(&self.c.paint(self.c.blue, &ty.name));
        for param in &ty.params {
            out.push(' ');
            out.push_str(&param.name);
        }
        out.push('\n');

        match &ty.dispatch {
            Dispatch::Bare(ctor) => {
                let _ = writeln!(out, "  {}", ctor.name);
                self.steps(&mut out, ctor);
            }
            Dispatch::Polymorphic { cases, default } => {
                for ctor in cases {
                    match dir {
                        Direction::Encode => {
                            let _ = writeln!(
                                out,
                                "  {} => {} {}",
                                ctor.name,
                                self.keyword("magic"),
                                self.magic(ctor.magic)
                            );
                        }
                        Direction::Decode => {
                            let _ = writeln!(out, "  {} => {}", self.magic(ctor.magic), ctor.name);
                        }
                    }
                    self.steps(&mut out, ctor);
                }
                match (default, dir) {
                    (Some(ctor), Direction::Encode) => {
                        let _ = writeln!(out, "  {} => {}", ctor.name, self.keyword("default"));
                        self.steps(&mut out, ctor);
                    }
                    (Some(ctor), Direction::Decode) => {
                        let _ = writeln!(out, "  {} => {}", self.keyword("rewind"), ctor.name);
                        self.steps(&mut out, ctor);
                    }
                    (None, Direction::Encode) => {
                        let _ = writeln!(
                            out,
                            "  {} => {}",
                            self.keyword("otherwise"),
                            self.keyword("invalid constructor")
                        );
                    }
                    (None, Direction::Decode) => {
                        let _ = writeln!(
                            out,
                            "  {} => {}",
                            self.keyword("otherwise"),
                            self.keyword("unknown magic")
                        );
                    }
                }
            }
        }
        out
    }

    fn function_block(&self, function: &FunctionPlan) -> String {
        let mut out = String::new();
        let call = &function.call;
        let _ = writeln!(
            out,
            "{} {} {}",
            self.keyword("call"),
            self.c.paint(self.c.blue, &call.name),
            self.magic(call.magic)
        );
        self.steps(&mut out, call);

        let _ = write!(out, "{} {}", self.keyword("result"), self.c.paint(self.c.blue, &call.name));
        if let Some(magic) = function.original_result_magic {
            let _ = write!(out, " {} {}", self.keyword("magic"), self.magic(magic));
        }
        out.push('\n');
        let _ = writeln!(out, "    {}", self.expr(call, &function.result));
        out
    }

    fn steps(&self, out: &mut String, ctor: &CombinatorPlan) {
        if let Some(p) = ctor.primitive {
            let _ = writeln!(out, "    {} {}", self.keyword("primitive"), p.tl_name());
            return;
        }
        for step in &ctor.steps {
            out.push_str("    ");
            match step {
                Step::Param { slot, kind, .. } => {
                    let kind = match kind {
                        ParamKind::Type => "Type",
                        ParamKind::Nat => "#",
                    };
                    let _ = write!(out, "{{{}:{kind}}}", ctor.slot_names[*slot]);
                }
                Step::Field(field) => {
                    let _ = write!(out, "{}: {}", field.name, self.expr(ctor, &field.expr));
                    self.gate(out, ctor, field.gate);
                    match field.role {
                        FieldRole::LengthOf { array_slot } => {
                            let _ = write!(
                                out,
                                " {} {}",
                                self.keyword("length of"),
                                ctor.slot_names[array_slot]
                            );
                        }
                        FieldRole::Value if field.capture => {
                            let _ = write!(out, " {}", self.keyword("capture"));
                        }
                        FieldRole::Value => {}
                    }
                }
                Step::Forwarded {
                    name, gate, param, ..
                } => {
                    let _ = write!(out, "{name}: !{}", ctor.param_name(*param).unwrap_or("?"));
                    self.gate(out, ctor, *gate);
                }
            }
            out.push('\n');
        }
    }

    fn gate(&self, out: &mut String, ctor: &CombinatorPlan, gate: Option<Gate>) {
        if let Some(gate) = gate {
            let _ = write!(
                out,
                " {} {}.{}",
                self.keyword("if"),
                ctor.slot_names[gate.mask_slot],
                gate.bit
            );
        }
    }

    fn expr(&self, ctor: &CombinatorPlan, expr: &ExprPlan) -> String {
        match expr {
            ExprPlan::NatConst(n) => n.to_string(),
            ExprPlan::NatVar(slot) => ctor.slot_names[*slot].clone(),
            ExprPlan::TypeVar {
                param,
                expected_magic,
            } => {
                let name = ctor.param_name(*param).unwrap_or("?").to_string();
                if *expected_magic == 0 {
                    name
                } else {
                    format!("{name}~{}", self.magic(*expected_magic))
                }
            }
            ExprPlan::Array { item, count } => {
                format!("{}*[ {} ]", self.expr(ctor, count), self.expr(ctor, item))
            }
            ExprPlan::Named { type_id, args } => {
                let plan = self.program.type_plan(*type_id);
                let mut out = match plan.and_then(|t| t.primitive()) {
                    Some(p) => p.tl_name().to_string(),
                    None => self.program.type_name(*type_id).to_string(),
                };
                for arg in args {
                    let rendered = self.expr(ctor, arg);
                    if rendered.contains(' ') {
                        let _ = write!(out, " ({rendered})");
                    } else {
                        let _ = write!(out, " {rendered}");
                    }
                }
                out
            }
        }
    }
}
