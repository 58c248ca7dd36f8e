use std::convert::Infallible;
use std::fmt::Write as _;
use std::path::PathBuf;

use tlcodec_compiler::{Aggregator, Program, Unit};
use tlcodec_core::{Colors, Schema};

use super::schema_loader::load_program;

pub struct UnitsArgs {
    pub schema_path: PathBuf,
    pub roots: Vec<String>,
    pub color: bool,
}

pub fn run(args: UnitsArgs) {
    let (schema, program) = load_program(&args.schema_path).unwrap_or_else(|msg| {
        eprintln!("error: {}", msg);
        std::process::exit(1);
    });

    match render_units(&schema, &program, &args.roots, Colors::new(args.color)) {
        Ok(text) => print!("{}", text),
        Err(msg) => {
            eprintln!("error: {}", msg);
            std::process::exit(1);
        }
    }
}

/// List units in emission order, each with its dependencies and members.
pub fn render_units(
    schema: &Schema,
    program: &Program,
    roots: &[String],
    c: Colors,
) -> Result<String, String> {
    let mut aggregator = Aggregator::new(schema);
    for root in roots {
        let Some(id) = schema.type_by_name(root) else {
            return Err(format!("unknown root type `{}`", root));
        };
        aggregator = aggregator.with_root(id);
    }

    let mut out = String::new();
    let mut sink = |program: &Program, unit: &Unit| -> Result<(), Infallible> {
        render_unit(&mut out, program, unit, c);
        Ok(())
    };
    let Ok(_) = aggregator.emit(program, &mut sink);
    Ok(out)
}

fn render_unit(out: &mut String, program: &Program, unit: &Unit, c: Colors) {
    let _ = write!(out, "{}", c.paint(c.blue, &unit.namespace));
    if !unit.dependencies.is_empty() {
        let _ = write!(
            out,
            " {} {}",
            c.paint(c.dim, "->"),
            unit.dependencies.join(", ")
        );
    }
    out.push('\n');
    for &ty in &unit.types {
        let _ = writeln!(out, "  {} {}", c.paint(c.dim, "type"), program.type_name(ty));
    }
    for &id in &unit.functions {
        let Some(function) = program.function_plan(id) else {
            continue;
        };
        let magic = format!("#{:08x}", function.magic());
        let _ = writeln!(
            out,
            "  {} {} {}",
            c.paint(c.dim, "fn"),
            function.name(),
            c.paint(c.yellow, &magic)
        );
    }
}
