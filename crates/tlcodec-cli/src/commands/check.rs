use std::path::PathBuf;

use tlcodec_compiler::{Aggregator, Program, verify};
use tlcodec_core::{Colors, Schema};

use super::schema_loader::load_schema;

pub struct CheckArgs {
    pub schema_path: PathBuf,
    pub color: bool,
}

pub fn run(args: CheckArgs) {
    let schema = load_schema(&args.schema_path).unwrap_or_else(|msg| {
        eprintln!("error: {}", msg);
        std::process::exit(1);
    });

    let violations = verify::verify(&schema);
    if !violations.is_empty() {
        let c = Colors::new(args.color);
        for violation in &violations {
            eprintln!("{}: {}", c.paint(c.yellow, "error"), violation);
        }
        eprintln!();
        eprintln!(
            "error: schema verification failed with {} violations",
            violations.len()
        );
        std::process::exit(1);
    }

    let program = match tlcodec_compiler::compile(&schema) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("error: {}", e);
            std::process::exit(1);
        }
    };

    println!("{}", summary(&schema, &program));
}

/// One-line description of a verified schema.
pub fn summary(schema: &Schema, program: &Program) -> String {
    let types = program.types().filter(|(_, t)| !t.builtin).count();
    let polymorphic = program
        .types()
        .filter(|(_, t)| !t.builtin && t.is_polymorphic())
        .count();
    let functions = program.functions().count();
    let units = Aggregator::new(schema).units().len();
    format!(
        "{} {}, {} polymorphic; {} {}; {} {}",
        types,
        plural(types, "type"),
        polymorphic,
        functions,
        plural(functions, "function"),
        units,
        plural(units, "unit"),
    )
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        word.to_string()
    } else {
        format!("{}s", word)
    }
}
