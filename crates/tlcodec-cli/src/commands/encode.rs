use std::path::PathBuf;

use tlcodec_vm::Typing;

use super::codec_common::{Target, build_engine, encode_value, load_input, parse_value};
use super::schema_loader::load_program;

pub struct EncodeArgs {
    pub schema_path: PathBuf,
    pub target: Target,
    pub input: Option<String>,
    pub recursion_limit: Option<u32>,
}

pub fn run(args: EncodeArgs) {
    let (_, program) = load_program(&args.schema_path).unwrap_or_else(|msg| {
        eprintln!("error: {}", msg);
        std::process::exit(1);
    });

    let text = load_input(args.input.as_deref(), &args.schema_path).unwrap_or_else(|msg| {
        eprintln!("error: {}", msg);
        std::process::exit(1);
    });

    // JSON carries no constructor objects, so encoding is always weak.
    let engine = build_engine(&program, Typing::Weak, args.recursion_limit);
    let bytes = parse_value(&text, "input")
        .and_then(|value| encode_value(&engine, &args.target, &value))
        .unwrap_or_else(|msg| {
            eprintln!("error: {}", msg);
            std::process::exit(1);
        });

    tracing::debug!(len = bytes.len(), "encoded");
    println!("{}", hex::encode(bytes));
}
