use std::path::PathBuf;

use tlcodec_core::Colors;
use tlcodec_vm::Typing;

use super::codec_common::{Target, build_engine, decode_value, load_input, parse_hex};
use super::schema_loader::load_program;

pub struct DecodeArgs {
    pub schema_path: PathBuf,
    pub target: Target,
    pub input: Option<String>,
    pub strong: bool,
    pub pretty: bool,
    pub recursion_limit: Option<u32>,
    pub color: bool,
}

pub fn run(args: DecodeArgs) {
    let (_, program) = load_program(&args.schema_path).unwrap_or_else(|msg| {
        eprintln!("error: {}", msg);
        std::process::exit(1);
    });

    let text = load_input(args.input.as_deref(), &args.schema_path).unwrap_or_else(|msg| {
        eprintln!("error: {}", msg);
        std::process::exit(1);
    });

    let typing = if args.strong {
        Typing::Strong
    } else {
        Typing::Weak
    };
    let engine = build_engine(&program, typing, args.recursion_limit);
    let value = parse_hex(&text)
        .and_then(|bytes| decode_value(&engine, &args.target, &bytes))
        .unwrap_or_else(|msg| {
            eprintln!("error: {}", msg);
            std::process::exit(1);
        });

    println!("{}", value.format(args.pretty, Colors::new(args.color)));
}
