//! Shared argument builders for CLI commands.
//!
//! Each function returns a `clap::Arg` that commands compose. Encode and
//! decode share the target selection (`--type`, `--call`, `--result-of`).

use std::path::PathBuf;

use clap::{Arg, ArgAction, value_parser};

/// Schema JSON file (positional), `-` for stdin.
pub fn schema_path_arg() -> Arg {
    Arg::new("schema_path")
        .value_name("SCHEMA")
        .value_parser(value_parser!(PathBuf))
        .required(true)
        .help("Schema JSON file (`-` for stdin)")
}

/// Value to encode or decode (positional); stdin when absent.
pub fn input_arg(what: &'static str) -> Arg {
    Arg::new("input")
        .value_name("INPUT")
        .help(what)
}

/// Color output control (--color).
pub fn color_arg() -> Arg {
    Arg::new("color")
        .long("color")
        .value_name("WHEN")
        .default_value("auto")
        .value_parser(["auto", "always", "never"])
        .help("Colorize output")
}

/// Namespace filter (--unit).
pub fn unit_arg() -> Arg {
    Arg::new("unit")
        .long("unit")
        .value_name("NS")
        .help("Only show entries of this namespace (`common` for unprefixed names)")
}

/// Extra reachability roots (--root, repeatable).
pub fn root_arg() -> Arg {
    Arg::new("roots")
        .long("root")
        .value_name("TYPE")
        .action(ArgAction::Append)
        .help("Also keep this type and what it references")
}

/// Codec target: a named type (-t/--type).
pub fn type_arg() -> Arg {
    Arg::new("type_name")
        .short('t')
        .long("type")
        .value_name("TYPE")
        .help("Encode or decode a value of this type")
}

/// Codec target: a function call (--call).
pub fn call_arg() -> Arg {
    Arg::new("call")
        .long("call")
        .action(ArgAction::SetTrue)
        .help("Encode or decode a function call")
}

/// Codec target: the result of a call (--result-of).
pub fn result_of_arg() -> Arg {
    Arg::new("result_of")
        .long("result-of")
        .value_name("CALL")
        .help("Encode or decode the result of this call (JSON)")
}

/// Strongly typed decoding (--strong).
pub fn strong_arg() -> Arg {
    Arg::new("strong")
        .long("strong")
        .action(ArgAction::SetTrue)
        .conflicts_with("result_of")
        .help("Decode into constructor objects and reject loose values")
}

/// Compact JSON output (--compact).
pub fn compact_arg() -> Arg {
    Arg::new("compact")
        .long("compact")
        .action(ArgAction::SetTrue)
        .help("Output compact JSON")
}

/// Nesting limit (--recursion-limit).
pub fn recursion_limit_arg() -> Arg {
    Arg::new("recursion_limit")
        .long("recursion-limit")
        .value_name("N")
        .value_parser(value_parser!(u32))
        .help("Maximum nesting depth of constructors and calls [default: 1024]")
}
