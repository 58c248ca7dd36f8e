//! Command builders for the CLI.
//!
//! Each command is built from the shared arg builders in `args.rs`.

use clap::{ArgGroup, Command};

use super::args::*;

/// Exactly one of `--type`, `--call`, `--result-of`.
fn with_target_args(cmd: Command) -> Command {
    cmd.arg(type_arg())
        .arg(call_arg())
        .arg(result_of_arg())
        .group(
            ArgGroup::new("target")
                .args(["type_name", "call", "result_of"])
                .required(true),
        )
}

/// Build the complete CLI with all subcommands.
pub fn build_cli() -> Command {
    Command::new("tlcodec")
        .about("Compile TL schemas into codec plans and run them")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(check_command())
        .subcommand(dump_command())
        .subcommand(units_command())
        .subcommand(encode_command())
        .subcommand(decode_command())
}

/// Validate a schema.
pub fn check_command() -> Command {
    Command::new("check")
        .about("Validate a schema")
        .override_usage("  tlcodec check <SCHEMA>")
        .after_help(
            r#"EXAMPLES:
  tlcodec check schema.json           # verify and summarize
  cat schema.json | tlcodec check -   # from stdin"#,
        )
        .arg(schema_path_arg())
        .arg(color_arg())
}

/// Show compiled codec procedures.
pub fn dump_command() -> Command {
    Command::new("dump")
        .about("Show compiled codec procedures")
        .override_usage("  tlcodec dump <SCHEMA> [--unit <NS>]")
        .after_help(
            r#"EXAMPLES:
  tlcodec dump schema.json                  # every type and function
  tlcodec dump schema.json --unit messages  # one namespace"#,
        )
        .arg(schema_path_arg())
        .arg(unit_arg())
        .arg(color_arg())
}

/// List compilation units.
pub fn units_command() -> Command {
    Command::new("units")
        .about("List namespace units and their dependencies")
        .override_usage("  tlcodec units <SCHEMA> [--root <TYPE>]...")
        .after_help(
            r#"EXAMPLES:
  tlcodec units schema.json               # units reachable from functions
  tlcodec units schema.json --root Update # also keep Update"#,
        )
        .arg(schema_path_arg())
        .arg(root_arg())
        .arg(color_arg())
}

/// Encode a JSON value into wire bytes.
pub fn encode_command() -> Command {
    let cmd = Command::new("encode")
        .about("Encode a JSON value to hex wire bytes")
        .override_usage(
            "\
  tlcodec encode <SCHEMA> --type <TYPE> [INPUT]
  tlcodec encode <SCHEMA> --call [INPUT]
  tlcodec encode <SCHEMA> --result-of <CALL> [INPUT]",
        )
        .after_help(
            r#"EXAMPLES:
  tlcodec encode schema.json -t Peer '{"_":"peerUser","user_id":7}'
  tlcodec encode schema.json --call '{"_":"help.getConfig"}'
  echo '{"id":7}' | tlcodec encode schema.json -t User"#,
        )
        .arg(schema_path_arg())
        .arg(input_arg("JSON value (stdin when absent or `-`)"))
        .arg(recursion_limit_arg());

    with_target_args(cmd)
}

/// Decode hex wire bytes into JSON.
pub fn decode_command() -> Command {
    let cmd = Command::new("decode")
        .about("Decode hex wire bytes to JSON")
        .override_usage(
            "\
  tlcodec decode <SCHEMA> --type <TYPE> [INPUT]
  tlcodec decode <SCHEMA> --call [INPUT]
  tlcodec decode <SCHEMA> --result-of <CALL> [INPUT]",
        )
        .after_help(
            r#"EXAMPLES:
  tlcodec decode schema.json -t Peer '01bb0000 07000000 00000000'
  tlcodec decode schema.json --call --strong 0d0d9bda...
  tlcodec decode schema.json --result-of '{"_":"peers.resolve","username":"a"}' fff00000..."#,
        )
        .arg(schema_path_arg())
        .arg(input_arg("Hex bytes, whitespace allowed (stdin when absent or `-`)"))
        .arg(strong_arg())
        .arg(compact_arg())
        .arg(recursion_limit_arg())
        .arg(color_arg());

    with_target_args(cmd)
}
