//! Shared logic for encode and decode commands.

use std::io::{self, Read};
use std::path::Path;

use tlcodec_compiler::Program;
use tlcodec_vm::{Engine, Typing, Value};
use tlcodec_wire::{Reader, Writer};

use super::schema_loader::is_stdin;

/// What the input value is.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Target {
    /// An instance of the named type.
    Type(String),
    /// A function call, named by its constructor.
    Call,
    /// The result of the given call (JSON text).
    Result(String),
}

/// Read the positional input, or stdin when absent or `-`.
pub fn load_input(input: Option<&str>, schema_path: &Path) -> Result<String, String> {
    match input {
        Some(text) if text != "-" => Ok(text.to_owned()),
        _ => {
            if is_stdin(schema_path) {
                return Err("schema and input cannot both be read from stdin".to_string());
            }
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .map_err(|e| format!("failed to read stdin: {}", e))?;
            Ok(buf)
        }
    }
}

pub fn build_engine(
    program: &Program,
    typing: Typing,
    recursion_limit: Option<u32>,
) -> Engine<'_> {
    let mut builder = Engine::builder(program).typing(typing);
    if let Some(limit) = recursion_limit {
        builder = builder.recursion_limit(limit);
    }
    builder.build()
}

/// Parse JSON text into a weakly typed value.
pub fn parse_value(text: &str, what: &str) -> Result<Value, String> {
    let json: serde_json::Value =
        serde_json::from_str(text).map_err(|e| format!("invalid {} JSON: {}", what, e))?;
    Ok(Value::from_json(&json))
}

/// Parse hex digits; whitespace between digits is ignored.
pub fn parse_hex(text: &str) -> Result<Vec<u8>, String> {
    let digits: String = text.split_whitespace().collect();
    let digits = digits.strip_prefix("0x").unwrap_or(&digits);
    hex::decode(digits).map_err(|e| format!("invalid hex input: {}", e))
}

pub fn encode_value(
    engine: &Engine<'_>,
    target: &Target,
    value: &Value,
) -> Result<Vec<u8>, String> {
    let mut out = Writer::new();
    let result = match target {
        Target::Type(name) => engine.encode_named(name, value, &mut out),
        Target::Call => engine.encode_call(value, &mut out),
        Target::Result(call) => {
            let call = parse_value(call, "call")?;
            engine.encode_result(&call, value, &mut out)
        }
    };
    result.map_err(|e| e.to_string())?;
    Ok(out.into_bytes())
}

/// Decode one value; the whole input must be consumed.
pub fn decode_value(engine: &Engine<'_>, target: &Target, bytes: &[u8]) -> Result<Value, String> {
    let mut input = Reader::new(bytes);
    let result = match target {
        Target::Type(name) => engine.decode_named(name, &mut input),
        Target::Call => engine.decode_call(&mut input),
        Target::Result(call) => {
            let call = parse_value(call, "call")?;
            engine.decode_result(&call, &mut input)
        }
    };
    let value = result.map_err(|e| format!("{} (at byte {})", e, input.position()))?;
    if !input.is_at_end() {
        return Err(format!(
            "{} trailing bytes after value (at byte {})",
            input.remaining(),
            input.position()
        ));
    }
    Ok(value)
}
