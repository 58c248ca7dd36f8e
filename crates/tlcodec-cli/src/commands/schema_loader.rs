use std::fs;
use std::io::{self, Read};
use std::path::Path;

use tlcodec_compiler::{CompileError, Program, compile};
use tlcodec_core::Schema;

/// Whether `path` means "read from stdin".
pub fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

pub fn load_schema_text(path: &Path) -> Result<String, String> {
    if is_stdin(path) {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .map_err(|e| format!("failed to read stdin: {}", e))?;
        return Ok(buf);
    }
    fs::read_to_string(path).map_err(|e| format!("failed to read '{}': {}", path.display(), e))
}

/// Load and resolve a schema without verifying it.
pub fn load_schema(path: &Path) -> Result<Schema, String> {
    let text = load_schema_text(path)?;
    parse_schema(&text)
}

pub fn parse_schema(text: &str) -> Result<Schema, String> {
    if text.trim().is_empty() {
        return Err("schema cannot be empty".to_string());
    }
    Schema::from_json(text).map_err(|e| e.to_string())
}

/// Verify and compile, listing every violation on failure.
pub fn compile_schema(schema: &Schema) -> Result<Program, String> {
    compile(schema).map_err(|e| render_compile_error(&e))
}

pub fn render_compile_error(error: &CompileError) -> String {
    let mut out = error.to_string();
    for violation in error.violations() {
        out.push_str("\n  ");
        out.push_str(&violation.to_string());
    }
    out
}

/// Load, verify and compile the schema at `path`.
pub fn load_program(path: &Path) -> Result<(Schema, Program), String> {
    let schema = load_schema(path)?;
    let program = compile_schema(&schema)?;
    Ok((schema, program))
}
