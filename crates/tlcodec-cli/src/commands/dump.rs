use std::path::PathBuf;

use tlcodec_compiler::{DumpConfig, dump};

use super::schema_loader::load_program;

pub struct DumpArgs {
    pub schema_path: PathBuf,
    pub unit: Option<String>,
    pub color: bool,
}

pub fn run(args: DumpArgs) {
    let (_, program) = load_program(&args.schema_path).unwrap_or_else(|msg| {
        eprintln!("error: {}", msg);
        std::process::exit(1);
    });

    let mut config = DumpConfig::new().colored(args.color);
    if let Some(unit) = args.unit {
        config = config.unit(unit);
    }
    print!("{}", dump(&program, &config));
}
