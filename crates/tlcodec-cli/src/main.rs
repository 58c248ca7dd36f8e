mod cli;
mod commands;

use std::sync::Once;

use cli::{CheckParams, DecodeParams, DumpParams, EncodeParams, UnitsParams, build_cli};

static TRACING_INIT: Once = Once::new();

/// Install a stderr subscriber when `RUST_LOG` is set.
///
/// Enable with `RUST_LOG=tlcodec_vm=trace` to see magics as they are matched.
fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{EnvFilter, fmt, prelude::*};

        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::registry()
                .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
                .with(EnvFilter::from_default_env())
                .init();
        }
    });
}

fn main() {
    init_tracing();
    let matches = build_cli().get_matches();

    match matches.subcommand() {
        Some(("check", m)) => {
            let params = CheckParams::from_matches(m);
            commands::check::run(params.into());
        }
        Some(("dump", m)) => {
            let params = DumpParams::from_matches(m);
            commands::dump::run(params.into());
        }
        Some(("units", m)) => {
            let params = UnitsParams::from_matches(m);
            commands::units::run(params.into());
        }
        Some(("encode", m)) => {
            let params = EncodeParams::from_matches(m);
            commands::encode::run(params.into());
        }
        Some(("decode", m)) => {
            let params = DecodeParams::from_matches(m);
            commands::decode::run(params.into());
        }
        _ => unreachable!("clap should have caught this"),
    }
}
