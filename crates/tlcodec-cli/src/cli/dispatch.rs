//! Dispatch logic: extract params from ArgMatches and convert to command args.
//!
//! This module contains:
//! - `*Params` structs that mirror command `*Args` but are populated from clap
//! - `from_matches()` extractors
//! - `Into<*Args>` impls to bridge dispatch → command handlers

use std::path::PathBuf;

use clap::ArgMatches;

use super::ColorChoice;
use crate::commands::check::CheckArgs;
use crate::commands::codec_common::Target;
use crate::commands::decode::DecodeArgs;
use crate::commands::dump::DumpArgs;
use crate::commands::encode::EncodeArgs;
use crate::commands::units::UnitsArgs;

pub struct CheckParams {
    pub schema_path: PathBuf,
    pub color: ColorChoice,
}

impl CheckParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            schema_path: schema_path(m),
            color: parse_color(m),
        }
    }
}

impl From<CheckParams> for CheckArgs {
    fn from(p: CheckParams) -> Self {
        Self {
            schema_path: p.schema_path,
            color: p.color.should_colorize(),
        }
    }
}

pub struct DumpParams {
    pub schema_path: PathBuf,
    pub unit: Option<String>,
    pub color: ColorChoice,
}

impl DumpParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            schema_path: schema_path(m),
            unit: m.get_one::<String>("unit").cloned(),
            color: parse_color(m),
        }
    }
}

impl From<DumpParams> for DumpArgs {
    fn from(p: DumpParams) -> Self {
        Self {
            schema_path: p.schema_path,
            unit: p.unit,
            color: p.color.should_colorize(),
        }
    }
}

pub struct UnitsParams {
    pub schema_path: PathBuf,
    pub roots: Vec<String>,
    pub color: ColorChoice,
}

impl UnitsParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            schema_path: schema_path(m),
            roots: m
                .get_many::<String>("roots")
                .map(|roots| roots.cloned().collect())
                .unwrap_or_default(),
            color: parse_color(m),
        }
    }
}

impl From<UnitsParams> for UnitsArgs {
    fn from(p: UnitsParams) -> Self {
        Self {
            schema_path: p.schema_path,
            roots: p.roots,
            color: p.color.should_colorize(),
        }
    }
}

pub struct EncodeParams {
    pub schema_path: PathBuf,
    pub target: Target,
    pub input: Option<String>,
    pub recursion_limit: Option<u32>,
}

impl EncodeParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            schema_path: schema_path(m),
            target: parse_target(m),
            input: m.get_one::<String>("input").cloned(),
            recursion_limit: m.get_one::<u32>("recursion_limit").copied(),
        }
    }
}

impl From<EncodeParams> for EncodeArgs {
    fn from(p: EncodeParams) -> Self {
        Self {
            schema_path: p.schema_path,
            target: p.target,
            input: p.input,
            recursion_limit: p.recursion_limit,
        }
    }
}

pub struct DecodeParams {
    pub schema_path: PathBuf,
    pub target: Target,
    pub input: Option<String>,
    pub strong: bool,
    pub compact: bool,
    pub recursion_limit: Option<u32>,
    pub color: ColorChoice,
}

impl DecodeParams {
    pub fn from_matches(m: &ArgMatches) -> Self {
        Self {
            schema_path: schema_path(m),
            target: parse_target(m),
            input: m.get_one::<String>("input").cloned(),
            strong: m.get_flag("strong"),
            compact: m.get_flag("compact"),
            recursion_limit: m.get_one::<u32>("recursion_limit").copied(),
            color: parse_color(m),
        }
    }
}

impl From<DecodeParams> for DecodeArgs {
    fn from(p: DecodeParams) -> Self {
        Self {
            schema_path: p.schema_path,
            target: p.target,
            input: p.input,
            strong: p.strong,
            pretty: !p.compact,
            recursion_limit: p.recursion_limit,
            color: p.color.should_colorize(),
        }
    }
}

fn schema_path(m: &ArgMatches) -> PathBuf {
    m.get_one::<PathBuf>("schema_path")
        .cloned()
        .unwrap_or_else(|| PathBuf::from("-"))
}

fn parse_color(m: &ArgMatches) -> ColorChoice {
    match m.get_one::<String>("color").map(|s| s.as_str()) {
        Some("always") => ColorChoice::Always,
        Some("never") => ColorChoice::Never,
        _ => ColorChoice::Auto,
    }
}

/// The `target` group guarantees exactly one of the three is set.
fn parse_target(m: &ArgMatches) -> Target {
    if let Some(name) = m.get_one::<String>("type_name") {
        return Target::Type(name.clone());
    }
    if let Some(call) = m.get_one::<String>("result_of") {
        return Target::Result(call.clone());
    }
    Target::Call
}
