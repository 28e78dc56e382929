use clap::{Args, Subcommand};
use std::path::PathBuf;

use cayenne_lpp::codec::DEFAULT_MAX_FRAME_SIZE;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod types;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Pack readings into LPP frames.
    Encode(EncodeArgs),
    /// Decode an LPP frame.
    Decode(DecodeArgs),
    /// List the LPP type catalog.
    Types(TypesArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Types(args) => types::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Readings as JSON (one object or an array).
    #[arg(long, conflicts_with = "file")]
    pub json: Option<String>,
    /// Read JSON readings from file. Default: stdin.
    #[arg(long, conflicts_with = "json")]
    pub file: Option<PathBuf>,
    /// Maximum frame size in bytes.
    #[arg(
        long,
        env = "CAYENNE_LPP_MAX_SIZE",
        default_value_t = DEFAULT_MAX_FRAME_SIZE
    )]
    pub max_size: usize,
    /// Emit as many frames as needed instead of deferring what does not fit.
    #[arg(long)]
    pub split: bool,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Frame as hex text. Default: hex read from stdin.
    #[arg(conflicts_with = "file")]
    pub hex: Option<String>,
    /// Read the binary frame from file.
    #[arg(long)]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct TypesArgs {
    /// Include catalog entries without an encoding.
    #[arg(long)]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
