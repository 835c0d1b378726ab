use std::path::{Path, PathBuf};

use clap::{ArgGroup, Args, Subcommand, ValueEnum};
use fieldframe_frame::SizePolicy;
use fieldframe_schema::{load_schema_file, RegistryConfig, Schema};

use crate::exit::{io_error, schema_error, CliResult};
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod inspect;
pub mod layout;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the compiled layout of a schema definition.
    Layout(LayoutArgs),
    /// Build a record from field values and write it as a frame.
    Encode(EncodeArgs),
    /// Decode a frame against a schema and print its fields.
    Decode(DecodeArgs),
    /// Print a frame's header and field table without a schema.
    Inspect(InspectArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Layout(args) => layout::run(args, format),
        Command::Encode(args) => encode::run(args, format),
        Command::Decode(args) => decode::run(args, format),
        Command::Inspect(args) => inspect::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct LayoutArgs {
    /// Schema definition file (JSON).
    pub schema: PathBuf,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Schema definition file (JSON).
    pub schema: PathBuf,
    /// Field assignment, repeatable. Byte fields take text or `hex:<digits>`.
    #[arg(long, value_name = "NAME=VALUE")]
    pub set: Vec<String>,
    /// Write the frame to a file instead of stdout.
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["schema", "schema_dir"])))]
pub struct DecodeArgs {
    /// Frame file to decode.
    pub frame: PathBuf,
    /// Schema definition file (JSON).
    #[arg(long, value_name = "FILE")]
    pub schema: Option<PathBuf>,
    /// Directory of `*.schema.json` definitions; the frame's stream id picks one.
    #[arg(long, value_name = "DIR")]
    pub schema_dir: Option<PathBuf>,
    /// Copy length rule for fields whose size changed between versions.
    #[arg(long, value_enum, default_value = "clamp")]
    pub policy: PolicyArg,
}

#[derive(Args, Debug)]
pub struct InspectArgs {
    /// Frame file to inspect.
    pub frame: PathBuf,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum PolicyArg {
    Trust,
    Clamp,
}

impl From<PolicyArg> for SizePolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::Trust => SizePolicy::Trust,
            PolicyArg::Clamp => SizePolicy::Clamp,
        }
    }
}

pub(crate) fn load_schema(path: &Path) -> CliResult<Schema> {
    load_schema_file(path, &RegistryConfig::default()).map_err(|err| schema_error("schema", err))
}

pub(crate) fn read_frame(path: &Path) -> CliResult<Vec<u8>> {
    std::fs::read(path).map_err(|err| io_error(&format!("reading {}", path.display()), err))
}
