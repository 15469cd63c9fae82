use clap::{Args, Subcommand};
use devchan_module::{ModuleConfig, DEFAULT_DEVICE_NAME, DEFAULT_STATUS_NAME};
use std::path::PathBuf;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod info;
pub mod session;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load a module and run channel operations, one per line.
    Session(SessionArgs),
    /// Show node names, capacity and the advisory message.
    Info(InfoArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Session(args) => session::run(args, format),
        Command::Info(args) => info::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

/// Module registration settings shared by commands that load a module.
#[derive(Args, Debug, Clone)]
pub struct ModuleArgs {
    /// Device node name.
    #[arg(long, env = "DEVCHAN_DEVICE_NAME", default_value = DEFAULT_DEVICE_NAME)]
    pub device_name: String,
    /// Status node name.
    #[arg(long, env = "DEVCHAN_STATUS_NAME", default_value = DEFAULT_STATUS_NAME)]
    pub status_name: String,
    /// Status node permission bits, in octal.
    #[arg(long, default_value = "666", value_parser = parse_mode)]
    pub status_mode: u32,
    /// Message served by status node reads.
    #[arg(long, env = "DEVCHAN_ADVISORY")]
    pub advisory: Option<String>,
}

impl ModuleArgs {
    pub fn to_config(&self) -> ModuleConfig {
        let config = ModuleConfig::default()
            .with_device_name(self.device_name.clone())
            .with_status_name(self.status_name.clone())
            .with_status_mode(self.status_mode);
        match &self.advisory {
            Some(advisory) => config.with_advisory(advisory.clone()),
            None => config,
        }
    }
}

fn parse_mode(input: &str) -> Result<u32, String> {
    let digits = input.strip_prefix("0o").unwrap_or(input);
    let mode = u32::from_str_radix(digits, 8).map_err(|err| format!("invalid octal mode: {err}"))?;
    if mode > 0o777 {
        return Err(format!("mode {input} out of range (max 777)"));
    }
    Ok(mode)
}

#[derive(Args, Debug)]
pub struct SessionArgs {
    /// Read operations from a file instead of stdin.
    #[arg(long, value_name = "FILE")]
    pub script: Option<PathBuf>,
    #[command(flatten)]
    pub module: ModuleArgs,
}

#[derive(Args, Debug)]
pub struct InfoArgs {
    #[command(flatten)]
    pub module: ModuleArgs,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
