use clap::{Args, Subcommand, ValueEnum};
use std::path::PathBuf;

use canbridge_router::{LinkConfig, Policy, Route};

use crate::config::{
    parse_can_id, parse_duration, parse_hex_byte, BridgeConfig, BridgeSettings, Overrides,
};
use crate::exit::{config_error, CliResult};
use crate::output::OutputFormat;

pub mod decode;
pub mod run;
pub mod topology;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Configure the links and route frames until SIGINT, SIGTERM or SIGHUP.
    Run(RunArgs),
    /// Decode one frame given on the command line.
    Decode(DecodeArgs),
    /// Print the resolved links and forwarding table.
    Topology(TopologyArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: Option<OutputFormat>) -> CliResult<i32> {
    match command {
        Command::Run(args) => run::run(args, OutputFormat::for_frames(format)),
        Command::Decode(args) => decode::run(args, OutputFormat::for_frames(format)),
        Command::Topology(args) => topology::run(args, OutputFormat::for_reports(format)),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum PolicyArg {
    /// Forward each link to the next, the last wrapping to the first.
    #[value(alias = "ring")]
    Forward,
    /// Print frames without retransmitting.
    Monitor,
}

/// Options shared by every command that resolves a bridge configuration.
#[derive(Args, Debug, Default)]
pub struct BridgeArgs {
    /// JSON configuration file.
    #[arg(long, value_name = "FILE", env = "CANBRIDGE_CONFIG")]
    pub config: Option<PathBuf>,
    /// Link to open, in ring order (repeatable). Replaces the configured set.
    #[arg(long = "link", value_name = "NAME[@BITRATE]")]
    pub links: Vec<LinkConfig>,
    /// Forwarding policy.
    #[arg(long, value_enum, conflicts_with = "routes")]
    pub policy: Option<PolicyArg>,
    /// Explicit forwarding rule (repeatable). Replaces the policy.
    #[arg(long = "route", value_name = "SRC:DST")]
    pub routes: Vec<Route>,
    /// Readiness wait timeout (e.g. 1s, 250ms).
    #[arg(long, value_name = "DURATION")]
    pub poll_timeout: Option<String>,
    /// Pause after configuring links (e.g. 100ms, 0).
    #[arg(long, value_name = "DURATION")]
    pub settle: Option<String>,
    /// Identifier of the keypad message.
    #[arg(long, value_name = "ID", value_parser = parse_can_id)]
    pub keypad_id: Option<u32>,
    /// Identifier of the torque/speed control message.
    #[arg(long, value_name = "ID", value_parser = parse_can_id)]
    pub control_id: Option<u32>,
}

impl BridgeArgs {
    /// Load the file (or defaults), apply flags and resolve the forwarding table.
    pub fn settings(&self) -> CliResult<BridgeSettings> {
        let mut config = match &self.config {
            Some(path) => BridgeConfig::load(path).map_err(config_error)?,
            None => BridgeConfig::default(),
        };

        let policy = if !self.routes.is_empty() {
            Some(Policy::Routes(self.routes.clone()))
        } else {
            self.policy.map(|p| match p {
                PolicyArg::Forward => Policy::Forward,
                PolicyArg::Monitor => Policy::Monitor,
            })
        };

        config.apply(Overrides {
            links: self.links.clone(),
            policy,
            poll_timeout: self
                .poll_timeout
                .as_deref()
                .map(parse_duration)
                .transpose()
                .map_err(config_error)?,
            settle_delay: self
                .settle
                .as_deref()
                .map(parse_duration)
                .transpose()
                .map_err(config_error)?,
            keypad_id: self.keypad_id,
            control_id: self.control_id,
        });

        config.resolve().map_err(config_error)
    }
}

#[derive(Args, Debug)]
pub struct RunArgs {
    #[command(flatten)]
    pub bridge: BridgeArgs,
    /// Open the links as they are, without running `ip link`.
    #[arg(long)]
    pub no_configure: bool,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Frame identifier (hex with 0x, or decimal).
    #[arg(long, value_name = "ID", value_parser = parse_can_id)]
    pub id: u32,
    /// Payload bytes in hex, at most 8.
    #[arg(value_name = "BYTE", value_parser = parse_hex_byte)]
    pub data: Vec<u8>,
    /// Link name shown as the frame source.
    #[arg(long, default_value = "cli")]
    pub link: String,
    /// Identifier of the keypad message.
    #[arg(long, value_name = "ID", value_parser = parse_can_id)]
    pub keypad_id: Option<u32>,
    /// Identifier of the torque/speed control message.
    #[arg(long, value_name = "ID", value_parser = parse_can_id)]
    pub control_id: Option<u32>,
}

#[derive(Args, Debug)]
pub struct TopologyArgs {
    #[command(flatten)]
    pub bridge: BridgeArgs,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build information.
    #[arg(long)]
    pub extended: bool,
}
