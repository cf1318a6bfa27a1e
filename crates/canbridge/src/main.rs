mod cmd;
mod config;
mod exit;
mod logging;
mod output;

use clap::Parser;

use crate::cmd::Command;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "canbridge", version, about = "CAN frame router and decoder")]
struct Cli {
    /// Output format for frames and reports (stdout).
    #[arg(long, value_name = "FORMAT", global = true)]
    format: Option<OutputFormat>,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(
        long,
        value_name = "LEVEL",
        default_value = "info",
        env = "CANBRIDGE_LOG_LEVEL",
        global = true
    )]
    log_level: LogLevel,

    /// Omit timestamps from log lines.
    #[arg(long, global = true)]
    log_no_time: bool,

    #[command(subcommand)]
    command: Command,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level, !cli.log_no_time);

    let result = cmd::run(cli.command, cli.format);

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_run_with_links_and_routes() {
        let cli = Cli::try_parse_from([
            "canbridge",
            "run",
            "--link",
            "can0@250000",
            "--link",
            "can1",
            "--route",
            "can0:can1",
            "--no-configure",
        ])
        .expect("run args should parse");

        let Command::Run(args) = cli.command else {
            panic!("expected run command");
        };
        assert_eq!(args.bridge.links.len(), 2);
        assert_eq!(args.bridge.links[0].bitrate, Some(250_000));
        assert_eq!(args.bridge.routes.len(), 1);
        assert!(args.no_configure);
    }

    #[test]
    fn rejects_policy_with_routes() {
        let err = Cli::try_parse_from([
            "canbridge",
            "run",
            "--policy",
            "monitor",
            "--route",
            "can0:can1",
        ])
        .expect_err("conflicting args should fail");

        assert_eq!(err.kind(), clap::error::ErrorKind::ArgumentConflict);
    }

    #[test]
    fn ring_is_an_alias_for_forward() {
        let cli = Cli::try_parse_from(["canbridge", "topology", "--policy", "ring"])
            .expect("ring alias should parse");
        let Command::Topology(args) = cli.command else {
            panic!("expected topology command");
        };
        assert_eq!(args.bridge.policy, Some(cmd::PolicyArg::Forward));
    }

    #[test]
    fn parses_decode_payload() {
        let cli = Cli::try_parse_from(["canbridge", "decode", "--id", "0x195", "01", "0x00"])
            .expect("decode args should parse");

        let Command::Decode(args) = cli.command else {
            panic!("expected decode command");
        };
        assert_eq!(args.id, 0x195);
        assert_eq!(args.data, vec![0x01, 0x00]);
    }

    #[test]
    fn rejects_malformed_link_spec() {
        let err = Cli::try_parse_from(["canbridge", "run", "--link", "can0@fast"])
            .expect_err("bad bitrate should fail");
        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }
}
