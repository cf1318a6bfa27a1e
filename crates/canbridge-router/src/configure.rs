use std::collections::HashSet;
use std::ffi::OsString;
use std::process::Command;

use tracing::debug;

/// Errors from an OS-level link configuration step.
#[derive(Debug, thiserror::Error)]
pub enum ConfigureError {
    /// The configuration command could not be started.
    #[error("failed to run `{command}`: {source}")]
    Spawn {
        command: String,
        source: std::io::Error,
    },

    /// The configuration command ran and reported failure.
    #[error("`{command}` failed ({status}){}", format_stderr(.stderr))]
    Failed {
        command: String,
        status: String,
        stderr: String,
    },
}

fn format_stderr(stderr: &str) -> String {
    if stderr.is_empty() {
        String::new()
    } else {
        format!(": {stderr}")
    }
}

/// OS-level bring-down / bitrate / bring-up of one interface.
///
/// The lifecycle decides which failures are fatal; implementations only
/// report them.
pub trait LinkConfigurator {
    fn bring_down(&mut self, link: &str) -> Result<(), ConfigureError>;

    fn set_bitrate(&mut self, link: &str, bitrate: u32) -> Result<(), ConfigureError>;

    fn bring_up(&mut self, link: &str) -> Result<(), ConfigureError>;
}

/// Configures interfaces with iproute2 (`ip link set ...`).
#[derive(Debug, Clone)]
pub struct IpLinkConfigurator {
    program: OsString,
}

impl Default for IpLinkConfigurator {
    fn default() -> Self {
        Self {
            program: OsString::from("ip"),
        }
    }
}

impl IpLinkConfigurator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a different executable in place of `ip`.
    pub fn with_program(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
        }
    }

    fn run(&self, args: &[&str]) -> Result<(), ConfigureError> {
        let command = format!("{} {}", self.program.to_string_lossy(), args.join(" "));
        debug!(%command, "running link command");

        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|source| ConfigureError::Spawn {
                command: command.clone(),
                source,
            })?;

        if output.status.success() {
            Ok(())
        } else {
            Err(ConfigureError::Failed {
                command,
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            })
        }
    }
}

impl LinkConfigurator for IpLinkConfigurator {
    fn bring_down(&mut self, link: &str) -> Result<(), ConfigureError> {
        self.run(&["link", "set", link, "down"])
    }

    fn set_bitrate(&mut self, link: &str, bitrate: u32) -> Result<(), ConfigureError> {
        let bitrate = bitrate.to_string();
        self.run(&["link", "set", link, "type", "can", "bitrate", &bitrate])
    }

    fn bring_up(&mut self, link: &str) -> Result<(), ConfigureError> {
        self.run(&["link", "set", link, "up"])
    }
}

/// One call made against a [`RecordingConfigurator`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConfigureCall {
    Down(String),
    Bitrate(String, u32),
    Up(String),
}

/// Configurator double that records calls instead of touching the OS.
///
/// Individual steps can be scripted to fail.
#[derive(Debug, Default)]
pub struct RecordingConfigurator {
    calls: Vec<ConfigureCall>,
    failing: HashSet<ConfigureCall>,
}

impl RecordingConfigurator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the matching call fail.
    pub fn fail_on(mut self, call: ConfigureCall) -> Self {
        self.failing.insert(call);
        self
    }

    /// Calls made so far, in order.
    pub fn calls(&self) -> &[ConfigureCall] {
        &self.calls
    }

    fn record(&mut self, call: ConfigureCall) -> Result<(), ConfigureError> {
        let fails = self.failing.contains(&call);
        self.calls.push(call.clone());
        if fails {
            return Err(ConfigureError::Failed {
                command: format!("{call:?}"),
                status: "exit status: 2".to_string(),
                stderr: "scripted failure".to_string(),
            });
        }
        Ok(())
    }
}

impl LinkConfigurator for RecordingConfigurator {
    fn bring_down(&mut self, link: &str) -> Result<(), ConfigureError> {
        self.record(ConfigureCall::Down(link.to_string()))
    }

    fn set_bitrate(&mut self, link: &str, bitrate: u32) -> Result<(), ConfigureError> {
        self.record(ConfigureCall::Bitrate(link.to_string(), bitrate))
    }

    fn bring_up(&mut self, link: &str) -> Result<(), ConfigureError> {
        self.record(ConfigureCall::Up(link.to_string()))
    }
}
