use std::fmt;

use canbridge_frame::FrameError;
use canbridge_router::{LifecycleError, RouterError};

use crate::config::ConfigError;

// Exit codes follow sysexits where one fits.
pub const SUCCESS: i32 = 0;
pub const FAILURE: i32 = 1;
pub const USAGE: i32 = 64;
pub const INTERNAL: i32 = 125;

pub type CliResult<T> = Result<T, CliError>;

#[derive(Debug)]
pub struct CliError {
    pub code: i32,
    pub message: String,
}

impl CliError {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

pub fn config_error(err: ConfigError) -> CliError {
    CliError::new(USAGE, format!("invalid configuration: {err}"))
}

pub fn frame_error(context: &str, err: FrameError) -> CliError {
    CliError::new(USAGE, format!("{context}: {err}"))
}

pub fn lifecycle_error(context: &str, err: LifecycleError) -> CliError {
    CliError::new(FAILURE, format!("{context}: {err}"))
}

pub fn router_error(context: &str, err: RouterError) -> CliError {
    match err {
        RouterError::Poll(_) | RouterError::LinkNotOpen(_) => {
            CliError::new(FAILURE, format!("{context}: {err}"))
        }
        other => CliError::new(INTERNAL, format!("{context}: {other}")),
    }
}
