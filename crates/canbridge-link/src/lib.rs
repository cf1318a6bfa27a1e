//! CAN link abstraction.
//!
//! A [`Link`] owns one receive/transmit endpoint. Receive and transmit never
//! block: an empty socket yields `Ok(None)` and a busy destination yields an
//! error for that one frame.
//!
//! - [`CanSocket`] is a raw SocketCAN endpoint (Linux)
//! - [`FdPoller`] waits for readability on any descriptor-backed link
//!
//! This is the lowest layer of canbridge that touches the OS.

pub mod error;
pub mod traits;

#[cfg(unix)]
pub mod poll;
#[cfg(target_os = "linux")]
pub mod socketcan;

pub use error::{LinkError, Result};
pub use traits::{Link, LinkState, Poller};

#[cfg(unix)]
pub use poll::FdPoller;
#[cfg(target_os = "linux")]
pub use socketcan::CanSocket;
