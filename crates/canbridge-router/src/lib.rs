//! Frame routing engine.
//!
//! Polls a fixed set of links, hands every received frame to a
//! [`FrameObserver`], and forwards it along a static [`ForwardingTable`].
//! Forwarding is best-effort: a destination that cannot take a frame is
//! skipped for that frame only.
//!
//! - [`Router`] runs the poll/dispatch loop (`Idle → Running → Draining → Stopped`)
//! - [`ConsoleObserver`] prints raw and decoded frame lines
//! - [`Lifecycle`] configures and opens links before the loop, closes them after
//! - [`LinkConfigurator`] is the OS bring-up boundary (`ip link`)

pub mod config;
pub mod configure;
pub mod error;
pub mod lifecycle;
pub mod observer;
pub mod policy;
pub mod router;

pub use config::{LinkConfig, Policy, Route};
pub use configure::{
    ConfigureCall, ConfigureError, IpLinkConfigurator, LinkConfigurator, RecordingConfigurator,
};
pub use error::{LifecycleError, PolicyError, Result, RouterError};
pub use lifecycle::{ConfigurationWarning, Lifecycle, ShutdownSignal, DEFAULT_SETTLE_DELAY};
pub use observer::{ConsoleObserver, FrameObserver, ObserverFormat};
pub use policy::ForwardingTable;
pub use router::{Router, RouterConfig, RouterState, RouterStats, DEFAULT_POLL_TIMEOUT};
