use std::time::Duration;

use canbridge_frame::Frame;

use crate::error::Result;

/// Readiness of a link over its lifetime.
///
/// `Closed → Configuring → Open → Closed`. A link is configured and opened
/// once at startup and closed once at shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkState {
    Closed,
    Configuring,
    Open,
}

impl LinkState {
    pub fn as_str(self) -> &'static str {
        match self {
            LinkState::Closed => "closed",
            LinkState::Configuring => "configuring",
            LinkState::Open => "open",
        }
    }
}

impl std::fmt::Display for LinkState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One receive/transmit endpoint.
pub trait Link {
    /// Interface name, used in diagnostics and routing tables.
    fn name(&self) -> &str;

    fn state(&self) -> LinkState;

    /// Receive one frame without blocking.
    ///
    /// Returns `Ok(None)` when nothing is currently available.
    fn receive(&mut self) -> Result<Option<Frame>>;

    /// Transmit one frame without blocking. Failure affects this frame only.
    fn transmit(&mut self, frame: &Frame) -> Result<()>;

    /// Release the endpoint. Calling it again has no effect.
    fn close(&mut self);
}

/// Waits until at least one link is readable.
pub trait Poller<L> {
    /// Returns the indices of readable links.
    ///
    /// An empty vector means the timeout elapsed or the wait was interrupted;
    /// callers treat both the same way.
    fn poll_readable(&mut self, links: &[L], timeout: Duration) -> std::io::Result<Vec<usize>>;
}
