use std::time::Duration;

use canbridge_link::{Link, LinkState, Poller};
use tracing::{debug, info, warn};

use crate::error::{Result, RouterError};
use crate::lifecycle::ShutdownSignal;
use crate::observer::FrameObserver;
use crate::policy::ForwardingTable;

/// Upper bound on one readiness wait, and so on shutdown latency.
pub const DEFAULT_POLL_TIMEOUT: Duration = Duration::from_secs(1);

/// Router lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouterState {
    /// Constructed; the loop has not started.
    Idle,
    /// Polling and dispatching.
    Running,
    /// Shutdown observed; finishing the current iteration.
    Draining,
    /// All links closed.
    Stopped,
}

/// Controls router behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouterConfig {
    /// Readiness wait timeout.
    pub poll_timeout: Duration,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            poll_timeout: DEFAULT_POLL_TIMEOUT,
        }
    }
}

/// Counters kept over the life of the loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouterStats {
    pub received: u64,
    pub forwarded: u64,
    pub forward_failures: u64,
    pub receive_errors: u64,
    pub idle_timeouts: u64,
}

/// Single-threaded poll/dispatch loop over a fixed set of links.
pub struct Router<L, P, O> {
    links: Vec<L>,
    table: ForwardingTable,
    poller: P,
    observer: O,
    config: RouterConfig,
    state: RouterState,
    stats: RouterStats,
}

impl<L: Link, P: Poller<L>, O: FrameObserver> Router<L, P, O> {
    /// Build a router. `links` must be in the same order as the table's names.
    pub fn new(links: Vec<L>, table: ForwardingTable, poller: P, observer: O) -> Result<Self> {
        let actual: Vec<String> = links.iter().map(|l| l.name().to_string()).collect();
        if actual != table.names() {
            return Err(RouterError::LinkMismatch {
                expected: table.names().to_vec(),
                actual,
            });
        }

        Ok(Self {
            links,
            table,
            poller,
            observer,
            config: RouterConfig::default(),
            state: RouterState::Idle,
            stats: RouterStats::default(),
        })
    }

    /// Override router config.
    pub fn with_config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    pub fn state(&self) -> RouterState {
        self.state
    }

    pub fn stats(&self) -> RouterStats {
        self.stats
    }

    pub fn links(&self) -> &[L] {
        &self.links
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn table(&self) -> &ForwardingTable {
        &self.table
    }

    /// Run until `shutdown` is requested or the readiness wait fails.
    ///
    /// Every link must be open. Links are closed before this returns, on
    /// both the clean and the error path.
    pub fn run(&mut self, shutdown: &ShutdownSignal) -> Result<RouterStats> {
        if self.state != RouterState::Idle {
            return Err(RouterError::NotIdle(self.state));
        }
        if let Some(link) = self.links.iter().find(|l| l.state() != LinkState::Open) {
            return Err(RouterError::LinkNotOpen(link.name().to_string()));
        }

        self.state = RouterState::Running;
        info!(
            links = self.links.len(),
            rules = self.table.rules().count(),
            timeout_ms = self.config.poll_timeout.as_millis() as u64,
            "routing started"
        );

        let result = loop {
            if shutdown.is_requested() {
                break Ok(());
            }
            if let Err(err) = self.poll_once() {
                break Err(err);
            }
        };

        self.state = RouterState::Draining;
        debug!("draining router");
        self.stop();

        result.map(|()| self.stats)
    }

    /// One loop iteration: wait, then service every ready link.
    ///
    /// Returns the number of frames received.
    pub fn poll_once(&mut self) -> Result<usize> {
        let ready = self
            .poller
            .poll_readable(&self.links, self.config.poll_timeout)
            .map_err(RouterError::Poll)?;

        if ready.is_empty() {
            self.stats.idle_timeouts += 1;
            return Ok(0);
        }

        let mut received = 0;
        for index in ready {
            if self.service(index) {
                received += 1;
            }
        }
        Ok(received)
    }

    /// Close every link. Idempotent.
    pub fn stop(&mut self) {
        if self.state == RouterState::Stopped {
            return;
        }
        for link in &mut self.links {
            link.close();
        }
        self.state = RouterState::Stopped;

        let stats = self.stats;
        info!(
            received = stats.received,
            forwarded = stats.forwarded,
            forward_failures = stats.forward_failures,
            receive_errors = stats.receive_errors,
            "routing stopped"
        );
    }

    fn service(&mut self, index: usize) -> bool {
        let Some(link) = self.links.get_mut(index) else {
            return false;
        };

        let frame = match link.receive() {
            Ok(Some(frame)) => frame,
            Ok(None) => return false,
            Err(err) => {
                self.stats.receive_errors += 1;
                warn!(link = self.table.name(index), error = %err, "receive failed");
                return false;
            }
        };

        self.stats.received += 1;
        let source = self.table.name(index);
        self.observer.observe(source, &frame);

        for &destination in self.table.destinations(index) {
            let target = self.table.name(destination);
            let outcome = match self.links.get_mut(destination) {
                Some(link) => link.transmit(&frame),
                None => continue,
            };
            match &outcome {
                Ok(()) => self.stats.forwarded += 1,
                Err(err) => {
                    self.stats.forward_failures += 1;
                    warn!(source, destination = target, error = %err, "forward failed");
                }
            }
            self.observer.forwarded(source, target, outcome.as_ref().map(|_| ()));
        }

        true
    }
}
