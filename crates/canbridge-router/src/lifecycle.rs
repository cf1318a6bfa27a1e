use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use canbridge_link::{Link, LinkError, LinkState, Poller};
use tracing::{debug, error, info, warn};

use crate::config::LinkConfig;
use crate::configure::LinkConfigurator;
use crate::error::{LifecycleError, RouterError};
use crate::observer::FrameObserver;
use crate::router::{Router, RouterStats};

/// Pause between interface configuration and opening sockets.
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(100);

/// Cooperative shutdown request.
///
/// The only state shared with signal context: an atomic flag, set from the
/// handler and checked by the routing loop once per iteration.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignal {
    requested: Arc<AtomicBool>,
}

impl ShutdownSignal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the loop to stop after its current iteration.
    pub fn request(&self) {
        self.requested.store(true, Ordering::SeqCst);
    }

    pub fn is_requested(&self) -> bool {
        self.requested.load(Ordering::SeqCst)
    }
}

/// A bitrate step failed; the link may still be usable as configured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigurationWarning {
    pub link: String,
    pub bitrate: u32,
    pub reason: String,
}

impl fmt::Display for ConfigurationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "failed to configure {} bitrate {}: {}",
            self.link, self.bitrate, self.reason
        )
    }
}

/// Startup ordering and shutdown for the configured links.
///
/// Links are configured, then opened, then handed to a router. Any failure
/// before the loop is fatal. After the loop every link is closed once.
#[derive(Debug)]
pub struct Lifecycle {
    links: Vec<LinkConfig>,
    states: Vec<LinkState>,
    settle_delay: Duration,
}

impl Lifecycle {
    pub fn new(links: Vec<LinkConfig>) -> Self {
        let states = vec![LinkState::Closed; links.len()];
        Self {
            links,
            states,
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }

    /// Override the post-configuration settle delay.
    pub fn with_settle_delay(mut self, delay: Duration) -> Self {
        self.settle_delay = delay;
        self
    }

    /// Tracked state of link `name`.
    pub fn state(&self, name: &str) -> Option<LinkState> {
        self.links
            .iter()
            .position(|l| l.name == name)
            .map(|i| self.states[i])
    }

    /// Bring every link with a bitrate down, set its bitrate and bring it up.
    ///
    /// A failed bring-down is ignored and a failed bitrate step is returned
    /// as a warning. A failed bring-up aborts before later links are touched.
    pub fn configure<C: LinkConfigurator + ?Sized>(
        &mut self,
        configurator: &mut C,
    ) -> Result<Vec<ConfigurationWarning>, LifecycleError> {
        let mut warnings = Vec::new();
        let mut configured = 0usize;

        for (index, link) in self.links.iter().enumerate() {
            let Some(bitrate) = link.bitrate else {
                debug!(link = %link.name, "no bitrate configured; leaving interface as is");
                continue;
            };
            self.states[index] = LinkState::Configuring;
            info!(link = %link.name, bitrate, "configuring link");

            if let Err(err) = configurator.bring_down(&link.name) {
                debug!(link = %link.name, error = %err, "bring-down failed; continuing");
            }

            if let Err(err) = configurator.set_bitrate(&link.name, bitrate) {
                let warning = ConfigurationWarning {
                    link: link.name.clone(),
                    bitrate,
                    reason: err.to_string(),
                };
                warn!(link = %link.name, bitrate, error = %err, "bitrate configuration failed");
                warnings.push(warning);
            }

            if let Err(source) = configurator.bring_up(&link.name) {
                error!(link = %link.name, error = %source, "bring-up failed");
                self.states[index] = LinkState::Closed;
                return Err(LifecycleError::BringUp {
                    link: link.name.clone(),
                    source,
                });
            }

            configured += 1;
            info!(link = %link.name, bitrate, "link configured");
        }

        if configured > 0 && !self.settle_delay.is_zero() {
            std::thread::sleep(self.settle_delay);
        }

        Ok(warnings)
    }

    /// Open every link in order with `open`.
    ///
    /// If one fails, the links already opened are closed and the error is
    /// returned: the engine never runs on a partial link set.
    pub fn open<L, F>(&mut self, mut open: F) -> Result<Vec<L>, LifecycleError>
    where
        L: Link,
        F: FnMut(&str) -> Result<L, LinkError>,
    {
        let mut opened: Vec<L> = Vec::with_capacity(self.links.len());

        for (index, config) in self.links.iter().enumerate() {
            match open(&config.name) {
                Ok(link) => {
                    self.states[index] = LinkState::Open;
                    opened.push(link);
                }
                Err(err) => {
                    error!(link = %config.name, error = %err, "failed to open link");
                    for link in &mut opened {
                        link.close();
                    }
                    self.states.fill(LinkState::Closed);
                    return Err(LifecycleError::LinkUnavailable(err));
                }
            }
        }

        info!(links = opened.len(), "all links open");
        Ok(opened)
    }

    /// Run `router` until shutdown, then make sure every link is closed.
    pub fn run<L, P, O>(
        &mut self,
        router: &mut Router<L, P, O>,
        shutdown: &ShutdownSignal,
    ) -> Result<RouterStats, RouterError>
    where
        L: Link,
        P: Poller<L>,
        O: FrameObserver,
    {
        let result = router.run(shutdown);
        router.stop();
        self.states.fill(LinkState::Closed);
        result
    }
}

#[cfg(test)]
mod tests {
    use canbridge_frame::Frame;

    use super::*;
    use crate::config::Policy;
    use crate::configure::{ConfigureCall, RecordingConfigurator};
    use crate::policy::ForwardingTable;

    fn default_links() -> Vec<LinkConfig> {
        vec![
            LinkConfig::new("canfd1", Some(250_000)),
            LinkConfig::new("canfd2", Some(500_000)),
            LinkConfig::new("canfd3", Some(500_000)),
        ]
    }

    fn lifecycle() -> Lifecycle {
        Lifecycle::new(default_links()).with_settle_delay(Duration::ZERO)
    }

    #[test]
    fn configures_each_link_down_bitrate_up() {
        let mut configurator = RecordingConfigurator::new();
        let warnings = lifecycle().configure(&mut configurator).unwrap();

        assert!(warnings.is_empty());
        assert_eq!(
            configurator.calls(),
            &[
                ConfigureCall::Down("canfd1".into()),
                ConfigureCall::Bitrate("canfd1".into(), 250_000),
                ConfigureCall::Up("canfd1".into()),
                ConfigureCall::Down("canfd2".into()),
                ConfigureCall::Bitrate("canfd2".into(), 500_000),
                ConfigureCall::Up("canfd2".into()),
                ConfigureCall::Down("canfd3".into()),
                ConfigureCall::Bitrate("canfd3".into(), 500_000),
                ConfigureCall::Up("canfd3".into()),
            ]
        );
    }

    #[test]
    fn bitrate_failure_is_a_warning() {
        let mut configurator = RecordingConfigurator::new()
            .fail_on(ConfigureCall::Down("canfd1".into()))
            .fail_on(ConfigureCall::Bitrate("canfd2".into(), 500_000));
        let warnings = lifecycle().configure(&mut configurator).unwrap();

        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].link, "canfd2");
        assert_eq!(warnings[0].bitrate, 500_000);
        assert!(configurator
            .calls()
            .contains(&ConfigureCall::Up("canfd2".into())));
    }

    #[test]
    fn bring_up_failure_is_fatal_and_stops_sequence() {
        let mut configurator =
            RecordingConfigurator::new().fail_on(ConfigureCall::Up("canfd2".into()));
        let mut lifecycle = lifecycle();
        let err = lifecycle.configure(&mut configurator).unwrap_err();

        assert!(matches!(err, LifecycleError::BringUp { ref link, .. } if link == "canfd2"));
        assert!(!configurator
            .calls()
            .iter()
            .any(|c| matches!(c, ConfigureCall::Down(name) if name == "canfd3")));
        assert_eq!(lifecycle.state("canfd1"), Some(LinkState::Configuring));
        assert_eq!(lifecycle.state("canfd2"), Some(LinkState::Closed));
    }

    #[test]
    fn links_without_bitrate_are_not_configured() {
        let mut configurator = RecordingConfigurator::new();
        let mut lifecycle = Lifecycle::new(vec![LinkConfig::new("vcan0", None)]);
        lifecycle.configure(&mut configurator).unwrap();
        assert!(configurator.calls().is_empty());
    }

    struct CountingLink {
        name: String,
        closes: usize,
    }

    impl Link for CountingLink {
        fn name(&self) -> &str {
            &self.name
        }

        fn state(&self) -> LinkState {
            if self.closes == 0 {
                LinkState::Open
            } else {
                LinkState::Closed
            }
        }

        fn receive(&mut self) -> Result<Option<Frame>, LinkError> {
            Ok(None)
        }

        fn transmit(&mut self, _frame: &Frame) -> Result<(), LinkError> {
            Ok(())
        }

        fn close(&mut self) {
            self.closes += 1;
        }
    }

    fn open_counting(name: &str) -> Result<CountingLink, LinkError> {
        Ok(CountingLink {
            name: name.to_string(),
            closes: 0,
        })
    }

    #[test]
    fn open_failure_closes_already_opened_links() {
        let mut lifecycle = lifecycle();
        let mut closed_early = Vec::new();

        let result = lifecycle.open(|name| {
            if name == "canfd3" {
                return Err(LinkError::Unavailable {
                    name: name.to_string(),
                    source: std::io::Error::from(std::io::ErrorKind::NotFound),
                });
            }
            closed_early.push(name.to_string());
            open_counting(name)
        });

        match result {
            Err(LifecycleError::LinkUnavailable(err)) => assert_eq!(err.link(), "canfd3"),
            Err(other) => panic!("expected LinkUnavailable, got {other:?}"),
            Ok(_) => panic!("expected open failure"),
        }
        assert_eq!(closed_early, vec!["canfd1", "canfd2"]);
        assert_eq!(lifecycle.state("canfd1"), Some(LinkState::Closed));
    }

    struct StopImmediately(ShutdownSignal);

    impl Poller<CountingLink> for StopImmediately {
        fn poll_readable(
            &mut self,
            _links: &[CountingLink],
            _timeout: Duration,
        ) -> std::io::Result<Vec<usize>> {
            self.0.request();
            Ok(Vec::new())
        }
    }

    struct NullObserver;

    impl FrameObserver for NullObserver {
        fn observe(&mut self, _source: &str, _frame: &Frame) {}

        fn forwarded(
            &mut self,
            _source: &str,
            _destination: &str,
            _outcome: Result<(), &LinkError>,
        ) {
        }
    }

    #[test]
    fn run_closes_every_link_exactly_once() {
        let mut lifecycle = lifecycle();
        let links = lifecycle.open(open_counting).unwrap();
        assert_eq!(lifecycle.state("canfd2"), Some(LinkState::Open));

        let shutdown = ShutdownSignal::new();
        let names: Vec<String> = default_links().into_iter().map(|l| l.name).collect();
        let table = ForwardingTable::resolve(&Policy::Forward, &names).unwrap();
        let mut router =
            Router::new(links, table, StopImmediately(shutdown.clone()), NullObserver).unwrap();

        lifecycle.run(&mut router, &shutdown).unwrap();

        assert!(router.links().iter().all(|l| l.closes == 1));
        assert_eq!(lifecycle.state("canfd3"), Some(LinkState::Closed));
    }

    #[test]
    fn shutdown_signal_is_shared_between_clones() {
        let signal = ShutdownSignal::new();
        let handler_side = signal.clone();
        assert!(!signal.is_requested());
        handler_side.request();
        assert!(signal.is_requested());
    }
}
