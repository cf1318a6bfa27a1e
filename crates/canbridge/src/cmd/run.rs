use canbridge_router::{IpLinkConfigurator, Lifecycle, ShutdownSignal};
use tracing::{info, warn};

use crate::cmd::RunArgs;
use crate::config::BridgeSettings;
use crate::exit::{lifecycle_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::OutputFormat;

pub fn run(args: RunArgs, format: OutputFormat) -> CliResult<i32> {
    let settings = args.bridge.settings()?;

    let shutdown = ShutdownSignal::new();
    install_signal_handler(shutdown.clone())?;

    info!(
        links = settings.links.len(),
        policy = settings.policy.name(),
        "canbridge starting"
    );

    let mut lifecycle =
        Lifecycle::new(settings.links.clone()).with_settle_delay(settings.settle_delay);
    if args.no_configure {
        info!("skipping link configuration");
    } else {
        let warnings = lifecycle
            .configure(&mut IpLinkConfigurator::new())
            .map_err(|err| lifecycle_error("link configuration failed", err))?;
        if !warnings.is_empty() {
            warn!(count = warnings.len(), "some links kept their previous bitrate");
        }
    }

    route(&mut lifecycle, settings, &shutdown, format)
}

#[cfg(target_os = "linux")]
fn route(
    lifecycle: &mut Lifecycle,
    settings: BridgeSettings,
    shutdown: &ShutdownSignal,
    format: OutputFormat,
) -> CliResult<i32> {
    use canbridge_decode::DecoderRegistry;
    use canbridge_link::{CanSocket, FdPoller};
    use canbridge_router::{ConsoleObserver, Router, RouterConfig};

    use crate::exit::router_error;

    let links = lifecycle
        .open(CanSocket::open)
        .map_err(|err| lifecycle_error("link initialization failed", err))?;

    let observer = ConsoleObserver::new(
        std::io::stdout(),
        format.observer_format(),
        DecoderRegistry::with_builtins(settings.decoders),
    );
    let mut router = Router::new(links, settings.table, FdPoller::new(), observer)
        .map_err(|err| router_error("router setup failed", err))?
        .with_config(RouterConfig {
            poll_timeout: settings.poll_timeout,
        });

    info!("routing; press Ctrl+C to stop");
    let stats = lifecycle
        .run(&mut router, shutdown)
        .map_err(|err| router_error("routing failed", err))?;

    info!(
        received = stats.received,
        forwarded = stats.forwarded,
        forward_failures = stats.forward_failures,
        "canbridge stopped"
    );
    Ok(SUCCESS)
}

#[cfg(not(target_os = "linux"))]
fn route(
    _lifecycle: &mut Lifecycle,
    _settings: BridgeSettings,
    _shutdown: &ShutdownSignal,
    _format: OutputFormat,
) -> CliResult<i32> {
    Err(CliError::new(
        crate::exit::FAILURE,
        "SocketCAN links are only available on Linux",
    ))
}

fn install_signal_handler(shutdown: ShutdownSignal) -> CliResult<()> {
    ctrlc::set_handler(move || {
        shutdown.request();
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}
