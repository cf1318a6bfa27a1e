use canbridge_link::LinkError;

use crate::configure::ConfigureError;
use crate::router::RouterState;

/// Errors resolving a forwarding policy against the configured links.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PolicyError {
    /// No links were configured.
    #[error("no links configured")]
    NoLinks,

    /// The same link name appears twice.
    #[error("link {0} configured more than once")]
    DuplicateLink(String),

    /// A route names a link that is not configured.
    #[error("route references unknown link {0}")]
    UnknownLink(String),

    /// A route forwards a link onto itself.
    #[error("route forwards {0} onto itself")]
    SelfLoop(String),

    /// The ring policy needs at least two links.
    #[error("ring forwarding needs at least 2 links, got {0}")]
    RingTooSmall(usize),
}

/// Errors from the routing loop.
#[derive(Debug, thiserror::Error)]
pub enum RouterError {
    /// The links handed to the router do not match the forwarding table.
    #[error("link set mismatch: table expects {expected:?}, got {actual:?}")]
    LinkMismatch {
        expected: Vec<String>,
        actual: Vec<String>,
    },

    /// A link was not open when the loop was asked to start.
    #[error("link {0} is not open")]
    LinkNotOpen(String),

    /// `run` was called outside the `Idle` state.
    #[error("router cannot start from state {0:?}")]
    NotIdle(RouterState),

    /// The readiness wait failed for a reason other than a signal.
    #[error("readiness wait failed: {0}")]
    Poll(#[source] std::io::Error),
}

/// Errors before the routing loop starts. All of them are fatal.
#[derive(Debug, thiserror::Error)]
pub enum LifecycleError {
    /// Bringing an interface up failed.
    #[error("failed to bring up {link}: {source}")]
    BringUp {
        link: String,
        source: ConfigureError,
    },

    /// A configured link could not be opened.
    #[error(transparent)]
    LinkUnavailable(#[from] LinkError),
}

pub type Result<T> = std::result::Result<T, RouterError>;
