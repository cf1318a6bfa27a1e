use canbridge_frame::FrameError;

/// Errors that can occur in link operations.
#[derive(Debug, thiserror::Error)]
pub enum LinkError {
    /// The interface could not be located or bound.
    #[error("link {name} unavailable: {source}")]
    Unavailable {
        name: String,
        source: std::io::Error,
    },

    /// The interface name does not fit the kernel's name buffer.
    #[error("interface name too long ({len} bytes, max {max}): {name}")]
    NameTooLong { name: String, len: usize, max: usize },

    /// Reading from the link failed.
    #[error("read from {link} failed: {source}")]
    ReadFailed {
        link: String,
        source: std::io::Error,
    },

    /// Writing to the link failed (e.g. the destination is not ready).
    #[error("write to {link} failed: {source}")]
    WriteFailed {
        link: String,
        source: std::io::Error,
    },

    /// A short or otherwise malformed unit was read.
    #[error("malformed frame on {link}: {source}")]
    MalformedFrame { link: String, source: FrameError },

    /// Fewer bytes than one full unit were written.
    #[error("short write to {link} ({written} of {expected} bytes)")]
    ShortWrite {
        link: String,
        written: usize,
        expected: usize,
    },

    /// The link has been closed.
    #[error("link {link} is closed")]
    Closed { link: String },
}

impl LinkError {
    /// Name of the link the error belongs to.
    pub fn link(&self) -> &str {
        match self {
            LinkError::Unavailable { name, .. } | LinkError::NameTooLong { name, .. } => name,
            LinkError::ReadFailed { link, .. }
            | LinkError::WriteFailed { link, .. }
            | LinkError::MalformedFrame { link, .. }
            | LinkError::ShortWrite { link, .. }
            | LinkError::Closed { link } => link,
        }
    }
}

pub type Result<T> = std::result::Result<T, LinkError>;
