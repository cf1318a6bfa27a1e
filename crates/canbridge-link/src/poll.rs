use std::io;
use std::os::fd::AsRawFd;
use std::time::Duration;

use tracing::trace;

use crate::traits::Poller;

/// `poll(2)`-based readiness wait over descriptor-backed links.
///
/// Closed links report a negative descriptor, which `poll` skips.
#[derive(Debug, Default, Clone, Copy)]
pub struct FdPoller;

impl FdPoller {
    pub fn new() -> Self {
        Self
    }
}

impl<L: AsRawFd> Poller<L> for FdPoller {
    fn poll_readable(&mut self, links: &[L], timeout: Duration) -> io::Result<Vec<usize>> {
        let mut fds: Vec<libc::pollfd> = links
            .iter()
            .map(|link| libc::pollfd {
                fd: link.as_raw_fd(),
                events: libc::POLLIN,
                revents: 0,
            })
            .collect();

        let timeout_ms = libc::c_int::try_from(timeout.as_millis()).unwrap_or(libc::c_int::MAX);

        // SAFETY: `fds` is a valid, writable array of `fds.len()` pollfd
        // entries that outlives the call.
        let rc = unsafe { libc::poll(fds.as_mut_ptr(), fds.len() as libc::nfds_t, timeout_ms) };

        if rc < 0 {
            let err = io::Error::last_os_error();
            if err.kind() == io::ErrorKind::Interrupted {
                trace!("poll interrupted by signal");
                return Ok(Vec::new());
            }
            return Err(err);
        }

        if rc == 0 {
            return Ok(Vec::new());
        }

        Ok(fds
            .iter()
            .enumerate()
            .filter(|(_, pfd)| pfd.revents & (libc::POLLIN | libc::POLLERR | libc::POLLHUP) != 0)
            .map(|(index, _)| index)
            .collect())
    }
}
