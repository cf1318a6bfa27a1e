use std::ffi::CString;
use std::io;
use std::os::fd::{AsRawFd, FromRawFd, OwnedFd, RawFd};

use bytes::BytesMut;
use canbridge_frame::{decode_frame, encode_frame, Frame, CAN_MTU};
use tracing::{debug, info};

use crate::error::{LinkError, Result};
use crate::traits::{Link, LinkState};

/// `struct sockaddr_can` with the protocol-specific address left zeroed.
/// Raw sockets only read the family and interface index.
#[repr(C)]
struct SockaddrCan {
    can_family: libc::sa_family_t,
    can_ifindex: libc::c_int,
    can_addr: [u8; 16],
}

/// A raw SocketCAN endpoint bound to one interface.
///
/// The socket is non-blocking: reads and writes move exactly one
/// [`CAN_MTU`]-byte unit or fail for that call.
pub struct CanSocket {
    name: String,
    fd: Option<OwnedFd>,
    tx_buf: BytesMut,
}

impl CanSocket {
    /// Interface names must leave room for the trailing NUL.
    pub const MAX_NAME_LEN: usize = libc::IFNAMSIZ - 1;

    /// Create a raw CAN socket and bind it to interface `name`.
    pub fn open(name: &str) -> Result<Self> {
        if name.len() > Self::MAX_NAME_LEN {
            return Err(LinkError::NameTooLong {
                name: name.to_string(),
                len: name.len(),
                max: Self::MAX_NAME_LEN,
            });
        }
        let unavailable = |source: io::Error| LinkError::Unavailable {
            name: name.to_string(),
            source,
        };

        let c_name = CString::new(name).map_err(|_| {
            unavailable(io::Error::new(
                io::ErrorKind::InvalidInput,
                "interface name contains NUL",
            ))
        })?;

        // SAFETY: plain socket(2) call; the result is checked before use.
        let raw = unsafe {
            libc::socket(
                libc::PF_CAN,
                libc::SOCK_RAW | libc::SOCK_NONBLOCK | libc::SOCK_CLOEXEC,
                libc::CAN_RAW,
            )
        };
        if raw < 0 {
            return Err(unavailable(io::Error::last_os_error()));
        }
        // SAFETY: `raw` is a freshly created descriptor owned by nobody else.
        let fd = unsafe { OwnedFd::from_raw_fd(raw) };

        // SAFETY: `c_name` is a valid NUL-terminated string for the call.
        let ifindex = unsafe { libc::if_nametoindex(c_name.as_ptr()) };
        if ifindex == 0 {
            return Err(unavailable(io::Error::last_os_error()));
        }

        let addr = SockaddrCan {
            can_family: libc::AF_CAN as libc::sa_family_t,
            can_ifindex: ifindex as libc::c_int,
            can_addr: [0; 16],
        };
        // SAFETY: `addr` is a properly initialized sockaddr_can-compatible
        // struct and the length passed matches its size.
        let rc = unsafe {
            libc::bind(
                fd.as_raw_fd(),
                (&addr as *const SockaddrCan).cast::<libc::sockaddr>(),
                std::mem::size_of::<SockaddrCan>() as libc::socklen_t,
            )
        };
        if rc < 0 {
            return Err(unavailable(io::Error::last_os_error()));
        }

        info!(link = name, ifindex, "opened CAN link");

        Ok(Self {
            name: name.to_string(),
            fd: Some(fd),
            tx_buf: BytesMut::with_capacity(CAN_MTU),
        })
    }

    fn open_fd(&self) -> Result<RawFd> {
        self.fd
            .as_ref()
            .map(AsRawFd::as_raw_fd)
            .ok_or_else(|| LinkError::Closed {
                link: self.name.clone(),
            })
    }
}

impl Link for CanSocket {
    fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> LinkState {
        if self.fd.is_some() {
            LinkState::Open
        } else {
            LinkState::Closed
        }
    }

    fn receive(&mut self) -> Result<Option<Frame>> {
        let fd = self.open_fd()?;
        let mut unit = [0u8; CAN_MTU];

        // SAFETY: `unit` is a writable buffer of exactly CAN_MTU bytes.
        let n = unsafe { libc::read(fd, unit.as_mut_ptr().cast::<libc::c_void>(), CAN_MTU) };
        if n < 0 {
            let err = io::Error::last_os_error();
            return match err.kind() {
                io::ErrorKind::WouldBlock | io::ErrorKind::Interrupted => Ok(None),
                _ => Err(LinkError::ReadFailed {
                    link: self.name.clone(),
                    source: err,
                }),
            };
        }

        decode_frame(&unit[..n as usize])
            .map(Some)
            .map_err(|source| LinkError::MalformedFrame {
                link: self.name.clone(),
                source,
            })
    }

    fn transmit(&mut self, frame: &Frame) -> Result<()> {
        let fd = self.open_fd()?;
        self.tx_buf.clear();
        encode_frame(frame, &mut self.tx_buf);

        // SAFETY: `tx_buf` holds exactly one encoded unit for the call.
        let n = unsafe {
            libc::write(
                fd,
                self.tx_buf.as_ptr().cast::<libc::c_void>(),
                self.tx_buf.len(),
            )
        };
        if n < 0 {
            return Err(LinkError::WriteFailed {
                link: self.name.clone(),
                source: io::Error::last_os_error(),
            });
        }

        let written = n as usize;
        if written < CAN_MTU {
            return Err(LinkError::ShortWrite {
                link: self.name.clone(),
                written,
                expected: CAN_MTU,
            });
        }
        Ok(())
    }

    fn close(&mut self) {
        if self.fd.take().is_some() {
            debug!(link = %self.name, "closed CAN link");
        }
    }
}

impl AsRawFd for CanSocket {
    fn as_raw_fd(&self) -> RawFd {
        self.fd.as_ref().map_or(-1, AsRawFd::as_raw_fd)
    }
}

impl std::fmt::Debug for CanSocket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CanSocket")
            .field("name", &self.name)
            .field("state", &self.state())
            .finish()
    }
}
