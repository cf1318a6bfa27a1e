//! Classic CAN frames and the SocketCAN wire unit.
//!
//! Every frame read from or written to a raw CAN socket is exactly one
//! 16-byte unit:
//! - A 4-byte identifier word in host byte order (29-bit id + flag bits)
//! - A 1-byte payload length (0-8)
//! - 3 reserved bytes
//! - An 8-byte payload buffer
//!
//! Frames are plain `Copy` values. Forwarding copies, never mutates.

pub mod codec;
pub mod error;
pub mod id;

pub use codec::{decode_frame, encode_frame, format_hex, Frame, CAN_MAX_DLEN, CAN_MTU};
pub use error::{FrameError, Result};
pub use id::{CAN_EFF_FLAG, CAN_EFF_MASK, CAN_ERR_FLAG, CAN_RTR_FLAG, CAN_SFF_MASK};
