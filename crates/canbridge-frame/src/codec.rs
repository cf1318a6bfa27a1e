use bytes::{Buf, BufMut, BytesMut};

use crate::error::{FrameError, Result};
use crate::id::{raw_id_for, CAN_EFF_FLAG, CAN_EFF_MASK, CAN_ERR_FLAG, CAN_RTR_FLAG};

/// Size of one classic CAN wire unit: id (4) + len (1) + reserved (3) + data (8).
pub const CAN_MTU: usize = 16;

/// Maximum classic CAN payload length.
pub const CAN_MAX_DLEN: usize = 8;

/// Bytes between `len` and the payload: `__pad`, `__res0`, `len8_dlc`.
const RESERVED_LEN: usize = 3;

/// A classic CAN frame.
///
/// `raw_id` and the reserved bytes are kept exactly as read so that a
/// forwarded frame is identical to the received one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    raw_id: u32,
    len: u8,
    reserved: [u8; RESERVED_LEN],
    data: [u8; CAN_MAX_DLEN],
}

impl Frame {
    /// Create a frame from a raw identifier word (flags included).
    pub fn new(raw_id: u32, payload: &[u8]) -> Result<Self> {
        if payload.len() > CAN_MAX_DLEN {
            return Err(FrameError::PayloadTooLarge {
                size: payload.len(),
                max: CAN_MAX_DLEN,
            });
        }
        let mut data = [0u8; CAN_MAX_DLEN];
        data[..payload.len()].copy_from_slice(payload);
        Ok(Self {
            raw_id,
            len: payload.len() as u8,
            reserved: [0; RESERVED_LEN],
            data,
        })
    }

    /// Create a data frame for a bare identifier, choosing the standard or
    /// extended format by value.
    pub fn with_id(id: u32, payload: &[u8]) -> Result<Self> {
        Self::new(raw_id_for(id), payload)
    }

    /// The identifier with flag bits masked off.
    pub fn id(&self) -> u32 {
        self.raw_id & CAN_EFF_MASK
    }

    /// The identifier word including flag bits.
    pub fn raw_id(&self) -> u32 {
        self.raw_id
    }

    pub fn is_extended(&self) -> bool {
        self.raw_id & CAN_EFF_FLAG != 0
    }

    pub fn is_remote(&self) -> bool {
        self.raw_id & CAN_RTR_FLAG != 0
    }

    pub fn is_error(&self) -> bool {
        self.raw_id & CAN_ERR_FLAG != 0
    }

    /// Payload length (0-8).
    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The valid payload bytes. Trailing buffer bytes are not included.
    pub fn data(&self) -> &[u8] {
        &self.data[..self.len as usize]
    }

    /// Raw DLC (9-15) of an 8-byte frame, or 0 when the sender did not set one.
    pub fn len8_dlc(&self) -> u8 {
        self.reserved[RESERVED_LEN - 1]
    }
}

/// Encode a frame into one wire unit.
///
/// Wire format:
/// ```text
/// ┌──────────────┬─────────┬──────────────┬──────────────────┐
/// │ can_id (4B)  │ len (1B)│ reserved (3B)│ data (8B)        │
/// │ host order   │ 0..=8   │ as read      │ as read          │
/// └──────────────┴─────────┴──────────────┴──────────────────┘
/// ```
pub fn encode_frame(frame: &Frame, dst: &mut BytesMut) {
    dst.reserve(CAN_MTU);
    dst.put_u32_ne(frame.raw_id);
    dst.put_u8(frame.len);
    dst.put_slice(&frame.reserved);
    dst.put_slice(&frame.data);
}

/// Decode one wire unit.
///
/// A buffer shorter than [`CAN_MTU`] is a protocol violation for that call.
pub fn decode_frame(mut src: &[u8]) -> Result<Frame> {
    if src.len() < CAN_MTU {
        return Err(FrameError::Truncated {
            expected: CAN_MTU,
            actual: src.len(),
        });
    }

    let raw_id = src.get_u32_ne();
    let len = src.get_u8();
    if len as usize > CAN_MAX_DLEN {
        return Err(FrameError::InvalidLength(len));
    }
    let mut reserved = [0u8; RESERVED_LEN];
    src.copy_to_slice(&mut reserved);

    let mut data = [0u8; CAN_MAX_DLEN];
    src.copy_to_slice(&mut data);

    Ok(Frame {
        raw_id,
        len,
        reserved,
        data,
    })
}

/// Space-separated upper-case hex bytes, e.g. `01 00 7D`.
pub fn format_hex(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len() * 3);
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 {
            out.push(' ');
        }
        out.push_str(&format!("{byte:02X}"));
    }
    out
}
