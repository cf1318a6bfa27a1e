//! Identifier word layout.
//!
//! Bits 0-28 carry the identifier, bits 29-31 carry the SocketCAN flags.
//! Standard frames only use the low 11 bits.

/// Extended frame format (29-bit identifier).
pub const CAN_EFF_FLAG: u32 = 0x8000_0000;

/// Remote transmission request.
pub const CAN_RTR_FLAG: u32 = 0x4000_0000;

/// Error message frame.
pub const CAN_ERR_FLAG: u32 = 0x2000_0000;

/// Standard frame format identifier mask.
pub const CAN_SFF_MASK: u32 = 0x0000_07FF;

/// Extended frame format identifier mask.
pub const CAN_EFF_MASK: u32 = 0x1FFF_FFFF;

/// Builds the raw identifier word for `id`, setting the EFF flag when the
/// identifier does not fit in 11 bits.
pub fn raw_id_for(id: u32) -> u32 {
    let id = id & CAN_EFF_MASK;
    if id > CAN_SFF_MASK {
        id | CAN_EFF_FLAG
    } else {
        id
    }
}
