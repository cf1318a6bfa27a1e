/// Errors that can occur during frame encoding/decoding.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FrameError {
    /// Fewer bytes than one full wire unit were available.
    #[error("truncated CAN frame ({actual} bytes, expected {expected})")]
    Truncated { expected: usize, actual: usize },

    /// The length byte of a wire unit is outside 0-8.
    #[error("invalid CAN payload length {0} (max 8)")]
    InvalidLength(u8),

    /// The payload exceeds the classic CAN maximum.
    #[error("payload too large ({size} bytes, max {max})")]
    PayloadTooLarge { size: usize, max: usize },
}

pub type Result<T> = std::result::Result<T, FrameError>;
