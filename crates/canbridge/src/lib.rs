//! CAN frame routing and diagnostic decoding.
//!
//! canbridge reads classic CAN frames from several SocketCAN links, forwards
//! them along a static table, and decodes known identifiers for display.
//!
//! # Crate Structure
//!
//! - [`frame`]: CAN frame type and the 16-byte wire codec
//! - [`decode`]: Identifier-keyed decoders (keypad, torque/speed control)
//! - [`link`]: Non-blocking SocketCAN links and readiness polling
//! - [`router`]: Forwarding engine, observer and lifecycle (behind `router` feature)

/// Re-export frame types.
pub mod frame {
    pub use canbridge_frame::*;
}

/// Re-export decoder types.
pub mod decode {
    pub use canbridge_decode::*;
}

/// Re-export link types.
pub mod link {
    pub use canbridge_link::*;
}

/// Re-export router types (requires `router` feature).
#[cfg(feature = "router")]
pub mod router {
    pub use canbridge_router::*;
}
