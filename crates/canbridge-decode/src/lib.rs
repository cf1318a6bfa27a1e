//! Identifier-keyed payload decoders.
//!
//! A [`DecoderRegistry`] maps a CAN identifier to a decode function and a
//! minimum payload length. Two decoders are built in:
//! - the keypad decoder, which tracks eight buttons in a [`ButtonStates`]
//!   vector owned by the caller
//! - the torque/speed-control (TSC1) decoder
//!
//! Decoding is pure: the only state it touches is the button vector passed in.

pub mod buttons;
pub mod config;
pub mod keypad;
pub mod message;
pub mod registry;
pub mod torque_speed;

pub use buttons::{ButtonStates, BUTTON_COUNT};
pub use config::{DecoderIds, DEFAULT_CONTROL_ID, DEFAULT_KEYPAD_ID};
pub use keypad::{decode_keypad, KEYPAD_MIN_LEN};
pub use message::{ButtonReport, DecodedMessage, KeypadReport, TorqueSpeedRequest};
pub use registry::{DecodeFn, DecodeOutcome, DecoderEntry, DecoderRegistry};
pub use torque_speed::{decode_torque_speed, TORQUE_SPEED_MIN_LEN};
