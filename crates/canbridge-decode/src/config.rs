use serde::{Deserialize, Serialize};

/// Keypad identifier: CANopen TPDO1 (0x180) of node 0x15.
pub const DEFAULT_KEYPAD_ID: u32 = 0x195;

/// Torque/speed control identifier: J1939 TSC1, priority 3, PGN 0, source 0x03.
pub const DEFAULT_CONTROL_ID: u32 = 0x0C00_0003;

/// Identifiers the built-in decoders are registered under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DecoderIds {
    /// Keypad button-state message.
    pub keypad_id: u32,
    /// Torque/speed control message.
    pub control_id: u32,
}

impl Default for DecoderIds {
    fn default() -> Self {
        Self {
            keypad_id: DEFAULT_KEYPAD_ID,
            control_id: DEFAULT_CONTROL_ID,
        }
    }
}
