use crate::buttons::{ButtonStates, BUTTON_COUNT};
use crate::message::{ButtonReport, DecodedMessage, KeypadReport};

/// Bytes 0-1 carry the eight 2-bit button fields.
pub const KEYPAD_MIN_LEN: usize = 2;

/// The only field value that means "pressed". `00`, `10` and `11` all read
/// as released.
const FIELD_PRESSED: u16 = 0b01;

/// Decode a keypad frame and fold it into `states`.
///
/// Field `i` occupies bits `[2i, 2i+1]` of the little-endian word in bytes
/// 0-1. Returns `None` if the payload is too short.
pub fn decode_keypad(payload: &[u8], states: &mut ButtonStates) -> Option<DecodedMessage> {
    let word = u16::from_le_bytes([*payload.first()?, *payload.get(1)?]);

    let mut report = KeypadReport::default();
    for index in 0..BUTTON_COUNT {
        let field = (word >> (2 * index)) & 0b11;
        let pressed = field == FIELD_PRESSED;
        states.update(index, pressed);

        if pressed {
            report.pressed.push(ButtonReport {
                index,
                changed: states.changed(index),
            });
        } else if states.changed(index) {
            report.released.push(index);
        }
    }

    Some(DecodedMessage::Keypad(report))
}
