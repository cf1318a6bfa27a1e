use crate::buttons::ButtonStates;
use crate::message::{DecodedMessage, TorqueSpeedRequest};

/// Mode, speed and torque must be present. Priority is optional.
pub const TORQUE_SPEED_MIN_LEN: usize = 4;

const SPEED_RPM_PER_BIT: f64 = 0.125;
const TORQUE_OFFSET_PERCENT: i16 = -125;

/// Decode a torque/speed control request.
///
/// Byte 0 is the override mode, bytes 1-2 the little-endian speed, byte 3
/// the offset torque and the low two bits of byte 4 the priority. A 4-byte
/// payload reports priority 0.
pub fn decode_torque_speed(payload: &[u8], _states: &mut ButtonStates) -> Option<DecodedMessage> {
    let header = payload.get(..TORQUE_SPEED_MIN_LEN)?;

    let raw_speed = u16::from_le_bytes([header[1], header[2]]);
    let request = TorqueSpeedRequest {
        override_mode: header[0],
        speed_rpm: f64::from(raw_speed) * SPEED_RPM_PER_BIT,
        torque_percent: i16::from(header[3]) + TORQUE_OFFSET_PERCENT,
        priority: payload.get(4).map_or(0, |b| b & 0b11),
    };

    Some(DecodedMessage::TorqueSpeed(request))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(payload: &[u8]) -> TorqueSpeedRequest {
        match decode_torque_speed(payload, &mut ButtonStates::new()) {
            Some(DecodedMessage::TorqueSpeed(req)) => req,
            other => panic!("expected torque/speed request, got {other:?}"),
        }
    }

    #[test]
    fn decodes_reference_payload() {
        let req = request(&[0x00, 0x00, 0x08, 0x7D, 0x00]);
        assert_eq!(req.override_mode, 0);
        assert_eq!(req.speed_rpm, 256.0);
        assert_eq!(req.torque_percent, 0);
        assert_eq!(req.priority, 0);
    }

    #[test]
    fn decodes_range_extremes() {
        let max = request(&[0xAB, 0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(max.override_mode, 0xAB);
        assert_eq!(max.speed_rpm, 8191.875);
        assert_eq!(max.torque_percent, 130);
        assert_eq!(max.priority, 3);

        let min = request(&[0x00, 0x00, 0x00, 0x00, 0x00]);
        assert_eq!(min.speed_rpm, 0.0);
        assert_eq!(min.torque_percent, -125);
    }

    #[test]
    fn priority_uses_low_two_bits() {
        assert_eq!(request(&[0, 0, 0, 0x7D, 0b1111_1110]).priority, 2);
    }

    #[test]
    fn four_byte_payload_reports_priority_zero() {
        assert_eq!(request(&[0, 0, 0, 0x7D]).priority, 0);
    }

    #[test]
    fn short_payload_returns_none() {
        assert!(decode_torque_speed(&[0, 0, 0], &mut ButtonStates::new()).is_none());
    }
}
