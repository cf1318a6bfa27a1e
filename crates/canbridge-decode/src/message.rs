use std::fmt;

use serde::Serialize;

/// Engineering values extracted from a recognized frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DecodedMessage {
    Keypad(KeypadReport),
    TorqueSpeed(TorqueSpeedRequest),
}

impl fmt::Display for DecodedMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DecodedMessage::Keypad(report) => report.fmt(f),
            DecodedMessage::TorqueSpeed(request) => request.fmt(f),
        }
    }
}

/// A pressed button and whether it flipped on this frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ButtonReport {
    pub index: usize,
    pub changed: bool,
}

/// Keypad state after applying one frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct KeypadReport {
    /// Every button currently pressed, ascending.
    pub pressed: Vec<ButtonReport>,
    /// Buttons that went from pressed to released on this frame.
    pub released: Vec<usize>,
}

impl KeypadReport {
    /// Whether any button flipped on this frame.
    pub fn any_changed(&self) -> bool {
        !self.released.is_empty() || self.pressed.iter().any(|b| b.changed)
    }
}

impl fmt::Display for KeypadReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "keypad: pressed [")?;
        for (i, button) in self.pressed.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", button.index)?;
            if button.changed {
                write!(f, "*")?;
            }
        }
        write!(f, "] released [")?;
        for (i, index) in self.released.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{index}")?;
        }
        write!(f, "]")
    }
}

/// Torque/speed control request (TSC1).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TorqueSpeedRequest {
    /// Override control mode byte, passed through unchanged.
    pub override_mode: u8,
    /// Requested speed, 0.125 rpm/bit.
    pub speed_rpm: f64,
    /// Requested torque, -125..=130 %.
    pub torque_percent: i16,
    /// Control priority, 0-3.
    pub priority: u8,
}

impl fmt::Display for TorqueSpeedRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "torque/speed: mode=0x{:02X} speed={:.3} rpm torque={}% priority={}",
            self.override_mode, self.speed_rpm, self.torque_percent, self.priority
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keypad_line_marks_changed_buttons() {
        let report = KeypadReport {
            pressed: vec![
                ButtonReport {
                    index: 0,
                    changed: true,
                },
                ButtonReport {
                    index: 5,
                    changed: false,
                },
            ],
            released: vec![2],
        };
        assert_eq!(report.to_string(), "keypad: pressed [0*, 5] released [2]");
        assert!(report.any_changed());
    }

    #[test]
    fn torque_speed_line() {
        let msg = DecodedMessage::TorqueSpeed(TorqueSpeedRequest {
            override_mode: 0x01,
            speed_rpm: 256.0,
            torque_percent: -5,
            priority: 2,
        });
        assert_eq!(
            msg.to_string(),
            "torque/speed: mode=0x01 speed=256.000 rpm torque=-5% priority=2"
        );
    }

    #[test]
    fn serializes_with_kind_tag() {
        let msg = DecodedMessage::Keypad(KeypadReport::default());
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["kind"], "keypad");
        assert!(value["pressed"].as_array().unwrap().is_empty());
    }
}
