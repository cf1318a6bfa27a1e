/// Number of keypad buttons tracked.
pub const BUTTON_COUNT: usize = 8;

/// Pressed/released state of each keypad button, plus whether that state
/// flipped during the most recent update.
///
/// Owned by whoever observes frames; it lives as long as that observer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ButtonStates {
    pressed: [bool; BUTTON_COUNT],
    changed: [bool; BUTTON_COUNT],
}

impl ButtonStates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a new state for `index` and record whether it flipped.
    ///
    /// Out-of-range indices are ignored.
    pub fn update(&mut self, index: usize, pressed: bool) {
        if index >= BUTTON_COUNT {
            return;
        }
        self.changed[index] = self.pressed[index] != pressed;
        self.pressed[index] = pressed;
    }

    pub fn is_pressed(&self, index: usize) -> bool {
        self.pressed.get(index).copied().unwrap_or(false)
    }

    /// Whether the button at `index` flipped on the last update.
    pub fn changed(&self, index: usize) -> bool {
        self.changed.get(index).copied().unwrap_or(false)
    }

    /// Indices of all currently pressed buttons, ascending.
    pub fn pressed_indices(&self) -> impl Iterator<Item = usize> + '_ {
        (0..BUTTON_COUNT).filter(|&i| self.pressed[i])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_released_and_unchanged() {
        let states = ButtonStates::new();
        for i in 0..BUTTON_COUNT {
            assert!(!states.is_pressed(i));
            assert!(!states.changed(i));
        }
    }

    #[test]
    fn update_flags_only_transitions() {
        let mut states = ButtonStates::new();
        states.update(3, true);
        assert!(states.is_pressed(3));
        assert!(states.changed(3));

        states.update(3, true);
        assert!(states.is_pressed(3));
        assert!(!states.changed(3));

        states.update(3, false);
        assert!(!states.is_pressed(3));
        assert!(states.changed(3));
    }

    #[test]
    fn out_of_range_index_is_ignored() {
        let mut states = ButtonStates::new();
        states.update(BUTTON_COUNT, true);
        assert!(!states.is_pressed(BUTTON_COUNT));
        assert_eq!(states.pressed_indices().count(), 0);
    }
}
