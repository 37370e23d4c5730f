/// hex keypad state, owned by the host and refreshed once per frame
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Keypad {
    keys: [bool; 16],
}

impl Keypad {
    pub fn clear(&mut self) {
        self.keys = [false; 16];
    }

    pub fn press(&mut self, key: u8) {
        self.keys[(key & 0xF) as usize] = true;
    }

    pub fn release(&mut self, key: u8) {
        self.keys[(key & 0xF) as usize] = false;
    }

    /// keys beyond 0xF are never pressed
    pub fn is_pressed(&self, key: u8) -> bool {
        self.keys.get(key as usize).copied().unwrap_or(false)
    }

    /// lowest-indexed key currently held down
    pub fn first_pressed(&self) -> Option<u8> {
        self.keys.iter().position(|k| *k).map(|k| k as u8)
    }
}

impl From<[bool; 16]> for Keypad {
    fn from(keys: [bool; 16]) -> Self {
        Self { keys }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_pressed_is_lowest() {
        let mut keys = Keypad::default();
        assert_eq!(keys.first_pressed(), None);
        keys.press(0xF);
        keys.press(0x3);
        assert_eq!(keys.first_pressed(), Some(0x3));
        keys.release(0x3);
        assert_eq!(keys.first_pressed(), Some(0xF));
    }

    #[test]
    fn out_of_range_key_reads_released() {
        let keys = Keypad::from([true; 16]);
        assert!(keys.is_pressed(0xF));
        assert!(!keys.is_pressed(0x10));
    }
}
