use std::fmt;

/// A two-byte CHIP-8 instruction word, fetched big-endian.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Opcode(pub u16);

impl Opcode {
    pub fn from_bytes(high: u8, low: u8) -> Self {
        Opcode((high as u16) << 8 | low as u16)
    }

    /// top nibble, selects one of the 16 handler families
    pub fn family(self) -> usize {
        ((self.0 & 0xF000) >> 12) as usize
    }

    /// 12-bit address
    pub fn nnn(self) -> u16 {
        self.0 & 0x0FFF
    }

    /// 8-bit immediate
    pub fn nn(self) -> u8 {
        (self.0 & 0x00FF) as u8
    }

    /// 4-bit immediate
    pub fn n(self) -> u8 {
        (self.0 & 0x000F) as u8
    }

    pub fn x(self) -> usize {
        ((self.0 & 0x0F00) >> 8) as usize
    }

    pub fn y(self) -> usize {
        ((self.0 & 0x00F0) >> 4) as usize
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04X}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fields() {
        let op = Opcode::from_bytes(0xD1, 0x2F);
        assert_eq!(op.0, 0xD12F);
        assert_eq!(op.family(), 0xD);
        assert_eq!(op.x(), 0x1);
        assert_eq!(op.y(), 0x2);
        assert_eq!(op.n(), 0xF);
        assert_eq!(op.nn(), 0x2F);
        assert_eq!(op.nnn(), 0x12F);
    }

    #[test]
    fn display_is_zero_padded_hex() {
        assert_eq!(Opcode(0x00E0).to_string(), "00E0");
    }
}
