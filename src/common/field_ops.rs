//! Typed bit-field accessors over the two mailbox words of a [`CanFrame`].
//!
//! Each vehicle variant lays out the same signals at slightly different
//! positions, so fields are described as data (word, bit offset, width)
//! instead of hand-written shift and mask expressions.

use super::frame::CanFrame;

/// Which 32-bit mailbox word a field lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Word {
    /// Bytes 0..4, little-endian
    Low,
    /// Bytes 4..8, little-endian
    High,
}

/// An unsigned field of `width` bits starting at bit `offset` of a word
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BitField {
    pub word: Word,
    pub offset: u8,
    pub width: u8,
}

impl BitField {
    pub const fn new(word: Word, offset: u8, width: u8) -> Self {
        Self {
            word,
            offset,
            width,
        }
    }

    /// Field located by payload byte index and bit position within that byte
    pub const fn in_byte(byte: u8, bit: u8, width: u8) -> Self {
        let word = if byte < 4 { Word::Low } else { Word::High };
        Self {
            word,
            offset: ((byte % 4) * 8).saturating_add(bit),
            width,
        }
    }

    /// Single-bit flag
    pub const fn flag(word: Word, offset: u8) -> Self {
        Self::new(word, offset, 1)
    }

    /// True when the field fits inside its 32-bit word
    pub const fn is_well_formed(&self) -> bool {
        self.width > 0 && self.width <= 32 && (self.offset as u16 + self.width as u16) <= 32
    }

    pub const fn mask(&self) -> u32 {
        if self.width >= 32 {
            u32::MAX
        } else {
            (1u32 << self.width) - 1
        }
    }

    /// Largest value the field can hold
    pub const fn max_value(&self) -> u32 {
        self.mask()
    }

    pub fn read(&self, frame: &CanFrame) -> u32 {
        let word = match self.word {
            Word::Low => frame.low_word(),
            Word::High => frame.high_word(),
        };
        word.checked_shr(u32::from(self.offset)).unwrap_or(0) & self.mask()
    }

    pub fn read_flag(&self, frame: &CanFrame) -> bool {
        self.read(frame) != 0
    }

    /// Write `value` into the field, leaving other bits untouched.
    /// Bits of `value` above the field width are discarded, as is anything
    /// past the end of the word.
    pub fn write(&self, frame: &mut CanFrame, value: u32) {
        let shift = u32::from(self.offset);
        let mask = self.mask().checked_shl(shift).unwrap_or(0);
        let bits = value.checked_shl(shift).unwrap_or(0) & mask;
        match self.word {
            Word::Low => {
                let word = frame.low_word();
                frame.set_low_word((word & !mask) | bits);
            }
            Word::High => {
                let word = frame.high_word();
                frame.set_high_word((word & !mask) | bits);
            }
        }
    }
}

/// Signed value encoded as a magnitude split over two fields plus a sign bit.
///
/// The magnitude is `(upper << lower.width) | lower`; a set sign bit negates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignedMagnitudeField {
    pub upper: BitField,
    pub lower: BitField,
    pub sign: BitField,
}

impl SignedMagnitudeField {
    pub const fn new(upper: BitField, lower: BitField, sign: BitField) -> Self {
        Self {
            upper,
            lower,
            sign,
        }
    }

    /// Largest representable magnitude
    pub const fn max_magnitude(&self) -> u32 {
        let upper = match self.upper.max_value().checked_shl(self.lower.width as u32) {
            Some(upper) => upper,
            None => 0,
        };
        upper | self.lower.max_value()
    }

    pub const fn is_well_formed(&self) -> bool {
        self.upper.is_well_formed()
            && self.lower.is_well_formed()
            && self.sign.is_well_formed()
            && self.sign.width == 1
            && (self.upper.width as u16 + self.lower.width as u16) < 32
    }

    pub fn read_magnitude(&self, frame: &CanFrame) -> u32 {
        let upper = self
            .upper
            .read(frame)
            .checked_shl(u32::from(self.lower.width))
            .unwrap_or(0);
        upper | self.lower.read(frame)
    }

    pub fn read(&self, frame: &CanFrame) -> i32 {
        let magnitude = self.read_magnitude(frame) as i32;
        if self.sign.read_flag(frame) {
            magnitude.saturating_neg()
        } else {
            magnitude
        }
    }

    /// Encode `value`, saturating the magnitude at the field capacity
    pub fn write(&self, frame: &mut CanFrame, value: i32) {
        let magnitude = value.unsigned_abs().min(self.max_magnitude());
        let upper = magnitude
            .checked_shr(u32::from(self.lower.width))
            .unwrap_or(0);
        self.upper.write(frame, upper);
        self.lower.write(frame, magnitude);
        self.sign.write(frame, u32::from(value < 0));
    }
}
