//! Classic CAN frame as seen by the safety hooks.
//!
//! The controller mailbox exposes the payload as two little-endian 32-bit
//! words: the low word holds bytes 0..4 and the high word bytes 4..8. All
//! field layouts in this crate are expressed against those words.

use crate::{SafetyError, SafetyResult};

/// Maximum payload of a classic CAN frame
pub const MAX_DLC: usize = 8;

/// Bus index as numbered by the harness
pub type BusId = u8;

/// A received or about-to-be-sent CAN frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CanFrame {
    bus: BusId,
    id: u32,
    len: u8,
    data: [u8; MAX_DLC],
}

impl CanFrame {
    /// Build a frame from a payload slice of at most 8 bytes
    ///
    /// # Errors
    /// Returns `SafetyError::InvalidFrame` if `payload` is longer than 8 bytes
    pub fn new(bus: BusId, id: u32, payload: &[u8]) -> SafetyResult<Self> {
        if payload.len() > MAX_DLC {
            return Err(SafetyError::InvalidFrame(format!(
                "Expected at most {} bytes, got {} bytes",
                MAX_DLC,
                payload.len()
            )));
        }
        let mut data = [0u8; MAX_DLC];
        data[..payload.len()].copy_from_slice(payload);
        Ok(Self {
            bus,
            id,
            len: payload.len() as u8,
            data,
        })
    }

    /// Build a full-length frame from a fixed 8-byte payload
    pub const fn from_bytes(bus: BusId, id: u32, data: [u8; MAX_DLC]) -> Self {
        Self {
            bus,
            id,
            len: MAX_DLC as u8,
            data,
        }
    }

    pub fn bus(&self) -> BusId {
        self.bus
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Payload bytes up to the frame length
    pub fn data(&self) -> &[u8] {
        &self.data[..self.len()]
    }

    /// Full 8-byte mailbox, including bytes past the frame length
    pub fn data_mut(&mut self) -> &mut [u8; MAX_DLC] {
        &mut self.data
    }

    /// Byte `index` of the mailbox, zero past the end
    pub fn byte(&self, index: usize) -> u8 {
        self.data.get(index).copied().unwrap_or(0)
    }

    /// Bytes 0..4 as a little-endian word
    pub fn low_word(&self) -> u32 {
        u32::from_le_bytes([self.data[0], self.data[1], self.data[2], self.data[3]])
    }

    /// Bytes 4..8 as a little-endian word
    pub fn high_word(&self) -> u32 {
        u32::from_le_bytes([self.data[4], self.data[5], self.data[6], self.data[7]])
    }

    pub fn set_low_word(&mut self, word: u32) {
        self.data[0..4].copy_from_slice(&word.to_le_bytes());
    }

    pub fn set_high_word(&mut self, word: u32) {
        self.data[4..8].copy_from_slice(&word.to_le_bytes());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_words_are_little_endian() {
        let frame = CanFrame::from_bytes(0, 0x9F, [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08]);
        assert_eq!(frame.low_word(), 0x0403_0201);
        assert_eq!(frame.high_word(), 0x0807_0605);
        assert_eq!(frame.byte(7), 0x08);
        assert_eq!(frame.byte(8), 0x00);
    }

    #[test]
    fn test_frame_short_payload() {
        let frame = CanFrame::new(1, 0x122, &[0xAA, 0xBB]).unwrap();
        assert_eq!(frame.len(), 2);
        assert_eq!(frame.data(), &[0xAA, 0xBB]);
        assert_eq!(frame.high_word(), 0);
    }

    #[test]
    fn test_frame_rejects_long_payload() {
        let result = CanFrame::new(0, 0x126, &[0u8; 9]);
        assert!(matches!(result, Err(SafetyError::InvalidFrame(_))));
    }

    #[test]
    fn test_frame_set_words() {
        let mut frame = CanFrame::from_bytes(0, 0x126, [0; MAX_DLC]);
        frame.set_high_word(0xDEAD_BEEF);
        frame.set_low_word(0x0000_0102);
        assert_eq!(&frame.data()[4..], &[0xEF, 0xBE, 0xAD, 0xDE]);
        assert_eq!(frame.byte(0), 0x02);
        assert_eq!(frame.byte(1), 0x01);
    }
}
