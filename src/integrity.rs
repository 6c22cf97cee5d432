//! # Ingress frame integrity
//!
//! MQB frames on the powertrain and extended buses carry end-to-end
//! protection: byte 0 is a checksum and the low nibble of byte 1 a rolling
//! counter. The checksum is CRC-8H2F over bytes 1.. followed by a magic pad
//! byte chosen per message (and, for some messages, per counter value).
//!
//! # Data layout
//! [CRC(1B) | CNT(bits 3..0) ... | DATA ...]

use crate::common::counter::{CounterOps, Counter4};
use crate::common::crc_ops::{compute_mqb_checksum, CHECKSUM_BYTE};
use crate::common::field_ops::{BitField, Word};
use crate::common::frame::CanFrame;
use crate::common::validation;
use crate::SafetyResult;

/// ACC_06, cruise control status
const ACC_06_PAD: u8 = 0x37;
/// HCA_01, heading control assist command
const HCA_01_PAD: u8 = 0xDA;

/// Result of checking one received frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntegrityStatus {
    /// Checksum matches and the counter advanced by one
    Ok,
    /// Checksum matches, counter skipped ahead within the allowed delta
    OkSomeLost,
    /// Checksum matches but the counter did not advance
    Repeated,
    /// Checksum matches but the counter jumped too far
    WrongSequence,
    /// Checksum mismatch, payload corrupted or forged
    ChecksumError,
    /// Identifier is not covered by the integrity table
    Unprotected,
}

impl IntegrityStatus {
    /// Whether the frame content may be trusted
    pub fn is_valid(&self) -> bool {
        matches!(
            self,
            IntegrityStatus::Ok | IntegrityStatus::OkSomeLost | IntegrityStatus::Unprotected
        )
    }
}

/// Protection parameters for one message identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtectedMessage {
    pub id: u32,
    /// Magic pad indexed by the rolling counter value
    pub magic_pads: [u8; 16],
}

impl ProtectedMessage {
    /// Message whose pad does not depend on the counter
    pub const fn uniform(id: u32, pad: u8) -> Self {
        Self {
            id,
            magic_pads: [pad; 16],
        }
    }
}

/// Configuration for ingress integrity checking
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrityConfig {
    pub messages: Vec<ProtectedMessage>,
    /// Location of the rolling counter
    pub counter: BitField,
    /// Maximum allowed delta between consecutive counters
    pub max_delta_counter: u8,
}

impl IntegrityConfig {
    /// Cruise status and heading control frames of the MQB platform
    pub fn mqb() -> Self {
        Self {
            messages: vec![
                ProtectedMessage::uniform(0x122, ACC_06_PAD),
                ProtectedMessage::uniform(0x126, HCA_01_PAD),
            ],
            ..Default::default()
        }
    }
}

impl Default for IntegrityConfig {
    fn default() -> Self {
        Self {
            messages: Vec::new(),
            counter: BitField::new(Word::Low, 8, 4),
            max_delta_counter: 1,
        }
    }
}

#[derive(Debug, Clone)]
struct Slot {
    message: ProtectedMessage,
    rx_counter: u8,
    rx_initialized: bool,
    tx_counter: u8,
}

/// Per-identifier checksum and counter tracking
#[derive(Debug, Clone)]
pub struct FrameIntegrity {
    config: IntegrityConfig,
    slots: Vec<Slot>,
}

impl FrameIntegrity {
    fn validate_config(config: &IntegrityConfig) -> SafetyResult<()> {
        validation::validate_field("integrity counter", &config.counter)?;
        validation::validate_at_most("integrity counter width", config.counter.width, 4)?;
        validation::validate_positive("max_delta_counter", config.max_delta_counter)?;
        validation::validate_at_most(
            "max_delta_counter",
            config.max_delta_counter,
            Counter4::MAX_VALUE - 1,
        )?;
        Ok(())
    }

    /// # Errors
    /// Returns `SafetyError::InvalidConfiguration` if the counter field or
    /// counter delta is out of range
    pub fn new(config: IntegrityConfig) -> SafetyResult<Self> {
        Self::validate_config(&config)?;
        let slots = config
            .messages
            .iter()
            .map(|message| Slot {
                message: message.clone(),
                rx_counter: 0,
                rx_initialized: false,
                tx_counter: 0,
            })
            .collect();
        Ok(Self { config, slots })
    }

    /// Forget all counter history
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            slot.rx_counter = 0;
            slot.rx_initialized = false;
            slot.tx_counter = 0;
        }
    }

    /// Check a received frame and advance the per-identifier counter
    pub fn check(&mut self, frame: &CanFrame) -> IntegrityStatus {
        let counter_field = self.config.counter;
        let max_delta = self.config.max_delta_counter;
        let Some(slot) = self.slots.iter_mut().find(|slot| slot.message.id == frame.id()) else {
            return IntegrityStatus::Unprotected;
        };

        let rx_counter = counter_field.read(frame) as u8;
        let pad = slot.message.magic_pads[usize::from(rx_counter & 0x0F)];
        let calculated = compute_mqb_checksum(frame.data(), pad);
        if calculated != frame.byte(CHECKSUM_BYTE) {
            return IntegrityStatus::ChecksumError;
        }

        let status =
            Counter4::validate_counter(slot.rx_counter, rx_counter, max_delta, slot.rx_initialized);
        slot.rx_counter = rx_counter;
        if status.is_valid() {
            slot.rx_initialized = true;
        }
        status
    }

    /// Write the next counter value and the checksum into an outgoing frame.
    ///
    /// Returns `false`, leaving the frame untouched, if the identifier is not
    /// protected.
    pub fn protect(&mut self, frame: &mut CanFrame) -> bool {
        let counter_field = self.config.counter;
        let Some(slot) = self.slots.iter_mut().find(|slot| slot.message.id == frame.id()) else {
            return false;
        };

        counter_field.write(frame, u32::from(slot.tx_counter));
        let pad = slot.message.magic_pads[usize::from(slot.tx_counter)];
        let checksum = compute_mqb_checksum(frame.data(), pad);
        frame.data_mut()[CHECKSUM_BYTE] = checksum;
        slot.tx_counter = Counter4::increment_counter(slot.tx_counter);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cruise_frame(status: u8) -> CanFrame {
        CanFrame::from_bytes(0, 0x122, [0, 0, 0, 0, 0, 0, 0, status << 4])
    }

    #[test]
    fn test_integrity_protect_then_check() {
        let mut tx = FrameIntegrity::new(IntegrityConfig::mqb()).unwrap();
        let mut rx = FrameIntegrity::new(IntegrityConfig::mqb()).unwrap();

        for expected_counter in 0u8..20 {
            let mut frame = cruise_frame(3);
            assert!(tx.protect(&mut frame));
            assert_eq!(frame.byte(1) & 0x0F, expected_counter % 16);
            assert_eq!(rx.check(&frame), IntegrityStatus::Ok);
        }
    }

    #[test]
    fn test_hca_pad_matches_placeholder_checksum() {
        // Same byte as CRC-8H2F over [0xB5, bytes 1..8, 0x00]
        let crc = crc::Crc::<u8>::new(&crc::CRC_8_AUTOSAR);
        let mut tx = FrameIntegrity::new(IntegrityConfig::mqb()).unwrap();
        for payload in [
            [0, 0, 0, 0, 0x81, 0x2C, 0xFE, 0x07],
            [0, 0x30, 0x03, 0x00, 0x0A, 0x00, 0xFE, 0x07],
        ] {
            let mut frame = CanFrame::from_bytes(1, 0x126, payload);
            assert!(tx.protect(&mut frame));

            let mut placeholder = vec![0xB5];
            placeholder.extend_from_slice(&frame.data()[1..]);
            placeholder.push(0x00);
            assert_eq!(frame.byte(CHECKSUM_BYTE), crc.checksum(&placeholder));
        }
    }

    #[test]
    fn test_integrity_detects_corruption() {
        let mut tx = FrameIntegrity::new(IntegrityConfig::mqb()).unwrap();
        let mut rx = FrameIntegrity::new(IntegrityConfig::mqb()).unwrap();

        let mut frame = cruise_frame(3);
        tx.protect(&mut frame);
        frame.data_mut()[7] ^= 0x10;
        assert_eq!(rx.check(&frame), IntegrityStatus::ChecksumError);
    }

    #[test]
    fn test_integrity_counter_sequence() {
        let mut tx = FrameIntegrity::new(IntegrityConfig::mqb()).unwrap();
        let mut rx = FrameIntegrity::new(IntegrityConfig::mqb()).unwrap();

        let mut first = cruise_frame(3);
        tx.protect(&mut first);
        assert_eq!(rx.check(&first), IntegrityStatus::Ok);
        assert_eq!(rx.check(&first), IntegrityStatus::Repeated);

        let mut skipped = cruise_frame(3);
        tx.protect(&mut skipped);
        tx.protect(&mut skipped);
        assert_eq!(rx.check(&skipped), IntegrityStatus::WrongSequence);
    }

    #[test]
    fn test_integrity_allows_configured_loss() {
        let config = IntegrityConfig {
            max_delta_counter: 2,
            ..IntegrityConfig::mqb()
        };
        let mut tx = FrameIntegrity::new(config.clone()).unwrap();
        let mut rx = FrameIntegrity::new(config).unwrap();

        let mut frame = cruise_frame(3);
        tx.protect(&mut frame);
        assert_eq!(rx.check(&frame), IntegrityStatus::Ok);
        tx.protect(&mut frame);
        tx.protect(&mut frame);
        assert_eq!(rx.check(&frame), IntegrityStatus::OkSomeLost);
    }

    #[test]
    fn test_integrity_unprotected_ids_pass() {
        let mut rx = FrameIntegrity::new(IntegrityConfig::mqb()).unwrap();
        let mut frame = CanFrame::from_bytes(0, 0x09F, [0; 8]);
        assert_eq!(rx.check(&frame), IntegrityStatus::Unprotected);
        assert!(rx.check(&frame).is_valid());
        assert!(!rx.protect(&mut frame));
        assert_eq!(frame, CanFrame::from_bytes(0, 0x09F, [0; 8]));
    }

    #[test]
    fn test_integrity_rejects_bad_config() {
        let config = IntegrityConfig {
            max_delta_counter: 0,
            ..IntegrityConfig::mqb()
        };
        assert!(FrameIntegrity::new(config).is_err());

        let config = IntegrityConfig {
            counter: BitField::new(Word::Low, 8, 6),
            ..IntegrityConfig::mqb()
        };
        assert!(FrameIntegrity::new(config).is_err());
    }
}
