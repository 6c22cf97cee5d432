use crc::{Crc, CRC_8_AUTOSAR};

// Re-export for callers building their own tables
pub use crc::CRC_8_AUTOSAR as CRC8_H2F;

/// Byte index of the checksum in protected MQB frames
pub const CHECKSUM_BYTE: usize = 0;

/// Compute the MQB frame checksum.
///
/// CRC-8H2F (AUTOSAR) over payload bytes 1.. followed by the message-specific
/// magic pad selected by the rolling counter.
pub fn compute_mqb_checksum(data: &[u8], magic_pad: u8) -> u8 {
    let crc = Crc::<u8>::new(&CRC_8_AUTOSAR);
    let mut digest = crc.digest();
    if data.len() > CHECKSUM_BYTE + 1 {
        digest.update(&data[CHECKSUM_BYTE + 1..]);
    }
    digest.update(&[magic_pad]);
    digest.finalize()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crc8_h2f_check_value() {
        let crc = Crc::<u8>::new(&CRC8_H2F);
        assert_eq!(crc.checksum(b"123456789"), 0xDF);
    }

    #[test]
    fn test_checksum_ignores_checksum_byte() {
        let a = [0x00, 0x05, 0x10, 0x20, 0x30, 0x40, 0x50, 0x60];
        let mut b = a;
        b[0] = 0xAB;
        assert_eq!(compute_mqb_checksum(&a, 0xDA), compute_mqb_checksum(&b, 0xDA));
    }

    #[test]
    fn test_checksum_depends_on_pad_and_payload() {
        let a = [0x00, 0x05, 0x10, 0x20, 0x30, 0x40, 0x50, 0x60];
        let mut b = a;
        b[7] ^= 0x01;
        assert_ne!(compute_mqb_checksum(&a, 0xDA), compute_mqb_checksum(&a, 0x37));
        assert_ne!(compute_mqb_checksum(&a, 0xDA), compute_mqb_checksum(&b, 0xDA));
    }

    #[test]
    fn test_checksum_equals_crc_over_payload_and_pad() {
        let data = [0x00, 0x13, 0x00, 0x00, 0x81, 0x2C, 0xFE, 0x07];
        let crc = Crc::<u8>::new(&CRC8_H2F);
        let mut expected_input = data[1..].to_vec();
        expected_input.push(0xDA);
        assert_eq!(compute_mqb_checksum(&data, 0xDA), crc.checksum(&expected_input));
    }
}
