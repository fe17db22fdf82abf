use ::crc::{Crc, CRC_16_IBM_3740};

/// CRC-16/CCITT-FALSE: poly 0x1021, init 0xFFFF, no reflection, no final xor.
const CCITT_FALSE: Crc<u16> = Crc::<u16>::new(&CRC_16_IBM_3740);

/// CRC-16/CCITT-FALSE over the payload text.
///
/// Each character contributes the low byte of its code point.
pub fn crc16(data: &str) -> u16 {
    let bytes: Vec<u8> = data.chars().map(|ch| (u32::from(ch) & 0xFF) as u8).collect();
    CCITT_FALSE.checksum(&bytes)
}

/// Four uppercase, zero-padded hex digits.
pub fn checksum_hex(data: &str) -> String {
    format!("{:04X}", crc16(data))
}
