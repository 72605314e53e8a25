//! CRC-16 as verified by the controller firmware when a script is loaded.
//!
//! Reflected polynomial 0xA001, zero seed, no final xor.

const POLY: u16 = 0xA001;

fn one_byte(v: u8) -> u16 {
    let mut crc = v as u16;
    for _ in 0..8 {
        crc = if crc & 1 == 1 { (crc >> 1) ^ POLY } else { crc >> 1 };
    }
    crc
}

pub fn crc16(message: &[u8]) -> u16 {
    message
        .iter()
        .fold(0, |crc, &b| (crc >> 8) ^ one_byte((crc as u8) ^ b))
}
