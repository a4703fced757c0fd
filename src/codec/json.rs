//! JSON-framed inner framing used by bulbs and the BG1 smart gate: a 14-byte
//! header (total length, a fixed `A5 A5 5A 5A` magic, a checksum, a flag
//! byte, a fixed `0x0B` byte, and a 32-bit JSON length) ahead of the JSON
//! payload itself.
//!
//! The S3 hub speaks a close cousin of this layout but with a shorter
//! 12-byte header and a different checksum seed, so it owns its own
//! encode/decode in [`crate::devices::hub`] rather than reusing this module.

use crate::checksum::{SEED_JSON, additive_sum};
use crate::error::{BroadlinkError, Result};

const MAGIC: [u8; 4] = [0xA5, 0xA5, 0x5A, 0x5A];
const HEADER_LEN: usize = 14;

pub fn wrap(flag: u8, json: &[u8]) -> Vec<u8> {
    let total_len = (HEADER_LEN - 2 + json.len()) as u16;

    let mut out = Vec::with_capacity(HEADER_LEN + json.len());
    out.extend_from_slice(&total_len.to_le_bytes());
    out.extend_from_slice(&MAGIC);
    out.extend_from_slice(&[0x00, 0x00]); // checksum placeholder, filled in below
    out.push(flag);
    out.push(0x0B);
    out.extend_from_slice(&(json.len() as u32).to_le_bytes());
    out.extend_from_slice(json);

    let checksum = additive_sum(&out[8..], SEED_JSON);
    out[6..8].copy_from_slice(&checksum.to_le_bytes());
    out
}

pub fn unwrap(plaintext: &[u8]) -> Result<(u8, Vec<u8>)> {
    if plaintext.len() < HEADER_LEN {
        return Err(BroadlinkError::DataValidation(
            "JSON-framed inner frame shorter than its own header",
        ));
    }
    if plaintext[2..6] != MAGIC {
        return Err(BroadlinkError::DataValidation(
            "JSON-framed inner frame has an unrecognised magic",
        ));
    }

    let given_checksum = u16::from_le_bytes([plaintext[6], plaintext[7]]);
    let computed_checksum = additive_sum(&plaintext[8..], SEED_JSON);
    if given_checksum != computed_checksum {
        return Err(BroadlinkError::DataValidation(
            "JSON-framed inner frame failed its checksum",
        ));
    }

    let flag = plaintext[8];
    let js_len = u32::from_le_bytes([
        plaintext[10],
        plaintext[11],
        plaintext[12],
        plaintext[13],
    ]) as usize;
    let json = plaintext
        .get(HEADER_LEN..HEADER_LEN + js_len)
        .ok_or(BroadlinkError::DataValidation(
            "JSON-framed inner frame declares a JSON length past the end of the buffer",
        ))?;

    Ok((flag, json.to_vec()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_unwrap_roundtrip() {
        let json = br#"{"pwr":1}"#;
        let wrapped = wrap(0x02, json);
        let (flag, decoded) = unwrap(&wrapped).unwrap();
        assert_eq!(flag, 0x02);
        assert_eq!(decoded, json);
    }

    #[test]
    fn unwrap_rejects_bad_magic() {
        let mut wrapped = wrap(0x01, b"{}");
        wrapped[2] = 0x00;
        assert!(unwrap(&wrapped).is_err());
    }

    #[test]
    fn unwrap_rejects_tampered_checksum() {
        let mut wrapped = wrap(0x01, br#"{"pwr":1}"#);
        let last = wrapped.len() - 1;
        wrapped[last] ^= 0x01;
        assert!(unwrap(&wrapped).is_err());
    }
}
