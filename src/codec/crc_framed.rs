//! CRC-framed inner framing used by the Hysen thermostat family: a 16-bit
//! length ahead of the body, a CRC-16 (polynomial `0xA001`) trailing it.

use crate::checksum::{CRC16_THERMOSTAT, crc16};
use crate::error::{BroadlinkError, Result};

pub fn wrap(body: &[u8]) -> Vec<u8> {
    let p_len = (body.len() + 2) as u16;
    let crc = crc16(body, CRC16_THERMOSTAT);

    let mut out = Vec::with_capacity(2 + body.len() + 2);
    out.extend_from_slice(&p_len.to_le_bytes());
    out.extend_from_slice(body);
    out.extend_from_slice(&crc.to_le_bytes());
    out
}

pub fn unwrap(plaintext: &[u8]) -> Result<Vec<u8>> {
    if plaintext.len() < 4 {
        return Err(BroadlinkError::DataValidation(
            "CRC-framed inner frame shorter than its own header",
        ));
    }
    let p_len = u16::from_le_bytes([plaintext[0], plaintext[1]]) as usize;
    let framed = plaintext
        .get(2..2 + p_len)
        .ok_or(BroadlinkError::DataValidation(
            "CRC-framed inner frame declares a length past the end of the buffer",
        ))?;

    if framed.len() < 2 {
        return Err(BroadlinkError::DataValidation(
            "CRC-framed inner frame too short to hold a trailing CRC",
        ));
    }
    let (body, crc_bytes) = framed.split_at(framed.len() - 2);
    let given_crc = u16::from_le_bytes([crc_bytes[0], crc_bytes[1]]);
    let computed_crc = crc16(body, CRC16_THERMOSTAT);

    if given_crc != computed_crc {
        return Err(BroadlinkError::DataValidation(
            "CRC-framed inner frame failed its CRC-16 check",
        ));
    }

    Ok(body.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_unwrap_roundtrip() {
        let body = [0x01, 0x03, 0x00, 0x00, 0x00, 0x16];
        let wrapped = wrap(&body);
        assert_eq!(unwrap(&wrapped).unwrap(), body);
    }

    #[test]
    fn unwrap_detects_tampered_body() {
        let body = [0x01, 0x03, 0x00, 0x00, 0x00, 0x16];
        let mut wrapped = wrap(&body);
        let last = wrapped.len() - 3;
        wrapped[last] ^= 0x01;
        assert!(unwrap(&wrapped).is_err());
    }
}
