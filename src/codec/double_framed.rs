//! Double-framed inner framing used by HVAC units: a 10-byte header
//! (packet length, a fixed `0x00BB`/`0x8006`/`0x0000` triple, and a data
//! length) ahead of the data, with a CRC-16 (polynomial `0x9BE4`) trailing
//! everything after the packet-length field.

use crate::checksum::{CRC16_HVAC, crc16};
use crate::error::{BroadlinkError, Result};

const SIGNATURE: [u16; 3] = [0x00BB, 0x8006, 0x0000];

pub fn wrap(data: &[u8]) -> Vec<u8> {
    let data_len = data.len() as u16;
    let remainder_len = 8 + data.len() + 2; // signature + data_len + data + crc
    let p_len = remainder_len as u16;

    let mut remainder = Vec::with_capacity(remainder_len - 2);
    for word in SIGNATURE {
        remainder.extend_from_slice(&word.to_le_bytes());
    }
    remainder.extend_from_slice(&data_len.to_le_bytes());
    remainder.extend_from_slice(data);

    let crc = crc16(&remainder, CRC16_HVAC);

    let mut out = Vec::with_capacity(2 + remainder_len);
    out.extend_from_slice(&p_len.to_le_bytes());
    out.extend_from_slice(&remainder);
    out.extend_from_slice(&crc.to_le_bytes());
    out
}

pub fn unwrap(plaintext: &[u8]) -> Result<Vec<u8>> {
    if plaintext.len() < 2 {
        return Err(BroadlinkError::DataValidation(
            "double-framed inner frame shorter than its own length prefix",
        ));
    }
    let p_len = u16::from_le_bytes([plaintext[0], plaintext[1]]) as usize;
    let remainder = plaintext
        .get(2..2 + p_len)
        .ok_or(BroadlinkError::DataValidation(
            "double-framed inner frame declares a length past the end of the buffer",
        ))?;

    if remainder.len() < 10 {
        return Err(BroadlinkError::DataValidation(
            "double-framed inner frame too short to hold its own signature and CRC",
        ));
    }
    let (body, crc_bytes) = remainder.split_at(remainder.len() - 2);
    let given_crc = u16::from_le_bytes([crc_bytes[0], crc_bytes[1]]);
    let computed_crc = crc16(body, CRC16_HVAC);
    if given_crc != computed_crc {
        return Err(BroadlinkError::DataValidation(
            "double-framed inner frame failed its CRC-16 check",
        ));
    }

    let signature = [
        u16::from_le_bytes([body[0], body[1]]),
        u16::from_le_bytes([body[2], body[3]]),
        u16::from_le_bytes([body[4], body[5]]),
    ];
    if signature != SIGNATURE {
        return Err(BroadlinkError::DataValidation(
            "double-framed inner frame has an unrecognised signature",
        ));
    }

    let data_len = u16::from_le_bytes([body[6], body[7]]) as usize;
    let data = body
        .get(8..8 + data_len)
        .ok_or(BroadlinkError::DataValidation(
            "double-framed inner frame declares a data length past the end of the buffer",
        ))?;

    Ok(data.to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_unwrap_roundtrip() {
        let data = [0x21, 0x01];
        let wrapped = wrap(&data);
        assert_eq!(unwrap(&wrapped).unwrap(), data);
    }

    #[test]
    fn unwrap_detects_tampered_data() {
        let data = [0x21, 0x01];
        let mut wrapped = wrap(&data);
        let last = wrapped.len() - 3;
        wrapped[last] ^= 0x01;
        assert!(unwrap(&wrapped).is_err());
    }
}
