//! Length-prefixed inner framing used by RM4-family remotes: a 16-bit
//! total length ahead of the 4-byte command, so the receiver can validate
//! the body length before trusting it.

use crate::error::{BroadlinkError, Result};

pub fn wrap(cmd: u32, body: &[u8]) -> Vec<u8> {
    let total_len = (body.len() + 4) as u16;
    let mut out = Vec::with_capacity(2 + 4 + body.len());
    out.extend_from_slice(&total_len.to_le_bytes());
    out.extend_from_slice(&cmd.to_le_bytes());
    out.extend_from_slice(body);
    out
}

pub fn unwrap(plaintext: &[u8]) -> Result<&[u8]> {
    if plaintext.len() < 6 {
        return Err(BroadlinkError::DataValidation(
            "length-prefixed inner frame shorter than its own header",
        ));
    }
    let p_len = u16::from_le_bytes([plaintext[0], plaintext[1]]) as usize;
    let end = p_len
        .checked_add(2)
        .filter(|&end| end >= 6 && end <= plaintext.len())
        .ok_or(BroadlinkError::DataValidation(
            "length-prefixed inner frame declares a length past the end of the buffer",
        ))?;
    Ok(&plaintext[6..end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_unwrap_roundtrip() {
        let body = b"an ir burst payload".to_vec();
        let wrapped = wrap(0x02, &body);
        assert_eq!(unwrap(&wrapped).unwrap(), body.as_slice());
    }

    #[test]
    fn unwrap_rejects_overrunning_length() {
        let mut wrapped = wrap(0x02, b"short");
        wrapped[0] = 0xFF; // declare an absurd length
        wrapped[1] = 0xFF;
        assert!(unwrap(&wrapped).is_err());
    }
}
