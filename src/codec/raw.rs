//! Raw inner framing used by classic RM remotes: a 4-byte little-endian
//! command prepended to the body, nothing else.

use crate::error::{BroadlinkError, Result};

pub fn wrap(cmd: u32, body: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(4 + body.len());
    out.extend_from_slice(&cmd.to_le_bytes());
    out.extend_from_slice(body);
    out
}

pub fn unwrap(plaintext: &[u8]) -> Result<&[u8]> {
    if plaintext.len() < 4 {
        return Err(BroadlinkError::DataValidation(
            "raw inner frame shorter than the 4-byte command prefix",
        ));
    }
    Ok(&plaintext[4..])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrap_unwrap_roundtrip() {
        let body = [0x01, 0x02, 0x03];
        let wrapped = wrap(0x04, &body);
        assert_eq!(unwrap(&wrapped).unwrap(), &body);
    }

    #[test]
    fn unwrap_rejects_short_input() {
        assert!(unwrap(&[0, 1, 2]).is_err());
    }
}
