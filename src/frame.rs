//! The outer 0x38-byte frame: header fields, payload/outer checksums, and
//! status-code extraction. See [`crate::codec`] for what travels inside the
//! encrypted body once this layer has been stripped.

use crate::checksum::{SEED_OUTER, additive_sum};
use crate::crypto::Cipher;
use crate::error::{BroadlinkError, Result, status_to_error};
use bytes::{BufMut, BytesMut};

/// Fixed 8-byte magic at the start of every outer frame.
pub const MAGIC: [u8; 8] = [0x5A, 0xA5, 0xAA, 0x55, 0x5A, 0xA5, 0xAA, 0x55];

/// Size of the header preceding the encrypted body.
pub const HEADER_LEN: usize = 0x38;

/// The byte pair written at 0x24–0x25 by every profile except the ones that
/// override it (the `sp2mini2` quirk, see the registry).
pub const DEFAULT_DEVICE_ID_BYTES: [u8; 2] = [0x2A, 0x27];

/// Everything the frame builder needs that is tied to one device's session,
/// as opposed to one particular command.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext {
    /// Bytes written at 0x24–0x25. Defaults to the device's own type code;
    /// a handful of legacy profiles override it (§9 open question).
    pub device_id_bytes: [u8; 2],
    pub hw_addr: [u8; 6],
    pub conn_id: u32,
}

/// Build a request frame for `cmd_code` carrying `plaintext` as the inner
/// payload, using `counter` as the already-incremented per-session counter.
pub fn build_request(
    ctx: &FrameContext,
    cmd_code: u8,
    counter: u16,
    cipher: &dyn Cipher,
    plaintext: &[u8],
) -> Result<Vec<u8>> {
    let payload_checksum = additive_sum(plaintext, SEED_OUTER);

    let pad_len = (16 - plaintext.len() % 16) % 16;
    let mut padded = Vec::with_capacity(plaintext.len() + pad_len);
    padded.extend_from_slice(plaintext);
    padded.extend(std::iter::repeat_n(0u8, pad_len));

    let ciphertext = cipher.encrypt(&padded)?;

    let mut header = BytesMut::with_capacity(HEADER_LEN);
    header.put_slice(&MAGIC);
    header.put_bytes(0, 0x18); // 0x08..0x20, unused outside discovery probes
    header.put_u16_le(0); // 0x20..0x22 outer checksum, patched in below
    header.put_u16_le(0); // 0x22..0x24 status code, zero on a request
    header.put_slice(&ctx.device_id_bytes); // 0x24..0x26
    header.put_u8(cmd_code); // 0x26
    header.put_u8(0); // 0x27 reserved
    header.put_u16_le(counter); // 0x28..0x2A
    header.put_slice(&ctx.hw_addr); // 0x2A..0x30
    header.put_u32_le(ctx.conn_id); // 0x30..0x34
    header.put_u16_le(payload_checksum); // 0x34..0x36
    header.put_u16_le(0); // 0x36..0x38 reserved

    let mut frame = header.to_vec();
    frame.extend_from_slice(&ciphertext);

    let outer_checksum = additive_sum(&frame, SEED_OUTER);
    frame[0x20..0x22].copy_from_slice(&outer_checksum.to_le_bytes());

    tracing::debug!(cmd_code, counter, payload_len = plaintext.len(), "built outer frame");

    Ok(frame)
}

/// A response with the outer framing stripped: the status code and the
/// decrypted inner payload.
pub struct ParsedResponse {
    pub status: u16,
    pub plaintext: Vec<u8>,
}

/// Strip and validate the outer frame of a response. Per the observed
/// device behaviour, the outer checksum and echoed counter are not
/// re-verified here — only the status code and the decrypted payload's
/// checksum (checked by [`Cipher`], if at all) matter.
pub fn parse_response(cipher: &dyn Cipher, raw: &[u8]) -> Result<ParsedResponse> {
    if raw.len() < HEADER_LEN {
        tracing::error!(len = raw.len(), "response shorter than the outer header");
        return Err(BroadlinkError::DataValidation(
            "response shorter than the outer header",
        ));
    }

    let status = u16::from_le_bytes([raw[0x22], raw[0x23]]);
    if status != 0 {
        tracing::error!(status, "device reported non-zero status");
        return Err(status_to_error(status));
    }

    let ciphertext = &raw[HEADER_LEN..];
    let plaintext = cipher.decrypt(ciphertext)?;

    Ok(ParsedResponse { status, plaintext })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::Aes128Cbc;

    fn ctx() -> FrameContext {
        FrameContext {
            device_id_bytes: DEFAULT_DEVICE_ID_BYTES,
            hw_addr: [0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF],
            conn_id: 0x04030201,
        }
    }

    #[test]
    fn header_fields_land_at_documented_offsets() {
        let cipher = Aes128Cbc::with_key([0x11; 16]);
        let frame = build_request(&ctx(), 0x65, 7, &cipher, b"payload!").unwrap();

        assert_eq!(&frame[0x00..0x08], &MAGIC);
        assert_eq!(frame[0x26], 0x65);
        assert_eq!(u16::from_le_bytes([frame[0x28], frame[0x29]]), 7);
        assert_eq!(&frame[0x2A..0x30], &[0xAA, 0xBB, 0xCC, 0xDD, 0xEE, 0xFF]);
        assert_eq!(u32::from_le_bytes(frame[0x30..0x34].try_into().unwrap()), 0x04030201);
        assert_eq!(frame.len() - HEADER_LEN, 16); // "payload!" padded up to one block
    }

    #[test]
    fn outer_checksum_matches_additive_sum_with_field_zeroed() {
        let cipher = Aes128Cbc::with_key([0x22; 16]);
        let frame = build_request(&ctx(), 0x6A, 1, &cipher, b"abcdefgh").unwrap();

        let mut zeroed = frame.clone();
        zeroed[0x20..0x22].copy_from_slice(&[0, 0]);
        let expected = additive_sum(&zeroed, SEED_OUTER);
        let actual = u16::from_le_bytes([frame[0x20], frame[0x21]]);
        assert_eq!(actual, expected);
    }

    #[test]
    fn parse_response_surfaces_status_error() {
        let cipher = Aes128Cbc::with_key([0x33; 16]);
        let mut response = vec![0u8; HEADER_LEN];
        response[0x22..0x24].copy_from_slice(&0xFFFFu16.to_le_bytes());

        let err = parse_response(&cipher, &response).unwrap_err();
        assert!(matches!(err, BroadlinkError::AuthenticationFailed));
    }

    #[test]
    fn parse_response_decrypts_body_on_success() {
        let cipher = Aes128Cbc::with_key([0x44; 16]);
        let request = build_request(&ctx(), 0x6A, 1, &cipher, b"roundtrip-body!!").unwrap();

        let parsed = parse_response(&cipher, &request).unwrap();
        assert_eq!(parsed.status, 0);
        assert_eq!(&parsed.plaintext[..16], b"roundtrip-body!!");
    }
}
