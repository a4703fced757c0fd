//! AES-128-CBC encryption for the session body.
//!
//! The wire protocol carries no MAC; message integrity rests entirely on
//! the additive/CRC checksums in the surrounding frame. The source this
//! crate is modelled on swaps between two different crypto libraries'
//! encrypt/decrypt methods at construction time depending on which one is
//! importable; here encryption is a single [`Cipher`] trait with one
//! concrete implementation, [`Aes128Cbc`].

use crate::error::{BroadlinkError, Result};
use aes::Aes128;
use aes::cipher::{BlockDecrypt, BlockEncrypt, KeyInit, generic_array::GenericArray};

/// Key used before `auth()` succeeds.
pub const BOOTSTRAP_KEY: [u8; 16] = [
    0x09, 0x76, 0x28, 0x34, 0x3F, 0xE9, 0x9E, 0x23, 0x76, 0x5C, 0x15, 0x13, 0xAC, 0xCF, 0x8B, 0x02,
];

/// IV used for every CBC operation, before and after `auth()`. It never changes.
pub const FIXED_IV: [u8; 16] = [
    0x56, 0x2E, 0x17, 0x99, 0x6D, 0x09, 0x3D, 0x28, 0xDD, 0xB3, 0xBA, 0x69, 0x5A, 0x2E, 0x6F, 0x58,
];

/// Session-bound AES-128-CBC encrypt/decrypt, abstracted behind a trait so
/// the outer frame codec does not need to know how the bytes are produced.
pub trait Cipher {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>>;
    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>>;
}

/// AES-128-CBC with the fixed protocol IV and a replaceable session key.
///
/// Each call instantiates a fresh CBC chain seeded from [`FIXED_IV`] — the
/// source does the same (a new `Cipher` object per `pack`/`unpack` call),
/// since the IV never advances between calls.
pub struct Aes128Cbc {
    key: [u8; 16],
}

impl Aes128Cbc {
    /// Build a cipher bound to the fixed bootstrap key (pre-auth state).
    pub fn bootstrap() -> Self {
        Self { key: BOOTSTRAP_KEY }
    }

    /// Build a cipher bound to an arbitrary 16-byte key (post-auth rekey).
    pub fn with_key(key: [u8; 16]) -> Self {
        Self { key }
    }

    /// Replace the session key in place, e.g. after a successful `auth()`.
    pub fn rekey(&mut self, key: [u8; 16]) {
        self.key = key;
    }
}

impl Cipher for Aes128Cbc {
    fn encrypt(&self, plaintext: &[u8]) -> Result<Vec<u8>> {
        if plaintext.len() % 16 != 0 {
            return Err(BroadlinkError::DataValidation(
                "plaintext length must be a multiple of 16",
            ));
        }

        let cipher = Aes128::new(GenericArray::from_slice(&self.key));
        let mut chain = FIXED_IV;
        let mut ciphertext = Vec::with_capacity(plaintext.len());

        for block in plaintext.chunks(16) {
            let mut xored = [0u8; 16];
            for i in 0..16 {
                xored[i] = block[i] ^ chain[i];
            }
            let mut ga = GenericArray::clone_from_slice(&xored);
            cipher.encrypt_block(&mut ga);
            chain.copy_from_slice(&ga);
            ciphertext.extend_from_slice(&ga);
        }

        Ok(ciphertext)
    }

    fn decrypt(&self, ciphertext: &[u8]) -> Result<Vec<u8>> {
        if ciphertext.len() % 16 != 0 {
            return Err(BroadlinkError::DataValidation(
                "ciphertext length must be a multiple of 16",
            ));
        }

        let cipher = Aes128::new(GenericArray::from_slice(&self.key));
        let mut chain = FIXED_IV;
        let mut plaintext = Vec::with_capacity(ciphertext.len());

        for block in ciphertext.chunks(16) {
            let mut ga = GenericArray::clone_from_slice(block);
            let this_ciphertext = ga;
            cipher.decrypt_block(&mut ga);
            for i in 0..16 {
                ga[i] ^= chain[i];
            }
            chain.copy_from_slice(&this_ciphertext);
            plaintext.extend_from_slice(&ga);
        }

        Ok(plaintext)
    }
}
