//! Primitive capabilities the session envelope is built from.
//!
//! The envelope only talks to the [`Kdf`], [`SessionCipher`] and [`Mac`]
//! traits, so any of them can be swapped for another implementation or a test
//! double. The default suite is KDF2(SHA-256), AES-256/CBC with PKCS#7
//! padding, and HMAC(SHA-256).

use crate::errors::SessionError;

use aes::Aes256;
use block_modes::block_padding::Pkcs7;
use block_modes::{BlockMode, Cbc};
use byteorder::{BigEndian, ByteOrder};
use ring::{constant_time, digest, hmac};
use sha2::{Digest, Sha256};
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

/// The long-term key encrypted sessions are protected with.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SymmetricKey(Vec<u8>);

impl SymmetricKey {
    pub fn new(key: Vec<u8>) -> Self {
        SymmetricKey(key)
    }

    pub fn from_slice(key: &[u8]) -> Self {
        SymmetricKey(key.to_vec())
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SymmetricKey([REDACTED; {}])", self.0.len())
    }
}

pub trait Kdf {
    /// Derives `output_len` bytes of key material from `secret` and `salt`.
    fn derive_key(&self, output_len: usize, secret: &[u8], salt: &[u8]) -> Result<Zeroizing<Vec<u8>>, SessionError>;
}

pub trait SessionCipher {
    fn encrypt(&self, key: &[u8], iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, SessionError>;
    fn decrypt(&self, key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>, SessionError>;
}

pub trait Mac {
    fn output_len(&self) -> usize;

    fn mac(&self, key: &[u8], data: &[u8]) -> Result<Vec<u8>, SessionError>;

    /// Recomputes the tag over `data` and compares it to `tag` in constant time.
    fn verify(&self, key: &[u8], data: &[u8], tag: &[u8]) -> Result<(), SessionError> {
        let computed = self.mac(key, data)?;
        constant_time::verify_slices_are_equal(&computed, tag)?;
        Ok(())
    }
}

/// KDF2 (ISO 18033-2) over SHA-256: `H(secret || counter || salt)` blocks,
/// counter big-endian from 1.
#[derive(Clone, Copy, Debug, Default)]
pub struct Kdf2Sha256;

impl Kdf for Kdf2Sha256 {
    fn derive_key(&self, output_len: usize, secret: &[u8], salt: &[u8]) -> Result<Zeroizing<Vec<u8>>, SessionError> {
        let mut out = Zeroizing::new(Vec::with_capacity(output_len));
        let mut counter: u32 = 1;
        while out.len() < output_len {
            let mut be_counter = [0; 4];
            BigEndian::write_u32(&mut be_counter, counter);

            let mut hash = Sha256::new();
            hash.input(secret);
            hash.input(&be_counter);
            hash.input(salt);
            let mut block = hash.result();

            let take = (output_len - out.len()).min(block.len());
            out.extend_from_slice(&block[..take]);
            block.as_mut_slice().zeroize();

            counter = counter
                .checked_add(1)
                .ok_or(SessionError::KeyDerivationError("requested output too long"))?;
        }
        Ok(out)
    }
}

type Aes256CbcPkcs7 = Cbc<Aes256, Pkcs7>;

#[derive(Clone, Copy, Debug, Default)]
pub struct Aes256Cbc;

impl SessionCipher for Aes256Cbc {
    fn encrypt(&self, key: &[u8], iv: &[u8], plaintext: &[u8]) -> Result<Vec<u8>, SessionError> {
        let cipher = Aes256CbcPkcs7::new_var(key, iv)?;
        Ok(cipher.encrypt_vec(plaintext))
    }

    fn decrypt(&self, key: &[u8], iv: &[u8], ciphertext: &[u8]) -> Result<Zeroizing<Vec<u8>>, SessionError> {
        let cipher = Aes256CbcPkcs7::new_var(key, iv)?;
        Ok(Zeroizing::new(cipher.decrypt_vec(ciphertext)?))
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct HmacSha256;

impl Mac for HmacSha256 {
    fn output_len(&self) -> usize {
        digest::SHA256_OUTPUT_LEN
    }

    fn mac(&self, key: &[u8], data: &[u8]) -> Result<Vec<u8>, SessionError> {
        let key = hmac::Key::new(hmac::HMAC_SHA256, key);
        Ok(hmac::sign(&key, data).as_ref().to_vec())
    }
}
