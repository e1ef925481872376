//! Authenticated encryption of encoded sessions under a long-term key.
//!
//! ```text
//! [ magic:4 ][ cipher_key_salt:10 ][ mac_key_salt:10 ][ cipher_iv:16 ][ ciphertext ][ mac:32 ]
//! ```
//!
//! Cipher and MAC keys are derived separately from the long-term key, each
//! with its own fresh salt. The MAC covers every byte before it, and is
//! checked before anything is decrypted.

use crate::certificate::{Certificate, PeerCertificate};
use crate::codec;
use crate::crypto::{Aes256Cbc, HmacSha256, Kdf, Kdf2Sha256, Mac, SessionCipher, SymmetricKey};
use crate::errors::SessionError;
use crate::session::Session;

use byteorder::{BigEndian, ByteOrder};
use rand_core::{CryptoRng, OsRng, RngCore};
use tracing::debug;
use zeroize::Zeroizing;

pub const SESSION_CRYPTO_MAGIC: u32 = 0x571b_0e4f;

pub const MAGIC_LENGTH: usize = 4;
pub const KEY_KDF_SALT_LENGTH: usize = 10;
pub const CIPHER_KEY_LENGTH: usize = 32;
pub const MAC_KEY_LENGTH: usize = 32;
pub const CIPHER_IV_LENGTH: usize = 16;
pub const MAC_OUTPUT_LENGTH: usize = 32;
/// Smallest ciphertext a session with a 48 byte master secret can produce.
pub const MIN_CTEXT_SIZE: usize = 4 * 16;

const CIPHER_KEY_SALT_OFFSET: usize = MAGIC_LENGTH;
const MAC_KEY_SALT_OFFSET: usize = CIPHER_KEY_SALT_OFFSET + KEY_KDF_SALT_LENGTH;
const CIPHER_IV_OFFSET: usize = MAC_KEY_SALT_OFFSET + KEY_KDF_SALT_LENGTH;
const CTEXT_OFFSET: usize = CIPHER_IV_OFFSET + CIPHER_IV_LENGTH;

pub const MIN_ENCRYPTED_SESSION_LENGTH: usize = CTEXT_OFFSET + MIN_CTEXT_SIZE + MAC_OUTPUT_LENGTH;

/// Encrypts and decrypts sessions with an injected KDF, cipher and MAC.
///
/// Holds no mutable state, so one crypter can be shared between threads.
#[derive(Clone, Debug, Default)]
pub struct SessionCrypter<K = Kdf2Sha256, C = Aes256Cbc, M = HmacSha256> {
    kdf: K,
    cipher: C,
    mac: M,
}

impl<K, C, M> SessionCrypter<K, C, M>
where
    K: Kdf,
    C: SessionCipher,
    M: Mac,
{
    pub fn new(kdf: K, cipher: C, mac: M) -> Self {
        Self { kdf, cipher, mac }
    }

    pub fn encrypt<P, R>(&self, session: &Session<P>, master_key: &SymmetricKey, rng: &mut R) -> Result<Vec<u8>, SessionError>
    where
        P: PeerCertificate,
        R: RngCore + CryptoRng,
    {
        let out = self.seal(&codec::encode(session), master_key, rng)?;
        debug!(
            session_id = %hex::encode(session.session_id()),
            len = out.len(),
            "encrypted session"
        );
        Ok(out)
    }

    /// Authenticates, decrypts and decodes `buf`.
    ///
    /// Every failure, whether a short or foreign blob, a bad MAC, a wrong key
    /// or an undecodable plaintext, is reported as
    /// [`SessionError::DecryptionFailed`]. The underlying cause is only
    /// logged, at debug level.
    pub fn decrypt<P>(&self, buf: &[u8], master_key: &SymmetricKey) -> Result<Session<P>, SessionError>
    where
        P: PeerCertificate,
    {
        self.open(buf, master_key)
            .and_then(|plaintext| codec::decode(&plaintext))
            .map_err(|e| {
                debug!(error = %e, len = buf.len(), "failed to decrypt encrypted session");
                SessionError::DecryptionFailed
            })
    }

    fn seal<R>(&self, plaintext: &[u8], master_key: &SymmetricKey, rng: &mut R) -> Result<Vec<u8>, SessionError>
    where
        R: RngCore + CryptoRng,
    {
        let mut cipher_key_salt = [0; KEY_KDF_SALT_LENGTH];
        rng.try_fill_bytes(&mut cipher_key_salt)?;
        let mut mac_key_salt = [0; KEY_KDF_SALT_LENGTH];
        rng.try_fill_bytes(&mut mac_key_salt)?;

        let cipher_key = self.kdf.derive_key(CIPHER_KEY_LENGTH, master_key.as_bytes(), &cipher_key_salt)?;
        let mac_key = self.kdf.derive_key(MAC_KEY_LENGTH, master_key.as_bytes(), &mac_key_salt)?;

        let mut cipher_iv = [0; CIPHER_IV_LENGTH];
        rng.try_fill_bytes(&mut cipher_iv)?;

        let ctext = self.cipher.encrypt(&cipher_key, &cipher_iv, plaintext)?;

        let mut out = Vec::with_capacity(CTEXT_OFFSET + ctext.len() + MAC_OUTPUT_LENGTH);
        let mut magic = [0; MAGIC_LENGTH];
        BigEndian::write_u32(&mut magic, SESSION_CRYPTO_MAGIC);
        out.extend_from_slice(&magic);
        out.extend_from_slice(&cipher_key_salt);
        out.extend_from_slice(&mac_key_salt);
        out.extend_from_slice(&cipher_iv);
        out.extend_from_slice(&ctext);

        let tag = self.mac.mac(&mac_key, &out)?;
        if tag.len() != MAC_OUTPUT_LENGTH {
            return Err(SessionError::InvalidLengthError);
        }
        out.extend_from_slice(&tag);
        Ok(out)
    }

    fn open(&self, buf: &[u8], master_key: &SymmetricKey) -> Result<Zeroizing<Vec<u8>>, SessionError> {
        if buf.len() < MIN_ENCRYPTED_SESSION_LENGTH {
            return Err(SessionError::IntegrityError("Encrypted TLS session too short to be valid"));
        }
        if BigEndian::read_u32(&buf[..MAGIC_LENGTH]) != SESSION_CRYPTO_MAGIC {
            return Err(SessionError::IntegrityError("Unknown header value in encrypted session"));
        }

        let cipher_key_salt = &buf[CIPHER_KEY_SALT_OFFSET..MAC_KEY_SALT_OFFSET];
        let mac_key_salt = &buf[MAC_KEY_SALT_OFFSET..CIPHER_IV_OFFSET];
        let cipher_iv = &buf[CIPHER_IV_OFFSET..CTEXT_OFFSET];
        let (authenticated, tag) = buf.split_at(buf.len() - MAC_OUTPUT_LENGTH);

        let mac_key = self.kdf.derive_key(MAC_KEY_LENGTH, master_key.as_bytes(), mac_key_salt)?;
        self.mac
            .verify(&mac_key, authenticated, tag)
            .map_err(|_| SessionError::IntegrityError("MAC verification failed for encrypted session"))?;

        let cipher_key = self.kdf.derive_key(CIPHER_KEY_LENGTH, master_key.as_bytes(), cipher_key_salt)?;
        self.cipher.decrypt(&cipher_key, cipher_iv, &authenticated[CTEXT_OFFSET..])
    }
}

impl<P: PeerCertificate> Session<P> {
    /// Encrypts this session under `master_key` with the default crypter.
    pub fn encrypt<R>(&self, master_key: &SymmetricKey, rng: &mut R) -> Result<Vec<u8>, SessionError>
    where
        R: RngCore + CryptoRng,
    {
        <SessionCrypter>::default().encrypt(self, master_key, rng)
    }

    /// Reverses [`Session::encrypt`]. See [`SessionCrypter::decrypt`] for the
    /// error behavior.
    pub fn decrypt(buf: &[u8], master_key: &SymmetricKey) -> Result<Self, SessionError> {
        <SessionCrypter>::default().decrypt(buf, master_key)
    }
}

impl Session<Certificate> {
    /// Encrypts with the operating system's random source.
    pub fn encrypt_with_os_rng(&self, master_key: &SymmetricKey) -> Result<Vec<u8>, SessionError> {
        self.encrypt(master_key, &mut OsRng)
    }
}
