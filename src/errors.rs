use thiserror::Error;

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Decoding error: {}", _0)]
    DecodingError(&'static str),

    #[error("invalid length")]
    InvalidLengthError,
    #[error("Master secret shorter than {} bytes", crate::session::MASTER_SECRET_LEN)]
    InvalidMasterSecretError,
    #[error("Invalid connection side.")]
    InvalidConnectionSideError,
    #[error("Certificate error: {}", _0)]
    CertificateError(&'static str),

    #[error("Cryptographic integrity error: {}", _0)]
    IntegrityError(&'static str),

    #[error("Unspecified ring error")]
    UnspecifiedRingError,
    #[error("Key derivation error: {}", _0)]
    KeyDerivationError(&'static str),
    #[error("{}", _0)]
    InvalidKeyIvLengthError(#[from] block_modes::InvalidKeyIvLength),
    #[error("{}", _0)]
    BlockModeError(#[from] block_modes::BlockModeError),
    #[error("{}", _0)]
    RandomError(#[from] rand_core::Error),

    #[error("{}", _0)]
    SystemTimeError(#[from] std::time::SystemTimeError),

    // Carries no cause; see envelope::SessionCrypter::decrypt
    #[error("Failed to decrypt encrypted session")]
    DecryptionFailed,
}

impl From<ring::error::Unspecified> for SessionError {
    fn from(_: ring::error::Unspecified) -> Self {
        SessionError::UnspecifiedRingError
    }
}
