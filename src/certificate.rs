use crate::der;
use crate::errors::SessionError;

use std::fmt;

/// Encoding contract for the certificates a session carries.
///
/// The session codec stores a chain as the back-to-back encodings of its
/// certificates and splits it again with repeated `decode_one` calls, so
/// `decode_one` must consume exactly what `encode` produced.
pub trait PeerCertificate: Sized {
    fn encode(&self) -> Vec<u8>;

    /// Parses one certificate from the front of `v`, returning it together
    /// with the number of bytes consumed.
    fn decode_one(v: &[u8]) -> Result<(Self, usize), SessionError>;
}

/// A certificate kept as its raw DER encoding.
///
/// Only the outer SEQUENCE framing is checked; the contents are opaque here.
#[derive(Clone, PartialEq, Eq)]
pub struct Certificate {
    der: Vec<u8>,
}

impl Certificate {
    pub fn from_der(der: Vec<u8>) -> Result<Self, SessionError> {
        let (certificate, consumed) = Self::decode_one(&der)?;
        match consumed == der.len() {
            true => Ok(certificate),
            false => Err(SessionError::CertificateError("trailing data after certificate")),
        }
    }

    pub fn as_der(&self) -> &[u8] {
        &self.der
    }
}

impl PeerCertificate for Certificate {
    fn encode(&self) -> Vec<u8> {
        self.der.clone()
    }

    fn decode_one(v: &[u8]) -> Result<(Self, usize), SessionError> {
        let (tag, _, consumed) = der::Reader::new(v)
            .tlv()
            .map_err(|_| SessionError::CertificateError("malformed certificate encoding"))?;
        if tag != der::SEQUENCE {
            return Err(SessionError::CertificateError("certificate is not a SEQUENCE"));
        }
        Ok((Self { der: v[..consumed].to_vec() }, consumed))
    }
}

impl fmt::Debug for Certificate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Certificate({} bytes)", self.der.len())
    }
}
