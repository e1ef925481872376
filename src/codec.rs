//! Canonical binary encoding of a [`Session`].
//!
//! The encoding is a single DER SEQUENCE whose fields appear in a fixed order
//! selected by [`SESSION_PARAM_STRUCT_VERSION`]:
//!
//! ```text
//! SEQUENCE {
//!   version-marker      INTEGER
//!   start-time          INTEGER   -- seconds since the epoch
//!   major-version       INTEGER
//!   minor-version       INTEGER
//!   session-id          OCTET STRING
//!   session-ticket      OCTET STRING
//!   ciphersuite         INTEGER
//!   compression-method  INTEGER
//!   connection-side     INTEGER   -- 0 client, 1 server
//!   fragment-size       INTEGER
//!   master-secret       OCTET STRING
//!   peer-certificates   OCTET STRING  -- encodings back to back, leaf first
//!   server-hostname     UTF8String
//!   server-service      UTF8String
//!   server-port         INTEGER
//!   srp-identifier      UTF8String
//! }
//! ```
//!
//! Any change to this layout needs a new version marker.

use crate::certificate::PeerCertificate;
use crate::der;
use crate::errors::SessionError;
use crate::session::{self, ConnectionSide, MasterSecret, ProtocolVersion, ServerInformation, Session};

use num_traits::FromPrimitive;
use zeroize::Zeroizing;

pub const SESSION_PARAM_STRUCT_VERSION: u64 = 0x2994_e301;

pub fn encode<C: PeerCertificate>(session: &Session<C>) -> Zeroizing<Vec<u8>> {
    let peer_cert_bits: Vec<u8> = session.peer_certs.iter().flat_map(|c| c.encode()).collect();

    let mut w = der::Writer::new();
    w.sequence(|s| {
        s.integer(SESSION_PARAM_STRUCT_VERSION)
            .integer(session.start_time)
            .integer(u64::from(session.version.major()))
            .integer(u64::from(session.version.minor()))
            .octet_string(&session.identifier)
            .octet_string(&session.session_ticket)
            .integer(u64::from(session.ciphersuite))
            .integer(u64::from(session.compression_method))
            .integer(session.connection_side as u64)
            .integer(u64::from(session.fragment_size))
            .octet_string(session.master_secret.as_bytes())
            .octet_string(&peer_cert_bits)
            .utf8_string(session.server_info.hostname())
            .utf8_string(session.server_info.service())
            .integer(u64::from(session.server_info.port()))
            .utf8_string(&session.srp_identifier);
    });
    Zeroizing::new(w.finish())
}

pub fn decode<C: PeerCertificate>(v: &[u8]) -> Result<Session<C>, SessionError> {
    let mut outer = der::Reader::new(v);
    let mut s = outer.sequence()?;

    if s.integer()? != SESSION_PARAM_STRUCT_VERSION {
        return Err(SessionError::DecodingError("Unknown version in session structure"));
    }
    let start_time = s.integer()?;
    if session::start_time_from_secs(start_time).is_none() {
        return Err(SessionError::DecodingError("start time out of range"));
    }
    let major_version = s.integer_as::<u8>()?;
    let minor_version = s.integer_as::<u8>()?;
    let identifier = s.octet_string()?.to_vec();
    let session_ticket = s.octet_string()?.to_vec();
    let ciphersuite = s.integer_as::<u16>()?;
    let compression_method = s.integer_as::<u8>()?;
    let side_code = s.integer_as::<u8>()?;
    let fragment_size = s.integer_as::<u32>()?;
    let master_secret = MasterSecret::new(s.octet_string()?.to_vec())?;
    let peer_cert_bits = s.octet_string()?;
    let server_hostname = s.utf8_string()?;
    let server_service = s.utf8_string()?;
    let server_port = s.integer_as::<u16>()?;
    let srp_identifier = s.utf8_string()?;
    s.verify_end()?;
    outer.verify_end()?;

    let connection_side = ConnectionSide::from_u8(side_code).ok_or(SessionError::InvalidConnectionSideError)?;
    let peer_certs = decode_chain(peer_cert_bits)?;

    Ok(Session {
        start_time,
        identifier,
        session_ticket,
        master_secret,
        version: ProtocolVersion::new(major_version, minor_version),
        ciphersuite,
        compression_method,
        connection_side,
        fragment_size,
        peer_certs,
        server_info: ServerInformation::new(server_hostname, server_service, server_port),
        srp_identifier: srp_identifier.to_string(),
    })
}

fn decode_chain<C: PeerCertificate>(bits: &[u8]) -> Result<Vec<C>, SessionError> {
    let mut certs = Vec::new();
    let mut rest = bits;
    while !rest.is_empty() {
        let (cert, consumed) = C::decode_one(rest).map_err(|_| SessionError::DecodingError("malformed peer certificate chain"))?;
        if consumed == 0 || consumed > rest.len() {
            return Err(SessionError::DecodingError("malformed peer certificate chain"));
        }
        certs.push(cert);
        rest = &rest[consumed..];
    }
    Ok(certs)
}

impl<C: PeerCertificate> Session<C> {
    /// Canonical encoding of this session. Contains the master secret in the
    /// clear; the buffer is wiped when dropped.
    pub fn to_bytes(&self) -> Zeroizing<Vec<u8>> {
        encode(self)
    }

    pub fn from_bytes(v: &[u8]) -> Result<Self, SessionError> {
        decode(v)
    }
}
