use crate::certificate::Certificate;
use crate::cipher;
use crate::errors::SessionError;

use std::fmt;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Minimum master secret length accepted by constructors and the decoder.
pub const MASTER_SECRET_LEN: usize = 48;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ProtocolVersion {
    major: u8,
    minor: u8,
}

impl ProtocolVersion {
    pub const fn new(major: u8, minor: u8) -> Self {
        Self { major, minor }
    }

    pub fn major(&self) -> u8 {
        self.major
    }

    pub fn minor(&self) -> u8 {
        self.minor
    }
}

impl fmt::Display for ProtocolVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

pub const TLS_1_0: ProtocolVersion = ProtocolVersion::new(3, 1);
pub const TLS_1_1: ProtocolVersion = ProtocolVersion::new(3, 2);
pub const TLS_1_2: ProtocolVersion = ProtocolVersion::new(3, 3);
pub const DTLS_1_0: ProtocolVersion = ProtocolVersion::new(254, 255);
pub const DTLS_1_2: ProtocolVersion = ProtocolVersion::new(254, 253);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Primitive)]
#[repr(u8)]
pub enum ConnectionSide {
    Client = 0,
    Server = 1,
}

/// The server a session was negotiated with; used to match cached sessions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct ServerInformation {
    hostname: String,
    service: String,
    port: u16,
}

impl ServerInformation {
    pub fn new(hostname: &str, service: &str, port: u16) -> Self {
        Self {
            hostname: hostname.to_string(),
            service: service.to_string(),
            port,
        }
    }

    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn service(&self) -> &str {
        &self.service
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn is_empty(&self) -> bool {
        self.hostname.is_empty()
    }
}

/// Master secret of a session, wiped when dropped.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct MasterSecret(Vec<u8>);

impl MasterSecret {
    pub fn new(secret: Vec<u8>) -> Result<Self, SessionError> {
        let secret = MasterSecret(secret);
        match secret.0.len() {
            n if n < MASTER_SECRET_LEN => Err(SessionError::InvalidMasterSecretError),
            _ => Ok(secret),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }
}

impl fmt::Debug for MasterSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MasterSecret([REDACTED; {}])", self.0.len())
    }
}

/// Creation time stored as whole seconds since the epoch, if the platform's
/// clock can represent it.
pub(crate) fn start_time_from_secs(secs: u64) -> Option<SystemTime> {
    UNIX_EPOCH.checked_add(Duration::from_secs(secs))
}

/// Everything needed to resume a connection without a full handshake.
///
/// A `Session` is a value: it is built once, either fresh after a handshake
/// with [`Session::new`] or from its canonical encoding with
/// [`Session::from_bytes`], and never changes afterwards.
#[derive(Clone)]
pub struct Session<C = Certificate> {
    pub(crate) start_time: u64,
    pub(crate) identifier: Vec<u8>,
    pub(crate) session_ticket: Vec<u8>,
    pub(crate) master_secret: MasterSecret,
    pub(crate) version: ProtocolVersion,
    pub(crate) ciphersuite: cipher::CipherSuite,
    pub(crate) compression_method: u8,
    pub(crate) connection_side: ConnectionSide,
    pub(crate) fragment_size: u32,
    pub(crate) peer_certs: Vec<C>,
    pub(crate) server_info: ServerInformation,
    pub(crate) srp_identifier: String,
}

impl<C> Session<C> {
    /// Builds a fresh session stamped with the current time.
    pub fn new(
        identifier: Vec<u8>,
        master_secret: MasterSecret,
        version: ProtocolVersion,
        ciphersuite: cipher::CipherSuite,
        compression_method: u8,
        connection_side: ConnectionSide,
        fragment_size: u32,
        peer_certs: Vec<C>,
        session_ticket: Vec<u8>,
        server_info: ServerInformation,
        srp_identifier: &str,
    ) -> Result<Self, SessionError> {
        let start_time = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
        Ok(Self {
            start_time,
            identifier,
            session_ticket,
            master_secret,
            version,
            ciphersuite,
            compression_method,
            connection_side,
            fragment_size,
            peer_certs,
            server_info,
            srp_identifier: srp_identifier.to_string(),
        })
    }

    pub fn start_time(&self) -> SystemTime {
        // new() and decode() only admit representable times
        start_time_from_secs(self.start_time).unwrap_or(UNIX_EPOCH)
    }

    pub fn session_id(&self) -> &[u8] {
        &self.identifier
    }

    pub fn session_ticket(&self) -> &[u8] {
        &self.session_ticket
    }

    pub fn master_secret(&self) -> &MasterSecret {
        &self.master_secret
    }

    pub fn version(&self) -> ProtocolVersion {
        self.version
    }

    pub fn ciphersuite(&self) -> cipher::CipherSuite {
        self.ciphersuite
    }

    pub fn compression_method(&self) -> u8 {
        self.compression_method
    }

    pub fn side(&self) -> ConnectionSide {
        self.connection_side
    }

    pub fn fragment_size(&self) -> u32 {
        self.fragment_size
    }

    /// Peer certificate chain, leaf first.
    pub fn peer_certs(&self) -> &[C] {
        &self.peer_certs
    }

    pub fn server_info(&self) -> &ServerInformation {
        &self.server_info
    }

    pub fn srp_identifier(&self) -> &str {
        &self.srp_identifier
    }

    /// Time elapsed since the session was created, by the system clock.
    pub fn session_age(&self) -> Duration {
        self.session_age_at(SystemTime::now())
    }

    /// Time elapsed between creation and `now`; zero if `now` is earlier.
    pub fn session_age_at(&self, now: SystemTime) -> Duration {
        now.duration_since(self.start_time()).unwrap_or(Duration::from_secs(0))
    }
}

impl<C> fmt::Debug for Session<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("start_time", &self.start_time)
            .field("identifier", &hex::encode(&self.identifier))
            .field("session_ticket", &hex::encode(&self.session_ticket))
            .field("master_secret", &self.master_secret)
            .field("version", &self.version)
            .field("ciphersuite", &cipher::name(self.ciphersuite).unwrap_or("unknown"))
            .field("compression_method", &self.compression_method)
            .field("connection_side", &self.connection_side)
            .field("fragment_size", &self.fragment_size)
            .field("peer_certs", &self.peer_certs.len())
            .field("server_info", &self.server_info)
            .field("srp_identifier", &self.srp_identifier)
            .finish()
    }
}
