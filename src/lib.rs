//!# TLS Session
//! Resumable TLS sessions, serialized and encrypted for storage.
//!
//! A [`Session`] holds the parameters negotiated by a completed handshake.
//! It can be turned into a canonical DER encoding with [`Session::to_bytes`],
//! or sealed under a long-term [`SymmetricKey`] with [`Session::encrypt`] so
//! it can be handed to a client as a ticket or written to an untrusted cache.
//!
//! ```no_run
//! # fn main() -> Result<(), tls_session::SessionError> {
//! # let session: tls_session::Session = unimplemented!();
//! use tls_session::{Session, SymmetricKey};
//!
//! let key = SymmetricKey::new(vec![0; 32]);
//! let blob = session.encrypt_with_os_rng(&key)?;
//! let resumed: Session = Session::decrypt(&blob, &key)?;
//! # Ok(())
//! # }
//! ```

#[macro_use]
extern crate enum_primitive_derive;
extern crate num_traits;

pub mod certificate;
pub mod cipher;
pub mod codec;
pub mod crypto;
mod der;
pub mod envelope;
mod errors;
pub mod session;

pub use certificate::{Certificate, PeerCertificate};
pub use crypto::SymmetricKey;
pub use envelope::SessionCrypter;
pub use errors::SessionError;
pub use session::{ConnectionSide, MasterSecret, ProtocolVersion, ServerInformation, Session};
