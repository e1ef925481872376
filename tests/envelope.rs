extern crate tls_session;

use rand_core::OsRng;
use std::sync::Arc;
use std::thread;
use tls_session::cipher;
use tls_session::envelope::{MIN_ENCRYPTED_SESSION_LENGTH, SESSION_CRYPTO_MAGIC};
use tls_session::session::{DTLS_1_2, TLS_1_2};
use tls_session::{
    Certificate, ConnectionSide, MasterSecret, ServerInformation, Session, SessionCrypter, SessionError, SymmetricKey,
};

fn self_signed(cn: &str) -> Certificate {
    // SEQUENCE { UTF8String cn, OCTET STRING [0xab; 40] }
    let mut der = vec![0x30, (2 + cn.len() + 2 + 40) as u8, 0x0c, cn.len() as u8];
    der.extend_from_slice(cn.as_bytes());
    der.extend_from_slice(&[0x04, 40]);
    der.extend_from_slice(&[0xab; 40]);
    Certificate::from_der(der).expect("building Certificate failed")
}

fn client_session() -> Session {
    Session::new(
        vec![0x01, 0x02],
        MasterSecret::new((0..48).collect()).expect("building MasterSecret failed"),
        TLS_1_2,
        cipher::TLS_RSA_WITH_AES_128_CBC_SHA,
        0,
        ConnectionSide::Client,
        0,
        Vec::new(),
        Vec::new(),
        ServerInformation::new("example.com", "https", 443),
        "",
    )
    .expect("building Session failed")
}

fn server_session() -> Session {
    Session::new(
        vec![0x5e; 32],
        MasterSecret::new(vec![0xc3; 48]).expect("building MasterSecret failed"),
        DTLS_1_2,
        cipher::TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256,
        0,
        ConnectionSide::Server,
        4096,
        vec![self_signed("leaf"), self_signed("intermediate")],
        vec![0x77; 120],
        ServerInformation::default(),
        "bob",
    )
    .expect("building Session failed")
}

fn assert_same(a: &Session, b: &Session) {
    assert_eq!(a.start_time(), b.start_time());
    assert_eq!(a.session_id(), b.session_id());
    assert_eq!(a.session_ticket(), b.session_ticket());
    assert_eq!(a.master_secret().as_bytes(), b.master_secret().as_bytes());
    assert_eq!(a.version(), b.version());
    assert_eq!(a.ciphersuite(), b.ciphersuite());
    assert_eq!(a.compression_method(), b.compression_method());
    assert_eq!(a.side(), b.side());
    assert_eq!(a.fragment_size(), b.fragment_size());
    assert_eq!(a.peer_certs(), b.peer_certs());
    assert_eq!(a.server_info(), b.server_info());
    assert_eq!(a.srp_identifier(), b.srp_identifier());
}

fn expect_decryption_failed(result: Result<Session, SessionError>) {
    match result {
        Err(SessionError::DecryptionFailed) => (),
        other => panic!("unexpected result {:?}", other),
    }
}

/// Encrypt a client session under an all-zero key, decrypt it, then corrupt
/// one header byte.
#[test]
fn encrypt_decrypt_and_corrupt() {
    let key = SymmetricKey::new(vec![0; 32]);
    let session = client_session();

    let mut blob = session.encrypt(&key, &mut OsRng).expect("encrypt failed");
    assert_eq!(&blob[..4], &SESSION_CRYPTO_MAGIC.to_be_bytes());

    let decrypted = Session::decrypt(&blob, &key).expect("decrypt failed");
    assert_same(&session, &decrypted);

    blob[5] ^= 0xff;
    expect_decryption_failed(Session::decrypt(&blob, &key));
}

#[test]
fn server_session_with_chain() {
    let key = SymmetricKey::new(vec![0x24; 32]);
    let session = server_session();
    let blob = session.encrypt_with_os_rng(&key).expect("encrypt failed");
    let decrypted = Session::decrypt(&blob, &key).expect("decrypt failed");
    assert_same(&session, &decrypted);
    assert_eq!(decrypted.peer_certs()[0], self_signed("leaf"));
    assert!(decrypted.server_info().is_empty());
}

#[test]
fn any_single_bit_flip_is_detected() {
    let key = SymmetricKey::new(vec![0x10; 32]);
    let blob = client_session().encrypt(&key, &mut OsRng).expect("encrypt failed");
    for i in 0..blob.len() {
        for bit in 0..8 {
            let mut tampered = blob.clone();
            tampered[i] ^= 1 << bit;
            expect_decryption_failed(Session::decrypt(&tampered, &key));
        }
    }
}

#[test]
fn wrong_key_is_rejected() {
    let blob = client_session()
        .encrypt(&SymmetricKey::new(vec![0; 32]), &mut OsRng)
        .expect("encrypt failed");
    expect_decryption_failed(Session::decrypt(&blob, &SymmetricKey::new(vec![1; 32])));
    expect_decryption_failed(Session::decrypt(&blob, &SymmetricKey::new(vec![0; 31])));

    let same_bytes = SymmetricKey::from_slice(&[0; 32]);
    assert!(Session::<Certificate>::decrypt(&blob, &same_bytes).is_ok());
}

#[test]
fn short_inputs_are_rejected() {
    let key = SymmetricKey::new(vec![0; 32]);
    let blob = client_session().encrypt(&key, &mut OsRng).expect("encrypt failed");
    assert!(blob.len() >= MIN_ENCRYPTED_SESSION_LENGTH);
    for len in 0..MIN_ENCRYPTED_SESSION_LENGTH {
        expect_decryption_failed(Session::decrypt(&blob[..len], &key));
    }
    expect_decryption_failed(Session::decrypt(&blob[..blob.len() - 1], &key));
}

#[test]
fn foreign_header_is_rejected() {
    let key = SymmetricKey::new(vec![0; 32]);
    let mut blob = client_session().encrypt(&key, &mut OsRng).expect("encrypt failed");
    blob[..4].copy_from_slice(&[0xde, 0xad, 0xbe, 0xef]);
    expect_decryption_failed(Session::decrypt(&blob, &key));
}

#[test]
fn encryptions_are_randomized() {
    let key = SymmetricKey::new(vec![0; 32]);
    let session = client_session();
    let a = session.encrypt(&key, &mut OsRng).expect("encrypt failed");
    let b = session.encrypt(&key, &mut OsRng).expect("encrypt failed");
    assert_ne!(a, b);
    assert_same(&Session::decrypt(&a, &key).expect("decrypt failed"), &Session::decrypt(&b, &key).expect("decrypt failed"));
}

#[test]
fn crypter_is_shared_between_threads() {
    let crypter: Arc<SessionCrypter> = Arc::new(SessionCrypter::default());
    let key = Arc::new(SymmetricKey::new(vec![0x42; 32]));

    let handles: Vec<_> = (0..8u8)
        .map(|i| {
            let crypter = Arc::clone(&crypter);
            let key = Arc::clone(&key);
            thread::spawn(move || {
                let session = Session::new(
                    vec![i; 16],
                    MasterSecret::new(vec![i; 48]).expect("building MasterSecret failed"),
                    TLS_1_2,
                    cipher::TLS_RSA_WITH_AES_128_CBC_SHA,
                    0,
                    ConnectionSide::Client,
                    0,
                    Vec::<Certificate>::new(),
                    Vec::new(),
                    ServerInformation::new("example.com", "https", 443),
                    "",
                )
                .expect("building Session failed");
                for _ in 0..10 {
                    let blob = crypter.encrypt(&session, &key, &mut OsRng).expect("encrypt failed");
                    let decrypted: Session = crypter.decrypt(&blob, &key).expect("decrypt failed");
                    assert_eq!(decrypted.session_id(), session.session_id());
                    assert_eq!(decrypted.master_secret().as_bytes(), session.master_secret().as_bytes());
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().expect("worker thread panicked");
    }
}
