pub type CipherSuite = u16;

pub const TLS_RSA_WITH_AES_128_CBC_SHA: CipherSuite = 0x002f;
pub const TLS_DHE_RSA_WITH_AES_128_CBC_SHA: CipherSuite = 0x0033;
pub const TLS_RSA_WITH_AES_256_CBC_SHA: CipherSuite = 0x0035;
pub const TLS_DHE_RSA_WITH_AES_256_CBC_SHA: CipherSuite = 0x0039;
pub const TLS_RSA_WITH_AES_128_GCM_SHA256: CipherSuite = 0x009c;
pub const TLS_ECDHE_ECDSA_WITH_AES_128_CBC_SHA: CipherSuite = 0xc009;
pub const TLS_ECDHE_ECDSA_WITH_AES_256_CBC_SHA: CipherSuite = 0xc00a;
pub const TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA: CipherSuite = 0xc013;
pub const TLS_ECDHE_RSA_WITH_AES_256_CBC_SHA: CipherSuite = 0xc014;
pub const TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256: CipherSuite = 0xc02f;
pub const TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384: CipherSuite = 0xc030;

/// IANA name of a well-known ciphersuite, used for diagnostics only.
pub fn name(suite: CipherSuite) -> Option<&'static str> {
    let name = match suite {
        TLS_RSA_WITH_AES_128_CBC_SHA => "TLS_RSA_WITH_AES_128_CBC_SHA",
        TLS_DHE_RSA_WITH_AES_128_CBC_SHA => "TLS_DHE_RSA_WITH_AES_128_CBC_SHA",
        TLS_RSA_WITH_AES_256_CBC_SHA => "TLS_RSA_WITH_AES_256_CBC_SHA",
        TLS_DHE_RSA_WITH_AES_256_CBC_SHA => "TLS_DHE_RSA_WITH_AES_256_CBC_SHA",
        TLS_RSA_WITH_AES_128_GCM_SHA256 => "TLS_RSA_WITH_AES_128_GCM_SHA256",
        TLS_ECDHE_ECDSA_WITH_AES_128_CBC_SHA => "TLS_ECDHE_ECDSA_WITH_AES_128_CBC_SHA",
        TLS_ECDHE_ECDSA_WITH_AES_256_CBC_SHA => "TLS_ECDHE_ECDSA_WITH_AES_256_CBC_SHA",
        TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA => "TLS_ECDHE_RSA_WITH_AES_128_CBC_SHA",
        TLS_ECDHE_RSA_WITH_AES_256_CBC_SHA => "TLS_ECDHE_RSA_WITH_AES_256_CBC_SHA",
        TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256 => "TLS_ECDHE_RSA_WITH_AES_128_GCM_SHA256",
        TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384 => "TLS_ECDHE_RSA_WITH_AES_256_GCM_SHA384",
        _ => return None,
    };
    Some(name)
}

#[cfg(test)]
mod tests {
    use crate::cipher;

    #[test]
    fn names() {
        assert_eq!(cipher::name(0x002f), Some("TLS_RSA_WITH_AES_128_CBC_SHA"));
        assert_eq!(cipher::name(cipher::TLS_ECDHE_RSA_WITH_AES_256_CBC_SHA), Some("TLS_ECDHE_RSA_WITH_AES_256_CBC_SHA"));
        assert_eq!(cipher::name(0xffff), None);
    }
}
